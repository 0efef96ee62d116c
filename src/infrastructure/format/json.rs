//! JSON 序列化器

use crate::domain::error::Result;
use crate::domain::repositories::Serializer;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::io::{Read, Write};

/// JSON 序列化器
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JsonSerializer {
    pretty: bool,
}

impl JsonSerializer {
    #[must_use]
    pub fn compact() -> Self {
        Self { pretty: false }
    }

    #[must_use]
    pub fn pretty() -> Self {
        Self { pretty: true }
    }
}

impl<E> Serializer<E> for JsonSerializer
where
    E: Serialize + DeserializeOwned,
{
    fn serialize(&self, value: &E, sink: &mut dyn Write) -> Result<()> {
        if self.pretty {
            serde_json::to_writer_pretty(sink, value)?;
        } else {
            serde_json::to_writer(sink, value)?;
        }
        Ok(())
    }

    fn deserialize(&self, source: &mut dyn Read) -> Result<E> {
        Ok(serde_json::from_reader(source)?)
    }
}
