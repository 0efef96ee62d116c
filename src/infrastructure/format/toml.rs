//! TOML 序列化器

use crate::domain::error::{Result, StoreError};
use crate::domain::repositories::Serializer;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::io::{Read, Write};

/// TOML 序列化器（顶层值必须是表）
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TomlSerializer;

impl<E> Serializer<E> for TomlSerializer
where
    E: Serialize + DeserializeOwned,
{
    fn serialize(&self, value: &E, sink: &mut dyn Write) -> Result<()> {
        let content = toml::to_string(value)?;
        sink.write_all(content.as_bytes())?;
        Ok(())
    }

    fn deserialize(&self, source: &mut dyn Read) -> Result<E> {
        let mut content = String::new();
        source.read_to_string(&mut content).map_err(|e| {
            StoreError::Serialization(format!("TOML 内容不是有效的 UTF-8: {e}"))
        })?;
        Ok(toml::from_str(&content)?)
    }
}
