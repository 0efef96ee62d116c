//! 序列化器实现
//!
//! - json: serde_json
//! - toml: toml
//! - `Format`: 按配置在运行时选择

pub mod json;
pub mod toml;

pub use json::JsonSerializer;
pub use self::toml::TomlSerializer;

use crate::domain::error::Result;
use crate::domain::models::Format;
use crate::domain::repositories::Serializer;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::io::{Read, Write};

impl<E> Serializer<E> for Format
where
    E: Serialize + DeserializeOwned,
{
    fn serialize(&self, value: &E, sink: &mut dyn Write) -> Result<()> {
        match self {
            Format::Json => JsonSerializer::compact().serialize(value, sink),
            Format::JsonPretty => JsonSerializer::pretty().serialize(value, sink),
            Format::Toml => TomlSerializer.serialize(value, sink),
        }
    }

    fn deserialize(&self, source: &mut dyn Read) -> Result<E> {
        match self {
            Format::Json | Format::JsonPretty => JsonSerializer::compact().deserialize(source),
            Format::Toml => TomlSerializer.deserialize(source),
        }
    }
}
