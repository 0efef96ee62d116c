//! 记录的序列化格式

use serde::{Deserialize, Serialize};
use std::fmt;

/// 序列化格式（可在配置中选择）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Format {
    /// 紧凑 JSON
    #[default]
    Json,
    /// 带缩进的 JSON，便于人工查看
    JsonPretty,
    /// TOML（顶层值必须是表）
    Toml,
}

impl Format {
    /// 从字符串解析
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "json" => Some(Format::Json),
            "json-pretty" | "pretty" => Some(Format::JsonPretty),
            "toml" => Some(Format::Toml),
            _ => None,
        }
    }

    /// 默认文件扩展名
    #[must_use]
    pub fn extension(&self) -> &'static str {
        match self {
            Format::Json | Format::JsonPretty => "json",
            Format::Toml => "toml",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Format::Json => write!(f, "json"),
            Format::JsonPretty => write!(f, "json-pretty"),
            Format::Toml => write!(f, "toml"),
        }
    }
}
