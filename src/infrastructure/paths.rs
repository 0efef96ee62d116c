//! 路径管理工具：默认命名策略与路径校验

use crate::domain::error::{Result, StoreError};
use crate::domain::models::EntityType;
use crate::domain::repositories::NamingStrategy;
use regex::Regex;
use sha2::{Digest, Sha256};
use std::fmt::Write as _;
use std::path::{Component, Path, PathBuf};
use std::sync::LazyLock;

/// 最多允许的分片层数
pub const MAX_SHARD_DEPTH: u8 = 4;

/// 可以原样用作文件名的键
static PLAIN_KEY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-][A-Za-z0-9_.-]*$").expect("静态正则"));

/// 默认命名策略
///
/// 目录：实体短名的 kebab-case；文件：`[分片/]转义后的键[.扩展名]`。
/// 分片取键的 SHA-256 十六进制前缀，每层两个字符（git 对象目录的做法），
/// 避免单个目录下文件过多。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefaultNamingStrategy {
    extension: String,
    shard_depth: u8,
}

impl DefaultNamingStrategy {
    /// 平铺布局
    pub fn new(extension: impl Into<String>) -> Self {
        Self {
            extension: extension.into().trim_start_matches('.').to_string(),
            shard_depth: 0,
        }
    }

    /// 设置分片层数（超过上限时截断）
    #[must_use]
    pub fn with_shard_depth(mut self, depth: u8) -> Self {
        self.shard_depth = depth.min(MAX_SHARD_DEPTH);
        self
    }

    #[must_use]
    pub fn extension(&self) -> &str {
        &self.extension
    }

    #[must_use]
    pub fn shard_depth(&self) -> u8 {
        self.shard_depth
    }
}

impl Default for DefaultNamingStrategy {
    fn default() -> Self {
        Self::new("json")
    }
}

impl NamingStrategy for DefaultNamingStrategy {
    fn folder_for(&self, entity: &EntityType) -> PathBuf {
        PathBuf::from(kebab_case(entity.short_name()))
    }

    fn name_for(&self, _entity: &EntityType, key: &str) -> PathBuf {
        let mut path = PathBuf::new();
        if self.shard_depth > 0 {
            let digest = hex::encode(Sha256::digest(key.as_bytes()));
            for level in 0..usize::from(self.shard_depth) {
                path.push(&digest[level * 2..level * 2 + 2]);
            }
        }

        let mut file_name = escape_key(key);
        if !self.extension.is_empty() {
            file_name.push('.');
            file_name.push_str(&self.extension);
        }
        path.push(file_name);
        path
    }
}

/// `UserProfile` -> `user-profile`，`HTTPServer` -> `http-server`
pub fn kebab_case(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(name.len() + 4);

    for (i, &c) in chars.iter().enumerate() {
        if c.is_ascii_uppercase() {
            let prev = i.checked_sub(1).map(|p| chars[p]);
            let next = chars.get(i + 1).copied();
            let boundary = match prev {
                Some(p) if p.is_ascii_lowercase() || p.is_ascii_digit() => true,
                Some(p) if p.is_ascii_uppercase() => next.is_some_and(|n| n.is_ascii_lowercase()),
                _ => false,
            };
            if boundary && !out.ends_with('-') {
                out.push('-');
            }
            out.push(c.to_ascii_lowercase());
        } else if c == '_' || c == ' ' {
            if !out.is_empty() && !out.ends_with('-') {
                out.push('-');
            }
        } else {
            out.push(c);
        }
    }

    out
}

/// 把键转义成安全的文件名（单射）
///
/// `[A-Za-z0-9_.-]` 之外的字节以及开头的 `.` 编码为 `%XX`；`%` 自身也会被编码。
pub fn escape_key(key: &str) -> String {
    if PLAIN_KEY.is_match(key) {
        return key.to_string();
    }

    let mut out = String::with_capacity(key.len() * 3);
    for (i, byte) in key.bytes().enumerate() {
        let keep = byte.is_ascii_alphanumeric()
            || byte == b'_'
            || byte == b'-'
            || (byte == b'.' && i > 0);
        if keep {
            out.push(char::from(byte));
        } else {
            let _ = write!(out, "%{byte:02X}");
        }
    }
    out
}

/// 校验命名策略给出的相对路径：非空、非绝对、不含 `..`
pub fn validate_relative(path: &Path) -> Result<()> {
    if path.as_os_str().is_empty() {
        return Err(StoreError::InvalidKey("空路径".to_string()));
    }

    for component in path.components() {
        match component {
            Component::Normal(_) | Component::CurDir => {}
            _ => {
                return Err(StoreError::InvalidKey(format!(
                    "路径必须位于容器内: {}",
                    path.display()
                )));
            }
        }
    }

    if path.file_name().is_none() {
        return Err(StoreError::InvalidKey(format!(
            "路径缺少文件名: {}",
            path.display()
        )));
    }

    Ok(())
}

/// 安全写入文件 (使用临时文件 + 原子替换)
pub fn write_file_safe(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        std::fs::create_dir_all(parent)?;
    }

    let temp_path = path.with_extension("tmp");
    std::fs::write(&temp_path, content)?;
    std::fs::rename(&temp_path, path)?;

    Ok(())
}
