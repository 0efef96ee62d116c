//! 领域层错误类型

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, StoreError>;

/// 存储错误类型
///
/// "记录不存在" 不是错误：读取和删除以 `Option` / `bool` 返回。
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO 错误: {0}")]
    Io(#[from] std::io::Error),

    /// 容器根目录不存在（未初始化或被外部删除）
    #[error("容器 '{}' 不存在", .0.display())]
    ContainerMissing(PathBuf),

    #[error("序列化错误: {0}")]
    Serialization(String),

    #[error("等待文件锁超时 ({waited_ms} ms): {}", .path.display())]
    LockTimeout { path: PathBuf, waited_ms: u64 },

    /// 命名策略给出了不可用的相对路径
    #[error("无效的键路径: {0}")]
    InvalidKey(String),

    #[error("记录未找到: {0}")]
    NotFound(String),

    #[error("配置错误: {0}")]
    Config(String),
}

impl StoreError {
    /// 是否为调用方可以重试的瞬时错误
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            StoreError::LockTimeout { .. } => true,
            StoreError::Io(err) => matches!(
                err.kind(),
                std::io::ErrorKind::Interrupted
                    | std::io::ErrorKind::WouldBlock
                    | std::io::ErrorKind::TimedOut
            ),
            _ => false,
        }
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for StoreError {
    fn from(err: toml::de::Error) -> Self {
        StoreError::Serialization(err.to_string())
    }
}

impl From<toml::ser::Error> for StoreError {
    fn from(err: toml::ser::Error) -> Self {
        StoreError::Serialization(err.to_string())
    }
}
