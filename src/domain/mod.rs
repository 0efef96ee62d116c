//! Domain Layer - 核心抽象
//!
//! 包含：
//! - models: 实体类型描述、写入提示、序列化格式
//! - repositories: 容器与协作方接口（命名策略、序列化器）
//! - error: 领域错误类型

pub mod error;
pub mod models;
pub mod repositories;

pub use error::{Result, StoreError};
pub use models::{AddOrUpdateHint, EntityType, Format};
pub use repositories::{
    AtomicContainer, AtomicReader, AtomicWriter, NamingStrategy, Serializer, StorageConfig,
};
