//! atomstore - 基于文件的原子键值容器
//!
//! 每个实体类型一个目录，每个键一个文件；文件内容就是一条序列化记录。
//! 写入在整个读-改-写期间持有该文件的排他锁，因此同一台机器上的
//! 多个线程或进程可以安全地并发访问同一目录。

// 领域层
pub mod domain;

// 应用层
pub mod application;

// 基础设施层
pub mod infrastructure;

// 配置加载
pub mod config;

// 存储工厂
pub mod app;

#[cfg(test)]
pub(crate) mod test_utils;

// 重新导出常用类型
pub use app::{AtomicStorage, ConfiguredContainer};
pub use application::EntityService;
pub use domain::{
    AddOrUpdateHint, AtomicContainer, AtomicReader, AtomicWriter, EntityType, Format,
    NamingStrategy, Result, Serializer, StorageConfig, StoreError,
};
pub use infrastructure::{
    DefaultNamingStrategy, FileAtomicContainer, JsonSerializer, LockPolicy,
    MemoryAtomicContainer, TomlSerializer,
};
