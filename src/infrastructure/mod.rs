//! Infrastructure Layer - 技术实现
//!
//! 包含：
//! - storage: 文件原子容器
//! - memory: 内存容器
//! - lock: 文件锁守卫
//! - paths: 默认命名策略与路径工具
//! - format: 序列化器

pub mod format;
pub mod lock;
pub mod memory;
pub mod paths;
pub mod storage;

pub use format::{JsonSerializer, TomlSerializer};
pub use lock::{LockMode, LockPolicy, LockedFile};
pub use memory::MemoryAtomicContainer;
pub use paths::DefaultNamingStrategy;
pub use storage::FileAtomicContainer;
