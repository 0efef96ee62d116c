//! 容器接口与协作方接口（输出端口）

use crate::domain::error::Result;
use crate::domain::models::{AddOrUpdateHint, EntityType, Format};
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// 命名策略：把 (实体类型, 键) 映射为相对路径
///
/// 必须是纯函数：同样的输入永远给出同样的路径，且同一实体类型下不同键不冲突。
pub trait NamingStrategy: Send + Sync {
    /// 实体容器的根子目录名
    fn folder_for(&self, entity: &EntityType) -> PathBuf;

    /// 键对应的相对文件路径，可以包含分片子目录
    fn name_for(&self, entity: &EntityType, key: &str) -> PathBuf;
}

impl<T: NamingStrategy + ?Sized> NamingStrategy for Arc<T> {
    fn folder_for(&self, entity: &EntityType) -> PathBuf {
        (**self).folder_for(entity)
    }

    fn name_for(&self, entity: &EntityType, key: &str) -> PathBuf {
        (**self).name_for(entity, key)
    }
}

/// 实体序列化器
///
/// 不持有传入的读写流；出错时由调用方丢弃缓冲区。
pub trait Serializer<E>: Send + Sync {
    fn serialize(&self, value: &E, sink: &mut dyn Write) -> Result<()>;

    fn deserialize(&self, source: &mut dyn Read) -> Result<E>;
}

impl<E, T: Serializer<E> + ?Sized> Serializer<E> for Arc<T> {
    fn serialize(&self, value: &E, sink: &mut dyn Write) -> Result<()> {
        (**self).serialize(value, sink)
    }

    fn deserialize(&self, source: &mut dyn Read) -> Result<E> {
        (**self).deserialize(source)
    }
}

/// 按键读取
pub trait AtomicReader<K, E> {
    /// 读取记录；不存在时返回 `Ok(None)`
    fn try_get(&self, key: &K) -> Result<Option<E>>;
}

/// 按键写入
pub trait AtomicWriter<K, E> {
    /// 读-改-写：记录不存在时调用 `add`，存在时调用 `update`
    ///
    /// 任一闭包返回错误时，已存储的记录保持不变。
    fn try_add_or_update<A, U>(
        &self,
        key: &K,
        add: A,
        update: U,
        hint: AddOrUpdateHint,
    ) -> Result<E>
    where
        A: FnOnce() -> Result<E>,
        U: FnOnce(E) -> Result<E>;

    /// 不会失败的闭包版本
    fn add_or_update<A, U>(&self, key: &K, add: A, update: U, hint: AddOrUpdateHint) -> Result<E>
    where
        A: FnOnce() -> E,
        U: FnOnce(E) -> E,
    {
        self.try_add_or_update(key, || Ok(add()), |existing| Ok(update(existing)), hint)
    }

    /// 删除记录；不存在时返回 `false`
    fn try_delete(&self, key: &K) -> Result<bool>;
}

/// 完整的容器：读、写加初始化
pub trait AtomicContainer<K, E>: AtomicReader<K, E> + AtomicWriter<K, E> {
    /// 确保容器根目录存在（幂等）
    fn init_if_needed(&self) -> Result<()>;
}

/// 存储配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// 所有容器的基础目录
    pub base_dir: PathBuf,
    /// 记录格式
    pub format: Format,
    /// 分片目录层数，0 表示平铺
    pub shard_depth: u8,
    /// 等待文件锁的超时（毫秒），`None` 表示无限等待
    pub lock_timeout_ms: Option<u64>,
    /// 带超时等待时的重试间隔（毫秒）
    pub lock_poll_interval_ms: u64,
}

impl StorageConfig {
    /// 以指定目录创建默认配置
    pub fn with_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            ..Self::default()
        }
    }

    /// 锁等待超时
    #[must_use]
    pub fn lock_timeout(&self) -> Option<Duration> {
        self.lock_timeout_ms.map(Duration::from_millis)
    }

    /// 锁重试间隔（至少 1 毫秒）
    #[must_use]
    pub fn lock_poll_interval(&self) -> Duration {
        Duration::from_millis(self.lock_poll_interval_ms.max(1))
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            base_dir: dirs::data_local_dir()
                .map(|d| d.join("atomstore"))
                .unwrap_or_else(|| PathBuf::from(".atomstore")),
            format: Format::Json,
            shard_depth: 0,
            lock_timeout_ms: None,
            lock_poll_interval_ms: 10,
        }
    }
}
