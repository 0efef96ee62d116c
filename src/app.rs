//! 存储工厂
//!
//! 用同一份配置为多个实体类型创建容器

use crate::application::services::EntityService;
use crate::domain::error::Result;
use crate::domain::models::Format;
use crate::domain::repositories::StorageConfig;
use crate::infrastructure::lock::LockPolicy;
use crate::infrastructure::paths::DefaultNamingStrategy;
use crate::infrastructure::storage::FileAtomicContainer;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fmt::Display;
use std::path::Path;
use std::sync::Arc;

/// 由配置创建的文件容器类型
pub type ConfiguredContainer<K, E> = FileAtomicContainer<K, E, DefaultNamingStrategy, Format>;

/// 存储工厂
#[derive(Debug, Clone)]
pub struct AtomicStorage {
    config: StorageConfig,
    strategy: DefaultNamingStrategy,
    lock_policy: LockPolicy,
}

impl AtomicStorage {
    /// 按配置创建工厂
    pub fn new(config: StorageConfig) -> Result<Self> {
        config.validate()?;
        let strategy = DefaultNamingStrategy::new(config.format.extension())
            .with_shard_depth(config.shard_depth);
        let lock_policy = match config.lock_timeout() {
            Some(timeout) => LockPolicy::with_timeout(timeout, config.lock_poll_interval()),
            None => LockPolicy::blocking(),
        };
        log::debug!(
            "存储工厂: {} (格式 {}, 分片 {})",
            config.base_dir.display(),
            config.format,
            config.shard_depth
        );
        Ok(Self {
            config,
            strategy,
            lock_policy,
        })
    }

    /// 从配置文件创建，并应用环境变量覆盖
    pub fn from_config_file(path: &Path) -> Result<Self> {
        let config = StorageConfig::load_from_file(path)?.apply_env_overrides()?;
        Self::new(config)
    }

    pub fn config(&self) -> &StorageConfig {
        &self.config
    }

    /// 创建容器（不创建目录）
    pub fn container<K, E>(&self) -> ConfiguredContainer<K, E>
    where
        K: Display,
        E: Serialize + DeserializeOwned,
    {
        FileAtomicContainer::new(&self.config.base_dir, self.strategy.clone(), self.config.format)
            .with_lock_policy(self.lock_policy)
    }

    /// 创建容器并确保其根目录存在
    pub fn init_container<K, E>(&self) -> Result<ConfiguredContainer<K, E>>
    where
        K: Display,
        E: Serialize + DeserializeOwned,
    {
        let container = self.container::<K, E>();
        container.init_if_needed()?;
        Ok(container)
    }

    /// 创建已初始化容器上的实体服务
    pub fn service<K, E>(&self) -> Result<EntityService<K, E, ConfiguredContainer<K, E>>>
    where
        K: Display,
        E: Serialize + DeserializeOwned,
    {
        Ok(EntityService::new(Arc::new(self.init_container::<K, E>()?)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::Counter;

    #[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
    struct UserProfile {
        name: String,
    }

    #[test]
    fn test_containers_share_base_dir() {
        let dir = tempfile::tempdir().unwrap();
        let storage = AtomicStorage::new(StorageConfig::with_base_dir(dir.path())).unwrap();

        let counters = storage.init_container::<String, Counter>().unwrap();
        let profiles = storage.init_container::<u64, UserProfile>().unwrap();
        assert_eq!(counters.folder(), dir.path().join("counter"));
        assert_eq!(profiles.folder(), dir.path().join("user-profile"));
    }

    #[test]
    fn test_toml_format_with_shards() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = StorageConfig::with_base_dir(dir.path());
        config.format = Format::Toml;
        config.shard_depth = 1;
        let storage = AtomicStorage::new(config).unwrap();

        let service = storage.service::<u64, UserProfile>().unwrap();
        service
            .set(&7, UserProfile { name: "ada".to_string() })
            .unwrap();

        let path = service.container().path_for(&7).unwrap();
        assert_eq!(path.extension().unwrap(), "toml");
        assert_eq!(std::fs::read_to_string(&path).unwrap().trim(), "name = \"ada\"");
        assert_eq!(
            service.get(&7).unwrap(),
            Some(UserProfile { name: "ada".to_string() })
        );
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = StorageConfig::with_base_dir("/tmp/unused");
        config.shard_depth = 10;
        assert!(AtomicStorage::new(config).is_err());
    }
}
