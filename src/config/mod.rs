//! 存储配置的加载与持久化
//!
//! 配置文件为 TOML，缺失的字段取默认值；环境变量可以覆盖部分字段。

use crate::domain::error::{Result, StoreError};
use crate::domain::repositories::StorageConfig;
use crate::infrastructure::paths::{self, MAX_SHARD_DEPTH};
use std::path::{Path, PathBuf};

/// 覆盖基础目录
pub const ENV_BASE_DIR: &str = "ATOMSTORE_BASE_DIR";
/// 覆盖锁等待超时（毫秒，`0` 或空表示无限等待）
pub const ENV_LOCK_TIMEOUT_MS: &str = "ATOMSTORE_LOCK_TIMEOUT_MS";

impl StorageConfig {
    /// 从文件加载配置，文件不存在时返回默认配置
    pub fn load_from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("配置文件不存在，使用默认配置: {}", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| StoreError::Config(format!("读取 {} 失败: {}", path.display(), e)))?;
        let config: StorageConfig = toml::from_str(&content)
            .map_err(|e| StoreError::Config(format!("解析 {} 失败: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    /// 保存配置到文件（临时文件 + 原子替换）
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let content =
            toml::to_string_pretty(self).map_err(|e| StoreError::Config(e.to_string()))?;
        paths::write_file_safe(path, &content)
    }

    /// 应用环境变量覆盖
    pub fn apply_env_overrides(mut self) -> Result<Self> {
        if let Ok(dir) = std::env::var(ENV_BASE_DIR)
            && !dir.trim().is_empty()
        {
            self.base_dir = PathBuf::from(dir.trim());
        }

        if let Ok(raw) = std::env::var(ENV_LOCK_TIMEOUT_MS) {
            let raw = raw.trim();
            self.lock_timeout_ms = match raw {
                "" | "0" => None,
                _ => Some(raw.parse().map_err(|_| {
                    StoreError::Config(format!(
                        "{ENV_LOCK_TIMEOUT_MS} 不是有效的毫秒数: {raw}"
                    ))
                })?),
            };
        }

        self.validate()?;
        Ok(self)
    }

    /// 校验字段取值
    pub fn validate(&self) -> Result<()> {
        if self.base_dir.as_os_str().is_empty() {
            return Err(StoreError::Config("base_dir 不能为空".to_string()));
        }
        if self.shard_depth > MAX_SHARD_DEPTH {
            return Err(StoreError::Config(format!(
                "shard_depth 最大为 {MAX_SHARD_DEPTH}，实际为 {}",
                self.shard_depth
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::Format;
    use crate::test_utils::EnvGuard;
    use serial_test::serial;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = StorageConfig::load_from_file(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, StorageConfig::default());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.toml");
        std::fs::write(&path, "base_dir = \"/var/lib/views\"\nformat = \"toml\"\n").unwrap();

        let config = StorageConfig::load_from_file(&path).unwrap();
        assert_eq!(config.base_dir, PathBuf::from("/var/lib/views"));
        assert_eq!(config.format, Format::Toml);
        assert_eq!(config.shard_depth, 0);
        assert_eq!(config.lock_timeout(), None);
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.toml");
        let mut config = StorageConfig::with_base_dir(dir.path().join("data"));
        config.shard_depth = 2;
        config.lock_timeout_ms = Some(250);

        config.save_to_file(&path).unwrap();
        assert_eq!(StorageConfig::load_from_file(&path).unwrap(), config);
    }

    #[test]
    fn test_invalid_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.toml");
        std::fs::write(&path, "shard_depth = \"deep\"").unwrap();
        assert!(matches!(
            StorageConfig::load_from_file(&path),
            Err(StoreError::Config(_))
        ));

        std::fs::write(&path, "shard_depth = 9").unwrap();
        assert!(matches!(
            StorageConfig::load_from_file(&path),
            Err(StoreError::Config(_))
        ));
    }

    #[test]
    #[serial]
    fn test_env_overrides() {
        let guard = EnvGuard::new();
        guard.set_var(ENV_BASE_DIR, "/tmp/atomstore-env");
        guard.set_var(ENV_LOCK_TIMEOUT_MS, "1500");

        let config = StorageConfig::default().apply_env_overrides().unwrap();
        assert_eq!(config.base_dir, PathBuf::from("/tmp/atomstore-env"));
        assert_eq!(config.lock_timeout_ms, Some(1500));

        guard.set_var(ENV_LOCK_TIMEOUT_MS, "0");
        let config = config.apply_env_overrides().unwrap();
        assert_eq!(config.lock_timeout_ms, None);
    }

    #[test]
    #[serial]
    fn test_env_override_rejects_garbage() {
        let guard = EnvGuard::new();
        guard.remove_var(ENV_BASE_DIR);
        guard.set_var(ENV_LOCK_TIMEOUT_MS, "soon");

        assert!(matches!(
            StorageConfig::default().apply_env_overrides(),
            Err(StoreError::Config(_))
        ));
    }
}
