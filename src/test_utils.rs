//! 测试工具模块
//!
//! 提供环境变量守卫、计数器实体和临时容器，避免测试之间互相污染

use crate::domain::error::{Result, StoreError};
use crate::domain::repositories::Serializer;
use crate::infrastructure::format::JsonSerializer;
use crate::infrastructure::paths::DefaultNamingStrategy;
use crate::infrastructure::storage::FileAtomicContainer;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::io::{Read, Write};
use tempfile::TempDir;

/// 测试用计数器实体
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counter {
    pub value: i64,
}

impl Counter {
    pub fn new(value: i64) -> Self {
        Self { value }
    }
}

/// 能读 JSON 但写入总是失败的序列化器
pub struct FailingSerializer;

impl Serializer<Counter> for FailingSerializer {
    fn serialize(&self, _value: &Counter, sink: &mut dyn Write) -> Result<()> {
        // 先写一半再失败，容器不能把这些字节落到文件上
        sink.write_all(b"{\"val")?;
        Err(StoreError::Serialization("模拟序列化失败".to_string()))
    }

    fn deserialize(&self, source: &mut dyn Read) -> Result<Counter> {
        JsonSerializer::compact().deserialize(source)
    }
}

pub type CounterContainer =
    FileAtomicContainer<String, Counter, DefaultNamingStrategy, JsonSerializer>;

/// 在临时目录中创建并初始化计数器容器
pub fn counter_container() -> (TempDir, CounterContainer) {
    let dir = tempfile::tempdir().unwrap();
    let container = FileAtomicContainer::new(
        dir.path(),
        DefaultNamingStrategy::default(),
        JsonSerializer::compact(),
    );
    container.init_if_needed().unwrap();
    (dir, container)
}

/// 环境变量守卫 - 自动清理
pub struct EnvGuard {
    original_vars: HashMap<String, String>,
}

impl Default for EnvGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl EnvGuard {
    /// 创建一个新的环境守卫，记录当前环境变量
    pub fn new() -> Self {
        let original_vars: HashMap<String, String> = env::vars().collect();
        Self { original_vars }
    }

    /// 设置测试环境变量（自动包装为 unsafe）
    pub fn set_var(&self, key: &str, value: &str) {
        unsafe {
            env::set_var(key, value);
        }
    }

    /// 移除环境变量（自动包装为 unsafe）
    pub fn remove_var(&self, key: &str) {
        unsafe {
            env::remove_var(key);
        }
    }
}

impl Drop for EnvGuard {
    /// 释放时恢复原始环境变量
    fn drop(&mut self) {
        let current_vars: Vec<String> = env::vars().map(|(k, _)| k).collect();
        for key in current_vars {
            if !self.original_vars.contains_key(&key) {
                self.remove_var(&key);
            }
        }

        for (key, value) in &self.original_vars {
            if env::var(key).as_deref() != Ok(value.as_str()) {
                self.set_var(key, value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_env_guard_cleanup() {
        {
            let guard = EnvGuard::new();
            guard.set_var("ATOMSTORE_TEST_CLEANUP", "cleanup_test");
            assert_eq!(env::var("ATOMSTORE_TEST_CLEANUP").unwrap(), "cleanup_test");
        }
        // guard 被释放后，变量应该被清理
        assert!(env::var("ATOMSTORE_TEST_CLEANUP").is_err());
    }

    #[test]
    fn test_counter_container_is_initialized() {
        let (_dir, container) = counter_container();
        assert!(container.folder().is_dir());
        assert!(container.folder().ends_with("counter"));
    }
}
