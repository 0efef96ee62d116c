//! 文件锁守卫
//!
//! 打开的文件句柄本身就是互斥原语：写入方持有排他锁直到操作结束，
//! 读取方持有共享锁。锁在守卫析构时释放（句柄关闭时操作系统也会释放）。

use crate::domain::error::{Result, StoreError};
use std::fs::{File, TryLockError};
use std::path::Path;
use std::thread;
use std::time::{Duration, Instant};

/// 加锁模式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockMode {
    Shared,
    Exclusive,
}

/// 等锁策略
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockPolicy {
    /// `None` 表示无限等待
    pub timeout: Option<Duration>,
    pub poll_interval: Duration,
}

impl LockPolicy {
    /// 无限等待
    #[must_use]
    pub fn blocking() -> Self {
        Self {
            timeout: None,
            poll_interval: Duration::from_millis(10),
        }
    }

    /// 最多等待 `timeout`
    #[must_use]
    pub fn with_timeout(timeout: Duration, poll_interval: Duration) -> Self {
        Self {
            timeout: Some(timeout),
            poll_interval: poll_interval.max(Duration::from_millis(1)),
        }
    }
}

impl Default for LockPolicy {
    fn default() -> Self {
        Self::blocking()
    }
}

/// 持锁的文件句柄
#[derive(Debug)]
pub struct LockedFile {
    file: File,
    mode: LockMode,
}

impl LockedFile {
    /// 按策略加锁，失败时句柄随之关闭
    pub fn acquire(file: File, mode: LockMode, policy: &LockPolicy, path: &Path) -> Result<Self> {
        match policy.timeout {
            None => match mode {
                LockMode::Shared => file.lock_shared()?,
                LockMode::Exclusive => file.lock()?,
            },
            Some(timeout) => {
                Self::acquire_with_deadline(&file, mode, timeout, policy.poll_interval, path)?
            }
        }
        Ok(Self { file, mode })
    }

    fn acquire_with_deadline(
        file: &File,
        mode: LockMode,
        timeout: Duration,
        poll_interval: Duration,
        path: &Path,
    ) -> Result<()> {
        let started = Instant::now();
        loop {
            let attempt = match mode {
                LockMode::Shared => file.try_lock_shared(),
                LockMode::Exclusive => file.try_lock(),
            };
            match attempt {
                Ok(()) => return Ok(()),
                Err(TryLockError::WouldBlock) => {
                    let waited = started.elapsed();
                    if waited >= timeout {
                        log::warn!("等待文件锁超时: {} ({:?})", path.display(), mode);
                        return Err(StoreError::LockTimeout {
                            path: path.to_path_buf(),
                            waited_ms: u64::try_from(waited.as_millis()).unwrap_or(u64::MAX),
                        });
                    }
                    thread::sleep(poll_interval.min(timeout - waited));
                }
                Err(TryLockError::Error(err)) => return Err(err.into()),
            }
        }
    }

    #[must_use]
    pub fn mode(&self) -> LockMode {
        self.mode
    }

    pub fn file(&self) -> &File {
        &self.file
    }

    pub fn file_mut(&mut self) -> &mut File {
        &mut self.file
    }
}

impl Drop for LockedFile {
    fn drop(&mut self) {
        // 关闭句柄也会释放锁，这里显式解锁只是让释放时机确定
        let _ = self.file.unlock();
    }
}
