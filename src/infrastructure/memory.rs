//! 内存容器：与文件容器语义一致，记录以序列化字节保存在进程内

use crate::domain::error::{Result, StoreError};
use crate::domain::models::AddOrUpdateHint;
use crate::domain::repositories::{AtomicContainer, AtomicReader, AtomicWriter, Serializer};
use std::collections::HashMap;
use std::fmt::Display;
use std::marker::PhantomData;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// 内存原子容器
///
/// 读-改-写在整表写锁内完成。只在单进程内有效，适合测试和临时数据。
pub struct MemoryAtomicContainer<K, E, S> {
    inner: RwLock<HashMap<String, Vec<u8>>>,
    serializer: S,
    _marker: PhantomData<fn(&K) -> E>,
}

impl<K, E, S> MemoryAtomicContainer<K, E, S>
where
    K: Display,
    S: Serializer<E>,
{
    pub fn new(serializer: S) -> Self {
        Self {
            inner: RwLock::new(HashMap::new()),
            serializer,
            _marker: PhantomData,
        }
    }

    /// 记录数
    pub fn len(&self) -> usize {
        self.inner.read().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 直接取出某个键的原始字节
    pub fn raw(&self, key: &K) -> Result<Option<Vec<u8>>> {
        Ok(self.read()?.get(&key.to_string()).cloned())
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, HashMap<String, Vec<u8>>>> {
        self.inner
            .read()
            .map_err(|_| StoreError::Io(std::io::Error::other("内存容器锁已中毒")))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, HashMap<String, Vec<u8>>>> {
        self.inner
            .write()
            .map_err(|_| StoreError::Io(std::io::Error::other("内存容器锁已中毒")))
    }
}

impl<K, E, S> AtomicReader<K, E> for MemoryAtomicContainer<K, E, S>
where
    K: Display,
    S: Serializer<E>,
{
    fn try_get(&self, key: &K) -> Result<Option<E>> {
        let data = match self.read()?.get(&key.to_string()) {
            Some(data) if !data.is_empty() => data.clone(),
            _ => return Ok(None),
        };
        Ok(Some(self.serializer.deserialize(&mut data.as_slice())?))
    }
}

impl<K, E, S> AtomicWriter<K, E> for MemoryAtomicContainer<K, E, S>
where
    K: Display,
    S: Serializer<E>,
{
    fn try_add_or_update<A, U>(
        &self,
        key: &K,
        add: A,
        update: U,
        _hint: AddOrUpdateHint,
    ) -> Result<E>
    where
        A: FnOnce() -> Result<E>,
        U: FnOnce(E) -> Result<E>,
    {
        let name = key.to_string();
        let mut map = self.write()?;

        let result = match map.get(&name) {
            Some(data) if !data.is_empty() => {
                let current = self.serializer.deserialize(&mut data.as_slice())?;
                update(current)?
            }
            _ => add()?,
        };

        let mut buffer = Vec::new();
        self.serializer.serialize(&result, &mut buffer)?;
        if buffer.is_empty() {
            return Err(StoreError::Serialization(
                "序列化结果为空，空记录表示不存在".to_string(),
            ));
        }
        map.insert(name, buffer);
        Ok(result)
    }

    fn try_delete(&self, key: &K) -> Result<bool> {
        Ok(self.write()?.remove(&key.to_string()).is_some())
    }
}

impl<K, E, S> AtomicContainer<K, E> for MemoryAtomicContainer<K, E, S>
where
    K: Display,
    S: Serializer<E>,
{
    fn init_if_needed(&self) -> Result<()> {
        Ok(())
    }
}
