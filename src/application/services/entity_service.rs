//! 实体应用服务：在任意容器之上提供常用的读写组合

use crate::domain::error::{Result, StoreError};
use crate::domain::models::AddOrUpdateHint;
use crate::domain::repositories::AtomicContainer;
use std::cell::Cell;
use std::fmt::Display;
use std::marker::PhantomData;
use std::sync::Arc;

/// 实体服务
pub struct EntityService<K, E, C> {
    container: Arc<C>,
    _marker: PhantomData<fn(&K) -> E>,
}

impl<K, E, C> Clone for EntityService<K, E, C> {
    fn clone(&self) -> Self {
        Self {
            container: Arc::clone(&self.container),
            _marker: PhantomData,
        }
    }
}

impl<K, E, C> EntityService<K, E, C>
where
    K: Display,
    C: AtomicContainer<K, E>,
{
    pub fn new(container: Arc<C>) -> Self {
        Self {
            container,
            _marker: PhantomData,
        }
    }

    /// 底层容器
    pub fn container(&self) -> &Arc<C> {
        &self.container
    }

    /// 确保容器可用
    pub fn init(&self) -> Result<()> {
        self.container.init_if_needed()
    }

    /// 获取实体
    pub fn get(&self, key: &K) -> Result<Option<E>> {
        self.container.try_get(key)
    }

    /// 获取实体，不存在时返回默认值（不写入）
    pub fn get_or_default(&self, key: &K) -> Result<E>
    where
        E: Default,
    {
        Ok(self.container.try_get(key)?.unwrap_or_default())
    }

    /// 直接写入，覆盖已有记录
    pub fn set(&self, key: &K, value: E) -> Result<E> {
        let slot = Cell::new(Some(value));
        self.container.try_add_or_update(
            key,
            || take_once(&slot),
            |_| take_once(&slot),
            AddOrUpdateHint::ProbablyDoesNotExist,
        )
    }

    /// 不存在时写入 `new_value`，存在时应用 `update`
    pub fn add_or_update_value<U>(&self, key: &K, new_value: E, update: U) -> Result<E>
    where
        U: FnOnce(E) -> E,
    {
        self.container
            .add_or_update(key, || new_value, update, AddOrUpdateHint::default())
    }

    /// 只更新已存在的记录，不存在时返回 `NotFound`
    ///
    /// 键不存在时可能留下一个空文件，读取时仍视为不存在。
    pub fn update_or_err<U>(&self, key: &K, update: U) -> Result<E>
    where
        U: FnOnce(E) -> E,
    {
        self.container.try_add_or_update(
            key,
            || Err(StoreError::NotFound(key.to_string())),
            |current| Ok(update(current)),
            AddOrUpdateHint::ProbablyExists,
        )
    }

    /// 就地修改；不存在时先从默认值开始
    pub fn update_enforcing_new<F>(&self, key: &K, modify: F) -> Result<E>
    where
        E: Default,
        F: FnOnce(&mut E),
    {
        let slot = Cell::new(Some(modify));
        let apply = |mut value: E| -> Result<E> {
            let modify = take_once(&slot)?;
            modify(&mut value);
            Ok(value)
        };
        self.container.try_add_or_update(
            key,
            || apply(E::default()),
            |current| apply(current),
            AddOrUpdateHint::default(),
        )
    }

    /// 删除实体
    pub fn delete(&self, key: &K) -> Result<bool> {
        self.container.try_delete(key)
    }
}

/// 两个闭包中只会有一个被调用，值只取一次
fn take_once<T>(slot: &Cell<Option<T>>) -> Result<T> {
    slot.take()
        .ok_or_else(|| StoreError::Io(std::io::Error::other("写入值已被使用")))
}
