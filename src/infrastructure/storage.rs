//! 文件原子容器：每个键一个文件，文件句柄即锁

use crate::domain::error::{Result, StoreError};
use crate::domain::models::{AddOrUpdateHint, EntityType};
use crate::domain::repositories::{
    AtomicContainer, AtomicReader, AtomicWriter, NamingStrategy, Serializer,
};
use crate::infrastructure::lock::{LockMode, LockPolicy, LockedFile};
use crate::infrastructure::paths;
use std::fmt::{self, Display};
use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

/// 文件原子容器
///
/// 磁盘布局：`<base_dir>/<folder_for(实体)>/<name_for(实体, 键)>`，
/// 文件的全部内容就是一条序列化记录，没有头部或校验和。
///
/// - 读取持有共享锁，不阻塞其他读取方
/// - `add_or_update` 在整个读-改-写期间持有排他锁，同一键串行，不同键互不影响
/// - 删除不加锁，依赖文件系统的原子删除
pub struct FileAtomicContainer<K, E, N, S> {
    strategy: N,
    serializer: S,
    folder: PathBuf,
    entity: EntityType,
    lock_policy: LockPolicy,
    _marker: PhantomData<fn(&K) -> E>,
}

impl<K, E, N, S> FileAtomicContainer<K, E, N, S>
where
    K: Display,
    N: NamingStrategy,
    S: Serializer<E>,
{
    /// 创建容器；根目录在构造时一次算好
    pub fn new(directory: impl AsRef<Path>, strategy: N, serializer: S) -> Self {
        let entity = EntityType::of::<K, E>();
        let folder = directory.as_ref().join(strategy.folder_for(&entity));
        Self {
            strategy,
            serializer,
            folder,
            entity,
            lock_policy: LockPolicy::default(),
            _marker: PhantomData,
        }
    }

    /// 设置等锁策略
    #[must_use]
    pub fn with_lock_policy(mut self, policy: LockPolicy) -> Self {
        self.lock_policy = policy;
        self
    }

    /// 容器根目录
    pub fn folder(&self) -> &Path {
        &self.folder
    }

    pub fn entity_type(&self) -> &EntityType {
        &self.entity
    }

    /// 键对应的完整文件路径
    pub fn path_for(&self, key: &K) -> Result<PathBuf> {
        let relative = self.strategy.name_for(&self.entity, &key.to_string());
        paths::validate_relative(&relative)?;
        Ok(self.folder.join(relative))
    }

    /// 确保根目录存在（幂等，可并发调用）
    pub fn init_if_needed(&self) -> Result<()> {
        fs::create_dir_all(&self.folder)?;
        log::debug!("容器已就绪: {} -> {}", self.entity, self.folder.display());
        Ok(())
    }

    /// 读取记录
    ///
    /// 文件不存在（包括检查后被并发删除）或长度为零都视为 "不存在"。
    pub fn try_get(&self, key: &K) -> Result<Option<E>> {
        let path = self.path_for(key)?;

        let file = match File::open(&path) {
            Ok(file) => file,
            Err(err) if is_absent(&err) => {
                log::trace!("读取 {}: 不存在", path.display());
                return Ok(None);
            }
            Err(err) => return Err(err.into()),
        };

        let mut locked = LockedFile::acquire(file, LockMode::Shared, &self.lock_policy, &path)?;
        let data = read_all(locked.file_mut())?;
        drop(locked);
        if data.is_empty() {
            log::trace!("读取 {}: 空文件", path.display());
            return Ok(None);
        }

        let value = self.serializer.deserialize(&mut data.as_slice())?;
        log::trace!("读取 {}: {} 字节", path.display(), data.len());
        Ok(Some(value))
    }

    /// 读-改-写
    ///
    /// 1. 确保键的父目录存在（允许命名策略引入任意分片层）
    /// 2. 打开或创建文件并持有排他锁直到返回
    /// 3. 空文件走 `add`，否则反序列化后走 `update`
    /// 4. 先序列化到独立缓冲区，再覆盖文件并截断到新长度
    ///
    /// 闭包或序列化失败时文件内容不变。
    pub fn try_add_or_update<A, U>(
        &self,
        key: &K,
        add: A,
        update: U,
        hint: AddOrUpdateHint,
    ) -> Result<E>
    where
        A: FnOnce() -> Result<E>,
        U: FnOnce(E) -> Result<E>,
    {
        let path = self.path_for(key)?;
        let file = self.open_for_update(&path, hint)?;
        let mut locked = LockedFile::acquire(file, LockMode::Exclusive, &self.lock_policy, &path)?;

        let existing = read_all(locked.file_mut())?;
        let added = existing.is_empty();
        let result = if added {
            add()?
        } else {
            let current = self.serializer.deserialize(&mut existing.as_slice())?;
            update(current)?
        };

        let mut buffer = Vec::new();
        self.serializer.serialize(&result, &mut buffer)?;
        if buffer.is_empty() {
            return Err(StoreError::Serialization(
                "序列化结果为空，空文件表示记录不存在".to_string(),
            ));
        }

        let file = locked.file_mut();
        file.seek(SeekFrom::Start(0))?;
        file.write_all(&buffer)?;
        file.set_len(buffer.len() as u64)?;

        log::debug!(
            "{} {}: {} 字节",
            if added { "新增" } else { "更新" },
            path.display(),
            buffer.len()
        );
        Ok(result)
    }

    /// 删除记录；不加锁
    pub fn try_delete(&self, key: &K) -> Result<bool> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => {
                log::debug!("删除 {}", path.display());
                Ok(true)
            }
            Err(err) if is_absent(&err) => Ok(false),
            Err(err) => Err(err.into()),
        }
    }

    /// 以读写方式打开（不存在则创建）
    ///
    /// `ProbablyExists` 先直接打开，找不到时再走完整路径；结果与提示无关。
    fn open_for_update(&self, path: &Path, hint: AddOrUpdateHint) -> Result<File> {
        if hint == AddOrUpdateHint::ProbablyExists {
            match open_read_write(path) {
                Ok(file) => return Ok(file),
                Err(err) if err.kind() == io::ErrorKind::NotFound => {}
                Err(err) => return Err(err.into()),
            }
        }

        self.ensure_parent(path)?;
        open_read_write(path).map_err(|err| {
            if err.kind() == io::ErrorKind::NotFound {
                self.container_missing()
            } else {
                err.into()
            }
        })
    }

    /// 创建键所在的分片目录；根目录必须已经存在
    fn ensure_parent(&self, path: &Path) -> Result<()> {
        let Some(parent) = path.parent() else {
            return Ok(());
        };
        if parent.is_dir() {
            return Ok(());
        }
        if !self.folder.is_dir() {
            return Err(self.container_missing());
        }

        fs::create_dir_all(parent).map_err(|err| {
            if err.kind() == io::ErrorKind::NotFound {
                self.container_missing()
            } else {
                err.into()
            }
        })
    }

    fn container_missing(&self) -> StoreError {
        log::warn!("容器目录不存在: {}", self.folder.display());
        StoreError::ContainerMissing(self.folder.clone())
    }
}

impl<K, E, N, S> fmt::Debug for FileAtomicContainer<K, E, N, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileAtomicContainer")
            .field("entity", &self.entity)
            .field("folder", &self.folder)
            .field("lock_policy", &self.lock_policy)
            .finish_non_exhaustive()
    }
}

impl<K, E, N, S> AtomicReader<K, E> for FileAtomicContainer<K, E, N, S>
where
    K: Display,
    N: NamingStrategy,
    S: Serializer<E>,
{
    fn try_get(&self, key: &K) -> Result<Option<E>> {
        FileAtomicContainer::try_get(self, key)
    }
}

impl<K, E, N, S> AtomicWriter<K, E> for FileAtomicContainer<K, E, N, S>
where
    K: Display,
    N: NamingStrategy,
    S: Serializer<E>,
{
    fn try_add_or_update<A, U>(
        &self,
        key: &K,
        add: A,
        update: U,
        hint: AddOrUpdateHint,
    ) -> Result<E>
    where
        A: FnOnce() -> Result<E>,
        U: FnOnce(E) -> Result<E>,
    {
        FileAtomicContainer::try_add_or_update(self, key, add, update, hint)
    }

    fn try_delete(&self, key: &K) -> Result<bool> {
        FileAtomicContainer::try_delete(self, key)
    }
}

impl<K, E, N, S> AtomicContainer<K, E> for FileAtomicContainer<K, E, N, S>
where
    K: Display,
    N: NamingStrategy,
    S: Serializer<E>,
{
    fn init_if_needed(&self) -> Result<()> {
        FileAtomicContainer::init_if_needed(self)
    }
}

fn open_read_write(path: &Path) -> io::Result<File> {
    OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(false)
        .open(path)
}

/// 读取全部内容（从文件开头）
fn read_all(file: &mut File) -> io::Result<Vec<u8>> {
    let len = file.metadata().map(|m| m.len()).unwrap_or(0);
    let mut data = Vec::with_capacity(usize::try_from(len).unwrap_or(0));
    file.seek(SeekFrom::Start(0))?;
    file.read_to_end(&mut data)?;
    Ok(data)
}

/// 文件或其所在目录不存在
fn is_absent(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::NotFound | io::ErrorKind::NotADirectory
    )
}
