//! 实体类型描述与写入提示

use std::any::type_name;
use std::fmt;

/// 实体类型描述：容器由 (键类型, 实体类型) 唯一确定
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntityType {
    entity: &'static str,
    key: &'static str,
}

impl EntityType {
    /// 由泛型参数构造
    #[must_use]
    pub fn of<K: ?Sized, E: ?Sized>() -> Self {
        Self {
            entity: type_name::<E>(),
            key: type_name::<K>(),
        }
    }

    /// 实体类型的完整路径名，例如 `my_app::views::Counter`
    #[must_use]
    pub fn entity_name(&self) -> &'static str {
        self.entity
    }

    /// 键类型的完整路径名
    #[must_use]
    pub fn key_name(&self) -> &'static str {
        self.key
    }

    /// 去掉模块路径与泛型参数后的实体名，例如 `Counter`
    #[must_use]
    pub fn short_name(&self) -> &'static str {
        let base = self.entity.split('<').next().unwrap_or(self.entity);
        base.rsplit("::").next().unwrap_or(base)
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.short_name(), self.key)
    }
}

/// `add_or_update` 的建议性提示
///
/// 只影响实现选择的代码路径（例如跳过目录探测），不影响结果。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AddOrUpdateHint {
    /// 记录多半已存在（更新为主）
    ProbablyExists,
    /// 记录多半不存在（插入为主）
    #[default]
    ProbablyDoesNotExist,
}
