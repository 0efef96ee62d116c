//! 领域模型

pub mod entity;
pub mod format;

pub use entity::{AddOrUpdateHint, EntityType};
pub use format::Format;
