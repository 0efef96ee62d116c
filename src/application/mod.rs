//! Application Layer - 应用服务
//!
//! 包含：
//! - services: 建立在容器接口之上的便捷操作

pub mod services;

pub use services::EntityService;
