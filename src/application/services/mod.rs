//! 应用服务

pub mod entity_service;

pub use entity_service::EntityService;
