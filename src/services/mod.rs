pub mod admin_service;
pub mod auth_service;
pub mod import_service;
pub mod project_map_service;

pub use admin_service::*;
pub use auth_service::*;
pub use import_service::*;
pub use project_map_service::*;
