//! Request extractors that run ahead of the map handlers: authorization
//! first, then the viewport.

pub mod auth;
pub mod bounding_box;

pub use auth::ProjectContext;
pub use bounding_box::Viewport;
