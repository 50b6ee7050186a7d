pub mod dashboard;
pub mod health;
pub mod map;
pub mod project_map;
pub mod tenements;
