pub mod config;
pub mod database;
pub mod errors;
pub mod map;
pub mod server;
pub mod services;
pub mod views;
