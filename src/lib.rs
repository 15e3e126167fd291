pub mod config;
pub mod engine;
pub mod error;
pub mod fleet;
pub mod geo;
pub mod models;
pub mod observability;
pub mod scenario;
