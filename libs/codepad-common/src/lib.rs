pub mod config;
pub mod error;
pub mod templates;
pub mod types;
