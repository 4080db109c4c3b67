pub mod commands;
pub mod config;
pub mod context;
pub mod errors;
pub mod serialization;
pub mod types;
