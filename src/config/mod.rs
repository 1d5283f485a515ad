/// Database configuration and connection management
pub mod database;

/// Application settings loading from billing.toml
pub mod settings;
