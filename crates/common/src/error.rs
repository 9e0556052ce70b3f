//! Startup and configuration errors

use thiserror::Error;

/// Errors raised while loading process configuration
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Missing secret {name}: set {env} or {file_key} in the config")]
    MissingSecret {
        name: &'static str,
        env: &'static str,
        file_key: &'static str,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Result alias using common Error
pub type Result<T> = std::result::Result<T, Error>;
