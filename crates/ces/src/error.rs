//! # World Error Types
//!
//! All errors that can occur in the world layer.

use thiserror::Error;

use ces_core::{Handle, StoreError};

/// Errors that can occur in the world layer.
#[derive(Error, Debug)]
pub enum WorldError {
    /// A slot store rejected an operation.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A component was attached to an entity that is not alive.
    #[error("entity {0:?} is not alive")]
    DeadEntity(Handle),

    /// The configuration file could not be read.
    #[error("failed to read configuration: {0}")]
    ConfigIo(#[from] std::io::Error),

    /// The configuration is not valid TOML or has unknown keys.
    #[error("failed to parse configuration: {0}")]
    Config(#[from] toml::de::Error),

    /// The configuration parsed but holds an unusable value.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for world operations.
pub type WorldResult<T> = Result<T, WorldError>;
