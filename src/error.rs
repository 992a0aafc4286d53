//! Error types

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while configuring or sizing a game
#[derive(Debug, Error)]
pub enum GridtankError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: ron::error::SpannedError,
    },

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] ron::Error),

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("arena of {width}x{height} cells cannot hold a tank")]
    ArenaTooSmall { width: i32, height: i32 },
}

pub type Result<T> = std::result::Result<T, GridtankError>;
