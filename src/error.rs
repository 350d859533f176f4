use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Word list unavailable at {}: {source}", path.display())]
    ResourceUnavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Clipboard unavailable: {0}")]
    SinkUnavailable(String),

    #[error("Secure random source failed: {0}")]
    RandomSource(String),
}

pub type Result<T> = std::result::Result<T, Error>;
