//! Error types for the Spyglass core domain

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    // Probe errors
    #[error("Invalid probe: {0}")]
    InvalidProbe(String),

    #[error("Invalid probe location: {0}")]
    InvalidLocation(String),

    // Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}
