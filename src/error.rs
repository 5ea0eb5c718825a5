//! Error type shared by the codec, the engine and the problem loader.

use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum Error {
    /// A caller broke an operation's contract (sizes, widths, lengths).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// A generation table could not be allocated for this instance size.
    #[error("resource exhausted: {0}")]
    ResourceExhausted(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("invalid problem data: {0}")]
    InvalidData(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    pub fn resource_exhausted(message: impl Into<String>) -> Self {
        Self::ResourceExhausted(message.into())
    }

    pub fn invalid_data(message: impl Into<String>) -> Self {
        Self::InvalidData(message.into())
    }
}
