/// Error types for the CareLink client
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Unexpected HTTP {status} from {endpoint}")]
    Status { endpoint: String, status: u16 },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

pub type Result<T> = std::result::Result<T, ClientError>;
