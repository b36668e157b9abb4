use super::utils::DateError;

#[derive(thiserror::Error, Debug)]
pub enum TransportError {
    #[error("Init error: {0}")]
    Init(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Deserialize error: {0}")]
    Deserialize(#[from] serde_json::Error),

    #[error("Error response: {0} {1}")]
    Status(u16, String),

    #[error("Invalid date: {0}")]
    DateFormat(#[from] DateError),
}

pub type TransportResult<T> = Result<T, TransportError>;
