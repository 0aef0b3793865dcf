//! Error handling for the ICP fit evaluator

use thiserror::Error;

#[derive(Error, Debug)]
pub enum IcpError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Credential error: {0}")]
    Credential(String),

    #[error("Document parse error: {0}")]
    DocumentParse(String),

    #[error("File format not supported: {0}")]
    UnsupportedFormat(String),

    #[error("{0}")]
    Validation(String),

    #[error("Remote service error{}: {message}", status_suffix(.status))]
    RemoteService { status: Option<u16>, message: String },

    #[error("Remote service did not answer within {seconds}s")]
    Timeout { seconds: u64 },

    #[error("Evaluation cancelled")]
    Cancelled,

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, IcpError>;

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" (status {s})")).unwrap_or_default()
}

impl IcpError {
    pub fn remote(message: impl Into<String>) -> Self {
        IcpError::RemoteService {
            status: None,
            message: message.into(),
        }
    }

    /// Errors after which the session can accept a new request.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, IcpError::Credential(_) | IcpError::Configuration(_))
    }
}

impl From<reqwest::Error> for IcpError {
    fn from(err: reqwest::Error) -> Self {
        IcpError::RemoteService {
            status: err.status().map(|s| s.as_u16()),
            message: err.to_string(),
        }
    }
}
