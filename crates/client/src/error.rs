/// Failure of a call against the pedidos backend.
///
/// Every variant except `Rejected` is a transport-level failure: the server
/// either could not be reached or did not answer with a usable envelope.
/// `Rejected` is an application failure (`success: false`).
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Malformed response body: {0}")]
    Malformed(String),
    #[error("{action} failed with status: {status}, body: {body}")]
    UnexpectedStatus {
        action: &'static str,
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("Backend rejected request: {}", .message.as_deref().unwrap_or("no message"))]
    Rejected { message: Option<String> },
    #[error("Backend unavailable: {reason}")]
    Unavailable { reason: String },
    #[error("Invalid endpoint URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl ClientError {
    pub const fn is_transport(&self) -> bool {
        !matches!(self, Self::Rejected { .. })
    }

    /// Message supplied by the backend, only present on application failures.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Rejected { message } => message.as_deref().filter(|m| !m.trim().is_empty()),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        Self::Malformed(err.to_string())
    }
}
