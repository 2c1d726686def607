use thiserror::Error;

/// Transport-level failure of a backend call.
///
/// Validation failures never become an `ApiError`; they are caught locally
/// by the workflows before a request is built. An unparsable response body
/// folds into `Server` with a generic message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// No response at all (connection refused, DNS failure, timeout).
    #[error("Network error: {0}")]
    Network(String),
    /// The backend answered with a non-2xx status, or with a 2xx body the
    /// client could not parse.
    #[error("{message}")]
    Server { status: u16, message: String },
}

impl ApiError {
    pub fn is_network(&self) -> bool {
        matches!(self, ApiError::Network(_))
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Network(_) => None,
            ApiError::Server { status, .. } => Some(*status),
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(error: reqwest::Error) -> Self {
        ApiError::Network(error.to_string())
    }
}
