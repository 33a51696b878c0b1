//! # Domain Errors
//!
//! Error types for feed synchronization.
//!
//! Two layers: [`GatewayError`] is what the remote API boundary reports,
//! [`FeedError`] is the taxonomy the stores and the coordinator work with.

use thiserror::Error;

/// Failure reported by the API gateway port.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GatewayError {
    /// The request never produced a response (connect error, timeout, reset).
    #[error("Network failure: {0}")]
    Network(String),

    /// The server answered with a non-success status.
    #[error("Rejected by server ({status}): {message}")]
    Rejected {
        /// HTTP status code
        status: u16,
        /// Server-provided detail or the status text
        message: String,
    },

    /// The response body could not be decoded.
    #[error("Malformed response: {0}")]
    Malformed(String),
}

/// Feed client error taxonomy.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FeedError {
    /// No bearer credential is available; callers navigate to sign-up/login
    /// instead of surfacing this inline.
    #[error("No credential present")]
    NoCredential,

    /// Transport-level failure, including timeouts.
    #[error("Network failure: {0}")]
    Network(String),

    /// The server refused the request.
    #[error("Rejected by server ({status}): {message}")]
    RejectedByServer {
        /// HTTP status code
        status: u16,
        /// Server-provided detail or the status text
        message: String,
    },

    /// The response as a whole had an unusable shape.
    ///
    /// Individual malformed fields never produce this; they fall back to
    /// sentinel values instead.
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// An intent was refused because its precondition did not hold.
    #[error("Precondition violated: {0}")]
    PreconditionViolation(String),

    /// Materializing a downloaded asset locally failed.
    #[error("Local asset failure: {0}")]
    Asset(String),
}

impl FeedError {
    /// Whether a manual retry of the same operation could succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            FeedError::Network(_)
                | FeedError::RejectedByServer { .. }
                | FeedError::MalformedResponse(_)
        )
    }

    /// Whether this error must never be shown to the user.
    pub fn is_silent(&self) -> bool {
        matches!(self, FeedError::PreconditionViolation(_))
    }
}

impl From<GatewayError> for FeedError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::Network(msg) => FeedError::Network(msg),
            GatewayError::Rejected { status, message } => {
                FeedError::RejectedByServer { status, message }
            }
            GatewayError::Malformed(msg) => FeedError::MalformedResponse(msg),
        }
    }
}
