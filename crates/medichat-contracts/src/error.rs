//! Error types shared by every MediChat crate.
//!
//! All fallible operations return `MediChatResult<T>`. Variants carry enough
//! context to produce a useful log line; the action layer decides which of
//! them are safe to show to a user verbatim.

use thiserror::Error;

/// The unified error type for MediChat.
#[derive(Debug, Error)]
pub enum MediChatError {
    /// User-supplied input failed a form-level check.
    ///
    /// The `reason` is written for the end user and is shown as-is.
    #[error("{reason}")]
    InvalidInput { field: String, reason: String },

    /// The request to the model provider could not be completed
    /// (connection refused, timeout, TLS failure).
    #[error("model request failed: {reason}")]
    ModelRequest { reason: String },

    /// The model provider answered with a non-success HTTP status.
    #[error("model provider returned HTTP {status}: {body}")]
    ModelHttp { status: u16, body: String },

    /// The model replied, but the reply could not be turned into the
    /// flow's output type.
    #[error("could not parse model reply: {reason}")]
    ResponseParsing { reason: String },

    /// The parsed output failed schema or rule verification.
    #[error("output verification failed: {reason}")]
    VerificationFailed { reason: String },

    /// A required configuration value is missing or invalid.
    #[error("configuration error: {reason}")]
    ConfigError { reason: String },

    /// A referenced entity does not exist in the store.
    #[error("{entity} '{id}' not found")]
    NotFound { entity: String, id: String },

    /// The operation would duplicate an existing entity.
    #[error("conflict: {reason}")]
    Conflict { reason: String },

    /// Credentials did not match.
    #[error("unauthorized: {reason}")]
    Unauthorized { reason: String },

    /// The simulated payment could not be applied.
    #[error("payment failed: {reason}")]
    PaymentFailed { reason: String },
}

impl MediChatError {
    /// Shorthand for an `InvalidInput` error.
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// True for failures of the external model call or of reading its reply.
    ///
    /// These are the only errors a flow fallback may replace.
    pub fn is_model_failure(&self) -> bool {
        matches!(
            self,
            Self::ModelRequest { .. } | Self::ModelHttp { .. } | Self::ResponseParsing { .. }
        )
    }
}

/// Convenience alias used throughout the MediChat crates.
pub type MediChatResult<T> = Result<T, MediChatError>;
