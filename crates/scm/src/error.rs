//! Error types for provider API operations.

use thiserror::Error;

/// Errors that can occur while reconciling resources against the provider.
#[derive(Error, Debug)]
pub enum ScmError {
    /// HTTP request failed before a response was received.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Resource does not exist.
    #[error("resource not found: {resource}")]
    NotFound { resource: String },

    /// Request conflicts with existing remote state.
    #[error("conflict ({status}): {message}")]
    Conflict { status: u16, message: String },

    /// Credentials are missing, invalid, or lack the required scope.
    #[error("authorization denied ({status}): {message}")]
    AuthDenied { status: u16, message: String },

    /// Transient provider failure. A later identical re-run may succeed;
    /// no retries happen at this layer.
    #[error("transient provider error ({status}): {message}")]
    Transient { status: u16, message: String },

    /// Any other API error response.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Response body could not be decoded.
    #[error("decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// A desired spec failed local validation.
    #[error("invalid spec: {0}")]
    InvalidSpec(String),
}

impl ScmError {
    /// Classify a non-success response status into the error taxonomy.
    ///
    /// `rate_limited` comes from the `x-ratelimit-remaining` header and
    /// distinguishes a rate-limited 403 from a plain permission failure.
    pub fn from_status(status: u16, rate_limited: bool, resource: &str, message: String) -> Self {
        match status {
            404 => Self::NotFound {
                resource: resource.to_string(),
            },
            401 => Self::AuthDenied { status, message },
            403 if rate_limited => Self::Transient { status, message },
            403 => Self::AuthDenied { status, message },
            409 | 422 => Self::Conflict { status, message },
            429 => Self::Transient { status, message },
            s if s >= 500 => Self::Transient { status, message },
            _ => Self::Api { status, message },
        }
    }

    /// True when a later re-run of the same operation may succeed without
    /// operator intervention.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transient { .. })
    }
}
