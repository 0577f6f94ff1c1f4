//! Unified error type for trailerforge.
//!
//! Catalog, resolver and browse failures all funnel into [`Error`], which
//! carries enough context for the HTTP layer to derive a status code via
//! [`Error::http_status`].

use std::fmt;

/// Unified error type covering all failure modes in trailerforge.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A remote service was unreachable or answered with a failure status.
    #[error("Remote error [{service}]: {message}")]
    Remote {
        /// Name of the remote service (e.g. "tmdb", "extractor").
        service: String,
        /// Human-readable error description.
        message: String,
    },

    /// A remote service answered with a body that could not be decoded.
    #[error("Malformed response [{service}]: {message}")]
    Malformed {
        /// Name of the remote service.
        service: String,
        /// Human-readable error description.
        message: String,
    },

    /// The enclosing browse or refresh request was cancelled.
    #[error("Operation cancelled")]
    Cancelled,

    /// The requested entity could not be found.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// The kind of entity (e.g. "channel", "video").
        entity: String,
        /// The identifier that was looked up.
        id: String,
    },

    /// Request data or configuration failed validation.
    #[error("Validation error: {0}")]
    Validation(String),

    /// An I/O operation failed.
    #[error("IO error: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Catch-all for unexpected internal errors.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Map this error to an appropriate HTTP status code.
    pub fn http_status(&self) -> u16 {
        match self {
            Error::Remote { .. } => 502,
            Error::Malformed { .. } => 502,
            Error::Cancelled => 503,
            Error::NotFound { .. } => 404,
            Error::Validation(_) => 400,
            Error::Io { .. } => 500,
            Error::Internal(_) => 500,
        }
    }

    /// Short machine-readable code for API responses.
    pub fn code(&self) -> &'static str {
        match self {
            Error::Remote { .. } => "remote_error",
            Error::Malformed { .. } => "malformed_response",
            Error::Cancelled => "cancelled",
            Error::NotFound { .. } => "not_found",
            Error::Validation(_) => "validation_error",
            Error::Io { .. } => "io_error",
            Error::Internal(_) => "internal_error",
        }
    }

    /// Convenience constructor for [`Error::Remote`].
    pub fn remote(service: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Remote {
            service: service.into(),
            message: message.into(),
        }
    }

    /// Convenience constructor for [`Error::Malformed`].
    pub fn malformed(service: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Malformed {
            service: service.into(),
            message: message.into(),
        }
    }

    /// Convenience constructor for [`Error::NotFound`].
    pub fn not_found(entity: impl Into<String>, id: impl fmt::Display) -> Self {
        Error::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    /// Returns `true` for [`Error::Cancelled`].
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Error::Cancelled)
    }
}

/// Result alias using the crate-level [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
