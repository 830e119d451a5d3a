//! Domain-level error type.
//!
//! Errors are transport agnostic. Inbound adapters decide how each
//! [`ErrorCode`] is rendered; the service layer only classifies failures.

use tracing::{error, warn};

use super::TraceId;
use super::ports::{CatalogError, PersistenceError};

/// Failure category shared by every layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// A required parameter or user reference is missing or malformed.
    InvalidRequest,
    /// Credentials are missing, invalid, or do not grant access.
    Unauthorized,
    /// The user, group, or game does not exist.
    NotFound,
    /// The user, group, or game already exists.
    Conflict,
    /// The game catalog throttled the request.
    RateLimited,
    /// Anything else. Never shown verbatim to clients.
    InternalError,
}

/// Domain error carrying a classification and a human message.
///
/// The current [`TraceId`] is captured on construction so adapters can
/// correlate the failure with logs.
///
/// # Examples
/// ```
/// use borga::domain::{Error, ErrorCode};
///
/// let err = Error::not_found("Group not found");
/// assert_eq!(err.code(), ErrorCode::NotFound);
/// assert_eq!(err.message(), "Group not found");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Error {
    code: ErrorCode,
    message: String,
    trace_id: Option<String>,
}

impl Error {
    /// Create an error, capturing the trace identifier in scope.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            trace_id: TraceId::current().map(|id| id.to_string()),
        }
    }

    /// Failure classification.
    #[must_use]
    pub fn code(&self) -> ErrorCode {
        self.code
    }

    /// Human-readable message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Trace identifier captured when the error was raised.
    #[must_use]
    pub fn trace_id(&self) -> Option<&str> {
        self.trace_id.as_deref()
    }

    /// Attach a trace identifier explicitly.
    #[must_use]
    pub fn with_trace_id(mut self, id: impl Into<String>) -> Self {
        self.trace_id = Some(id.into());
        self
    }

    /// Convenience constructor for [`ErrorCode::InvalidRequest`].
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidRequest, message)
    }

    /// Convenience constructor for [`ErrorCode::Unauthorized`].
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Unauthorized, message)
    }

    /// Convenience constructor for [`ErrorCode::NotFound`].
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    /// Convenience constructor for [`ErrorCode::Conflict`].
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Conflict, message)
    }

    /// Convenience constructor for [`ErrorCode::RateLimited`].
    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::RateLimited, message)
    }

    /// Convenience constructor for [`ErrorCode::InternalError`].
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl From<PersistenceError> for Error {
    fn from(value: PersistenceError) -> Self {
        match value {
            PersistenceError::MissingParameter
            | PersistenceError::ParameterTooLong
            | PersistenceError::MissingUser => Self::invalid_request(value.to_string()),
            PersistenceError::UserNotFound => Self::not_found(value.to_string()),
            PersistenceError::NotFound { message } => Self::not_found(message),
            PersistenceError::Conflict { message } => Self::conflict(message),
            PersistenceError::Store { message } => {
                error!(error = %message, "persistence gateway failed");
                Self::internal(message)
            }
        }
    }
}

impl From<CatalogError> for Error {
    fn from(value: CatalogError) -> Self {
        match value {
            CatalogError::RateLimited { message } => {
                warn!(error = %message, "game catalog rate limited the request");
                Self::rate_limited(message)
            }
            CatalogError::NotFound { message } => Self::not_found(message),
            CatalogError::Transport { .. }
            | CatalogError::Upstream { .. }
            | CatalogError::Decode { .. } => {
                error!(error = %value, "game catalog failed");
                Self::internal(value.to_string())
            }
        }
    }
}
