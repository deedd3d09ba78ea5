//! Error types for the object-tool crates.
//!
//! [`ObjectToolError`] covers the two families of failures this subsystem
//! distinguishes: configuration-shape errors that should fail loudly at
//! registration time (`UnknownTool`, `NotFound` from the registry,
//! `ImproperlyConfigured`) and request-shape errors that the dispatcher
//! converts into plain HTTP status responses instead of propagating.

use thiserror::Error;

/// The error type for all object-tool operations.
///
/// Each variant maps to an HTTP status code via
/// [`ObjectToolError::status_code`]. Configuration errors map to 500 since
/// they indicate a bug in the registration code, not a runtime condition.
#[derive(Error, Debug)]
pub enum ObjectToolError {
    /// HTTP 400 Bad Request.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// HTTP 403 Forbidden / Permission Denied.
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// A registry entry or target object does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// HTTP 405 Method Not Allowed.
    #[error("Method not allowed: {0}")]
    MethodNotAllowed(String),

    /// A declared tool name resolved to nothing: neither an inline handler,
    /// a named handler on the resource admin, nor a site registration.
    #[error("Unknown object tool: {0}")]
    UnknownTool(String),

    /// The subsystem is wired up incorrectly (e.g. dispatch against an
    /// unregistered resource).
    #[error("Improperly configured: {0}")]
    ImproperlyConfigured(String),

    /// A potentially malicious operation was detected, such as mutating an
    /// immutable query dictionary.
    #[error("Suspicious operation: {0}")]
    SuspiciousOperation(String),

    /// A submitted value failed validation. Form tools catch this and
    /// re-render; it never escapes to the caller as an error response.
    #[error("Validation error: {0}")]
    Validation(String),
}

impl ObjectToolError {
    /// Returns the HTTP status code associated with this error.
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::BadRequest(_) | Self::Validation(_) => 400,
            Self::PermissionDenied(_) | Self::SuspiciousOperation(_) => 403,
            Self::NotFound(_) => 404,
            Self::MethodNotAllowed(_) => 405,
            Self::UnknownTool(_) | Self::ImproperlyConfigured(_) => 500,
        }
    }
}

/// A convenience type alias for `Result<T, ObjectToolError>`.
pub type ToolResult<T> = Result<T, ObjectToolError>;
