//! Unified error type.
//!
//! Two families share one enum:
//!
//! - **Setup-time**: [`Error::InvalidArgument`] and [`Error::MissingHandler`]
//!   are returned from registration calls. Fix the registration; there is
//!   nothing to recover at request time.
//! - **Request-time**: everything a handler returns (or a panic the router
//!   caught) travels down the chain as the pending error until an
//!   error-aware handler consumes it or the fallback renders it.

use std::any::Any;
use std::net::AddrParseError;

use http::StatusCode;

/// A boxed foreign error.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The error type for registration, dispatch and transport failures.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A route was registered with a malformed pattern.
    #[error("invalid route pattern `{pattern}`: {reason}")]
    InvalidArgument { pattern: String, reason: String },

    /// A route was finalized without a handler.
    #[error("no handler given for route `{pattern}`")]
    MissingHandler { pattern: String },

    /// A handler panicked, or the application raised a bare fault.
    #[error("{message}")]
    HandlerFault { message: String },

    /// An application error that carries its own HTTP status.
    #[error("{message}")]
    Http { status: StatusCode, message: String },

    #[error("{0}")]
    Other(#[source] BoxError),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid socket address: {0}")]
    Addr(#[from] AddrParseError),
}

impl Error {
    /// A fault with a plain message, e.g. `Err(Error::fault("boom"))`.
    pub fn fault(message: impl Into<String>) -> Self {
        Self::HandlerFault { message: message.into() }
    }

    /// An error rendered by the default fallback with `status`.
    pub fn http(status: StatusCode, message: impl Into<String>) -> Self {
        Self::Http { status, message: message.into() }
    }

    /// Wraps any foreign error.
    pub fn other(err: impl Into<BoxError>) -> Self {
        Self::Other(err.into())
    }

    pub(crate) fn invalid(pattern: &str, reason: impl Into<String>) -> Self {
        Self::InvalidArgument { pattern: pattern.to_owned(), reason: reason.into() }
    }

    /// Converts a caught panic payload. `panic!` payloads are `&str` or
    /// `String`; anything else gets a generic message.
    pub(crate) fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let message = match payload.downcast::<String>() {
            Ok(s) => *s,
            Err(payload) => match payload.downcast::<&'static str>() {
                Ok(s) => (*s).to_owned(),
                Err(_) => "handler panicked".to_owned(),
            },
        };
        Self::HandlerFault { message }
    }

    /// The status the default fallback responds with.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Http { status, .. } => *status,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn panic_payloads_become_faults() {
        let err = Error::from_panic(Box::new("boom"));
        assert!(matches!(err, Error::HandlerFault { ref message } if message == "boom"));

        let err = Error::from_panic(Box::new(String::from("kaboom")));
        assert_eq!(err.to_string(), "kaboom");

        let err = Error::from_panic(Box::new(42_u8));
        assert_eq!(err.to_string(), "handler panicked");
    }

    #[test]
    fn status_defaults_to_500() {
        assert_eq!(Error::fault("x").status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(Error::http(StatusCode::FORBIDDEN, "no").status(), StatusCode::FORBIDDEN);
        let io = std::io::Error::other("disk");
        assert_eq!(Error::other(io).status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
