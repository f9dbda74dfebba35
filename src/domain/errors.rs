//! Domain errors for offset resolution.

use thiserror::Error;

/// Errors raised while resolving a device's UTC offset.
///
/// Adapters translate their library errors into these variants so the
/// domain stays free of HTTP and storage types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// The user has not granted access to the device address.
    #[error("permission to read the device address was not granted")]
    PermissionDenied,

    /// Connection failure, timeout, or non-success HTTP status.
    #[error("{service} transport error: {reason}")]
    Transport {
        service: &'static str,
        reason: String,
    },

    /// Response body could not be decoded.
    #[error("{service} parse error: {reason}")]
    Parse {
        service: &'static str,
        reason: String,
    },

    /// Lookup succeeded but returned nothing usable.
    #[error("{service} returned no results")]
    NoResult { service: &'static str },

    /// Upstream answered with a non-OK status (e.g. REQUEST_DENIED).
    #[error("{service} rejected the request with status {status}")]
    Rejected {
        service: &'static str,
        status: String,
    },

    /// Durable offset store failure.
    #[error("offset store error: {0}")]
    Store(String),
}

impl ResolveError {
    pub fn transport(service: &'static str, reason: impl ToString) -> Self {
        Self::Transport {
            service,
            reason: reason.to_string(),
        }
    }

    pub fn parse(service: &'static str, reason: impl ToString) -> Self {
        Self::Parse {
            service,
            reason: reason.to_string(),
        }
    }
}
