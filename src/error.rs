//! Unified error type.

use thiserror::Error;

/// The error type returned by httpcmp's fallible infrastructure operations.
///
/// Request-level failures (400, 415, 422, etc.) are expressed as
/// [`Failure`](crate::Failure) values and end up in the response body. This
/// type surfaces what happens outside a request: reading configuration,
/// binding to a port, accepting a connection.
#[derive(Debug, Error)]
pub enum Error {
    /// The configured listen address is not a valid `host:port`.
    #[error("invalid listen address `{addr}`: {source}")]
    InvalidAddr {
        addr: String,
        #[source]
        source: std::net::AddrParseError,
    },

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}
