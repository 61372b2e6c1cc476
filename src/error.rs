//! Error types for the WebSocket client.
//!
//! Only failures that can be reported synchronously to the caller live here.
//! Transport failures that happen after `init` are delivered through
//! [`Delegate::on_error`](crate::Delegate::on_error) instead.

use thiserror::Error;

use crate::connection::ConnectionState;

/// Result type alias for WebSocket client operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by WebSocket client operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// The transport provider rejected handle creation.
    #[error("Transport handle creation failed (code {code})")]
    InitFailure {
        /// Raw value reported by the provider.
        code: i32,
    },

    /// `init` was called on a connection that already holds a handle.
    #[error("Connection already initialized")]
    AlreadyInitialized,

    /// The transport handle is absent (never initialized, or already closed).
    #[error("Connection closed")]
    ConnectionClosed,

    /// The operation is not allowed in the current connection state.
    #[error("Invalid connection state: {0}")]
    InvalidState(ConnectionState),

    /// Reserved close code that must not be sent.
    #[error("Invalid close code: {0}")]
    InvalidCloseCode(u16),

    /// Sub-protocol name that cannot be carried in the handshake.
    #[error("Invalid sub-protocol: {0:?}")]
    InvalidProtocol(String),

    /// Invalid UTF-8 in a text payload.
    #[error("Invalid UTF-8 in text frame")]
    InvalidUtf8,

    /// The transport provider refused an outbound operation.
    #[error("Transport error: {0}")]
    Transport(String),
}

impl From<std::str::Utf8Error> for Error {
    fn from(_: std::str::Utf8Error) -> Self {
        Error::InvalidUtf8
    }
}
