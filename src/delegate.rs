//! Application callbacks for connection events.

use std::fmt;

use crate::connection::WebSocket;
use crate::message::MessageData;

/// Classification of a transport failure reported through [`Delegate::on_error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// The handshake or an operation timed out.
    TimeOut,
    /// The connection could not be established or was lost.
    ConnectionFailure,
    /// Any other failure.
    Unknown,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCode::TimeOut => write!(f, "TimeOut"),
            ErrorCode::ConnectionFailure => write!(f, "ConnectionFailure"),
            ErrorCode::Unknown => write!(f, "Unknown"),
        }
    }
}

/// Receives lifecycle and message events for a [`WebSocket`].
///
/// Callbacks run on whichever thread the transport provider delivers events
/// on, one at a time per connection. Guarantees:
///
/// - `on_open` fires at most once, and before any `on_message`
/// - `on_close` fires at most once and is the last callback for a connection
/// - no new callback starts after [`WebSocket::close_async`] returns; one
///   already running on another thread completes normally
///
/// Handlers must not block: the provider's event loop is stalled while they run.
pub trait Delegate: Send + Sync {
    /// The handshake completed.
    fn on_open(&self, ws: &WebSocket);

    /// A data frame arrived. `data` borrows the provider's buffer.
    fn on_message(&self, ws: &WebSocket, data: &MessageData<'_>);

    /// The connection closed.
    fn on_close(&self, ws: &WebSocket);

    /// The transport reported a failure. A close event normally follows.
    fn on_error(&self, ws: &WebSocket, error: ErrorCode);
}
