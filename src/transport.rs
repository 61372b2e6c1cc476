//! Transport provider interface.
//!
//! A provider owns the wire protocol (socket I/O, TLS, framing, HTTP upgrade).
//! This crate only drives it through [`Transport`] and receives its events
//! through an [`EventSink`].

use std::path::Path;

use crate::error::{Error, Result};
use crate::message::{CloseFrame, Extension};

pub use crate::connection::EventSink;

/// Identifier of one provider connection.
///
/// Always positive; providers with integer handles build it with
/// [`TransportId::from_raw`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TransportId(i32);

impl TransportId {
    /// Validate a raw provider handle.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InitFailure`] if `raw` is zero or negative.
    pub fn from_raw(raw: i32) -> Result<Self> {
        if raw > 0 {
            Ok(Self(raw))
        } else {
            Err(Error::InitFailure { code: raw })
        }
    }

    /// The raw provider handle.
    #[must_use]
    pub const fn as_raw(&self) -> i32 {
        self.0
    }
}

impl std::fmt::Display for TransportId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Parameters for opening a provider connection.
#[derive(Debug, Clone, Copy)]
pub struct ConnectRequest<'a> {
    /// Target URL.
    pub url: &'a str,
    /// Comma-joined sub-protocol advertisement. `None` omits the header.
    pub protocols: Option<&'a str>,
    /// CA bundle for providers that validate certificates themselves.
    pub ca_file: Option<&'a Path>,
}

/// An event emitted by the provider for one connection.
#[derive(Clone, Copy)]
pub enum TransportEvent<'a> {
    /// Handshake completed; carries the server-selected sub-protocol.
    Open {
        /// Selected protocol, if the server chose one.
        protocol: Option<&'a str>,
    },
    /// A data frame arrived. The buffer is only valid during dispatch.
    Message {
        /// Payload bytes.
        data: &'a [u8],
        /// Bytes delivered so far; equals `data.len()` unless the provider
        /// hands over a partial frame.
        issued: usize,
        /// `true` for text frames.
        is_text: bool,
        /// Provider metadata.
        extension: Option<&'a Extension>,
    },
    /// Transport failure. The provider does not say why.
    Error,
    /// Connection closed.
    Close {
        /// Status code, if the peer sent one.
        code: Option<u16>,
        /// Close reason.
        reason: &'a str,
    },
}

impl TransportEvent<'_> {
    /// Short event name for logging.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            TransportEvent::Open { .. } => "open",
            TransportEvent::Message { .. } => "message",
            TransportEvent::Error => "error",
            TransportEvent::Close { .. } => "close",
        }
    }
}

impl std::fmt::Debug for TransportEvent<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransportEvent::Open { protocol } => {
                f.debug_struct("Open").field("protocol", protocol).finish()
            }
            TransportEvent::Message {
                data,
                issued,
                is_text,
                ..
            } => f
                .debug_struct("Message")
                .field("len", &data.len())
                .field("issued", issued)
                .field("is_text", is_text)
                .finish(),
            TransportEvent::Error => write!(f, "Error"),
            TransportEvent::Close { code, reason } => f
                .debug_struct("Close")
                .field("code", code)
                .field("reason", reason)
                .finish(),
        }
    }
}

/// A host-supplied WebSocket transport.
///
/// Providers deliver events for a given connection one at a time, never
/// overlapping. Events may arrive on any thread.
///
/// Every method may be called re-entrantly from inside [`EventSink::dispatch`]:
/// delegates send and close from their callbacks, and if the application
/// drops its last [`WebSocket`](crate::WebSocket) while a callback runs, the
/// connection's `close` and `release` run on the delivering thread before
/// `dispatch` returns. Providers must not hold locks of their own across a
/// `dispatch` call.
pub trait Transport: Send + Sync {
    /// Open a connection.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InitFailure`] if the provider cannot create a handle.
    fn create(&self, request: &ConnectRequest<'_>) -> Result<TransportId>;

    /// Route all future events for `id` to `sink`.
    fn register(&self, id: TransportId, sink: EventSink);

    /// Send a UTF-8 text frame.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Transport`] if the provider refuses the frame.
    fn send_text(&self, id: TransportId, text: &str) -> Result<()>;

    /// Send a binary frame.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Transport`] if the provider refuses the frame.
    fn send_binary(&self, id: TransportId, data: &[u8]) -> Result<()>;

    /// Start the closing handshake.
    fn close(&self, id: TransportId, frame: Option<&CloseFrame>);

    /// Free the handle. No events for `id` are delivered afterwards.
    fn release(&self, id: TransportId);

    /// Current numeric ready-state (0 connecting, 1 open, 2 closing, 3 closed).
    fn ready_state(&self, id: TransportId) -> u16;
}
