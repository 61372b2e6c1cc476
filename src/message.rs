//! Message payloads delivered to and sent from a [`WebSocket`](crate::WebSocket).
//!
//! Inbound payloads arrive as [`MessageData`], a view borrowed from the
//! transport provider's buffer. It is only valid for the duration of
//! [`Delegate::on_message`](crate::Delegate::on_message); call
//! [`MessageData::to_message`] to keep the content afterwards.

use std::any::Any;
use std::fmt;

use bytes::Bytes;

use crate::error::Result;

/// Provider-specific metadata attached to an inbound message.
pub type Extension = dyn Any + Send + Sync;

/// WebSocket close status code per RFC 6455 Section 7.4.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[non_exhaustive]
pub enum CloseCode {
    /// Normal closure (1000).
    #[default]
    Normal,
    /// Going away (1001).
    GoingAway,
    /// Protocol error (1002).
    ProtocolError,
    /// Unsupported data (1003).
    UnsupportedData,
    /// No status received (1005). Reported by providers, never sent.
    NoStatus,
    /// Abnormal closure (1006). Reported by providers, never sent.
    Abnormal,
    /// Invalid payload (1007).
    InvalidPayload,
    /// Policy violation (1008).
    PolicyViolation,
    /// Message too big (1009).
    MessageTooBig,
    /// Internal error (1011).
    InternalError,
    /// Any other code (registered or application range).
    Other(u16),
}

impl CloseCode {
    /// Create a `CloseCode` from its numeric value.
    #[must_use]
    pub const fn from_u16(code: u16) -> Self {
        match code {
            1000 => CloseCode::Normal,
            1001 => CloseCode::GoingAway,
            1002 => CloseCode::ProtocolError,
            1003 => CloseCode::UnsupportedData,
            1005 => CloseCode::NoStatus,
            1006 => CloseCode::Abnormal,
            1007 => CloseCode::InvalidPayload,
            1008 => CloseCode::PolicyViolation,
            1009 => CloseCode::MessageTooBig,
            1011 => CloseCode::InternalError,
            other => CloseCode::Other(other),
        }
    }

    /// Get the numeric value of this close code.
    #[must_use]
    pub const fn as_u16(&self) -> u16 {
        match self {
            CloseCode::Normal => 1000,
            CloseCode::GoingAway => 1001,
            CloseCode::ProtocolError => 1002,
            CloseCode::UnsupportedData => 1003,
            CloseCode::NoStatus => 1005,
            CloseCode::Abnormal => 1006,
            CloseCode::InvalidPayload => 1007,
            CloseCode::PolicyViolation => 1008,
            CloseCode::MessageTooBig => 1009,
            CloseCode::InternalError => 1011,
            CloseCode::Other(code) => *code,
        }
    }

    /// Check if this close code is reserved and MUST NOT be sent in a Close frame.
    ///
    /// Reserved codes per RFC 6455 Section 7.4.1: 1004, 1005, 1006, 1015.
    #[must_use]
    pub const fn is_reserved(&self) -> bool {
        matches!(self.as_u16(), 1004..=1006 | 1015)
    }
}

/// Close status code and reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloseFrame {
    /// The close status code.
    pub code: CloseCode,
    /// Human-readable reason for closing.
    pub reason: String,
}

impl CloseFrame {
    /// Create a new close frame with the given code and reason.
    #[must_use]
    pub fn new(code: CloseCode, reason: impl Into<String>) -> Self {
        Self {
            code,
            reason: reason.into(),
        }
    }
}

/// One inbound payload, borrowed from the transport provider.
///
/// The lifetime ties the view to the callback that received it, so it
/// cannot be stored; copy it with [`to_message`](Self::to_message) instead.
#[derive(Clone, Copy)]
pub struct MessageData<'a> {
    bytes: &'a [u8],
    issued: usize,
    is_binary: bool,
    extension: Option<&'a Extension>,
}

impl<'a> MessageData<'a> {
    /// Create a view over a fully delivered payload.
    #[must_use]
    pub fn new(bytes: &'a [u8], is_binary: bool) -> Self {
        Self {
            bytes,
            issued: bytes.len(),
            is_binary,
            extension: None,
        }
    }

    /// Attach provider-specific metadata.
    #[must_use]
    pub fn with_extension(mut self, extension: Option<&'a Extension>) -> Self {
        self.extension = extension;
        self
    }

    /// Record how many bytes have been consumed so far, clamped to the length.
    #[must_use]
    pub fn with_issued(mut self, issued: usize) -> Self {
        self.issued = issued.min(self.bytes.len());
        self
    }

    /// Raw payload bytes.
    #[must_use]
    pub fn bytes(&self) -> &'a [u8] {
        self.bytes
    }

    /// Payload length in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns `true` if the payload is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Bytes already consumed. Never exceeds [`len`](Self::len).
    #[must_use]
    pub fn issued(&self) -> usize {
        self.issued
    }

    /// Returns `true` for binary frames.
    #[must_use]
    pub fn is_binary(&self) -> bool {
        self.is_binary
    }

    /// Returns `true` for UTF-8 text frames.
    #[must_use]
    pub fn is_text(&self) -> bool {
        !self.is_binary
    }

    /// Provider-specific metadata, if any.
    #[must_use]
    pub fn extension(&self) -> Option<&'a Extension> {
        self.extension
    }

    /// Borrow the payload as UTF-8.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidUtf8`](crate::Error::InvalidUtf8) if the bytes are not valid UTF-8.
    pub fn as_text(&self) -> Result<&'a str> {
        Ok(std::str::from_utf8(self.bytes)?)
    }

    /// Copy the payload into an owned [`Message`].
    ///
    /// Text frames that are not valid UTF-8 are kept as binary.
    #[must_use]
    pub fn to_message(&self) -> Message {
        if self.is_text() {
            if let Ok(text) = self.as_text() {
                return Message::Text(text.to_owned());
            }
        }
        Message::Binary(Bytes::copy_from_slice(self.bytes))
    }
}

impl fmt::Debug for MessageData<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MessageData")
            .field("len", &self.bytes.len())
            .field("issued", &self.issued)
            .field("is_binary", &self.is_binary)
            .field("extension", &self.extension.is_some())
            .finish()
    }
}

/// An owned data message.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Message {
    /// A text message (UTF-8 encoded).
    Text(String),
    /// A binary message (arbitrary bytes).
    Binary(Bytes),
}

impl Message {
    /// Create a text message.
    #[must_use]
    pub fn text(s: impl Into<String>) -> Self {
        Message::Text(s.into())
    }

    /// Create a binary message.
    #[must_use]
    pub fn binary(data: impl Into<Bytes>) -> Self {
        Message::Binary(data.into())
    }

    /// Returns `true` if this is a text message.
    #[must_use]
    pub const fn is_text(&self) -> bool {
        matches!(self, Message::Text(_))
    }

    /// Returns `true` if this is a binary message.
    #[must_use]
    pub const fn is_binary(&self) -> bool {
        matches!(self, Message::Binary(_))
    }

    /// Get the payload as bytes.
    #[must_use]
    pub fn payload(&self) -> &[u8] {
        match self {
            Message::Text(s) => s.as_bytes(),
            Message::Binary(b) => b,
        }
    }

    /// Consume and return the text content, if this is a text message.
    #[must_use]
    pub fn into_text(self) -> Option<String> {
        match self {
            Message::Text(s) => Some(s),
            Message::Binary(_) => None,
        }
    }
}
