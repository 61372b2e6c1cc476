//! Sub-protocol negotiation.
//!
//! The client advertises an ordered list of candidate sub-protocols in the
//! `Sec-WebSocket-Protocol` handshake header and the server selects at most one.

use crate::error::{Error, Result};

/// Handshake header carrying the sub-protocol advertisement.
pub const SEC_WEBSOCKET_PROTOCOL: &str = "Sec-WebSocket-Protocol";

/// Separator between advertised sub-protocols.
const SEPARATOR: char = ',';

/// Builds the sub-protocol advertisement and remembers the server's choice.
///
/// Order and duplicates are preserved exactly as supplied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProtocolNegotiator {
    requested: Vec<String>,
    selected: Option<String>,
}

impl ProtocolNegotiator {
    /// Create a negotiator for the given candidates.
    pub fn new<I, S>(protocols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            requested: protocols.into_iter().map(Into::into).collect(),
            selected: None,
        }
    }

    /// Candidate sub-protocols in advertisement order.
    #[must_use]
    pub fn requested(&self) -> &[String] {
        &self.requested
    }

    /// Comma-joined advertisement, or `None` when no candidates were given.
    ///
    /// `None` means the handshake omits the header entirely, which is not the
    /// same as advertising an empty string.
    #[must_use]
    pub fn advertisement(&self) -> Option<String> {
        if self.requested.is_empty() {
            return None;
        }
        Some(self.requested.join(","))
    }

    /// Check that every candidate can be carried in the header.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidProtocol`] for an empty name or one containing
    /// the separator or whitespace.
    pub fn validate(&self) -> Result<()> {
        for protocol in &self.requested {
            let invalid = protocol.is_empty()
                || protocol
                    .chars()
                    .any(|c| c == SEPARATOR || c.is_whitespace() || c.is_control());
            if invalid {
                return Err(Error::InvalidProtocol(protocol.clone()));
            }
        }
        Ok(())
    }

    /// Record the protocol chosen by the server. Only the first call has effect.
    ///
    /// Returns `true` if the selection was recorded.
    pub fn select(&mut self, protocol: Option<&str>) -> bool {
        if self.selected.is_some() {
            return false;
        }
        match protocol {
            Some(p) if !p.is_empty() => {
                self.selected = Some(p.to_owned());
                true
            }
            _ => false,
        }
    }

    /// The protocol chosen by the server, or `""` if none was negotiated.
    #[must_use]
    pub fn selected(&self) -> &str {
        self.selected.as_deref().unwrap_or("")
    }
}
