//! Configuration for WebSocket client connections.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Error, Result};
use crate::message::CloseFrame;
use crate::protocol::ProtocolNegotiator;

/// Default bound on how long [`WebSocket::close`](crate::WebSocket::close) waits for teardown.
pub const DEFAULT_CLOSE_TIMEOUT: Duration = Duration::from_secs(5);

/// WebSocket client connection configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Candidate sub-protocols, in advertisement order.
    ///
    /// Default: empty (no `Sec-WebSocket-Protocol` header)
    pub protocols: Vec<String>,

    /// CA bundle for transports that manage certificate trust themselves.
    ///
    /// Providers that own TLS (such as a browser) ignore it.
    /// Default: None
    pub ca_file_path: Option<PathBuf>,

    /// Status code and reason passed to the provider when closing.
    ///
    /// `None` closes without a status code.
    /// Default: None
    pub close_frame: Option<CloseFrame>,

    /// Maximum time the synchronous close waits for the provider's close event.
    ///
    /// Default: 5 seconds
    pub close_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            protocols: Vec::new(),
            ca_file_path: None,
            close_frame: None,
            close_timeout: DEFAULT_CLOSE_TIMEOUT,
        }
    }
}

impl Config {
    /// Create a new configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the candidate sub-protocols.
    #[must_use]
    pub fn with_protocols<I, S>(mut self, protocols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.protocols = protocols.into_iter().map(Into::into).collect();
        self
    }

    /// Set the CA bundle path.
    #[must_use]
    pub fn with_ca_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.ca_file_path = Some(path.into());
        self
    }

    /// Set the close status sent to the provider.
    #[must_use]
    pub fn with_close_frame(mut self, frame: CloseFrame) -> Self {
        self.close_frame = Some(frame);
        self
    }

    /// Set the synchronous close timeout.
    #[must_use]
    pub const fn with_close_timeout(mut self, timeout: Duration) -> Self {
        self.close_timeout = timeout;
        self
    }

    /// CA bundle path, if configured.
    #[must_use]
    pub fn ca_file(&self) -> Option<&Path> {
        self.ca_file_path.as_deref()
    }

    /// Build the negotiator for the configured protocols.
    #[must_use]
    pub fn negotiator(&self) -> ProtocolNegotiator {
        ProtocolNegotiator::new(self.protocols.iter().cloned())
    }

    /// Validate sub-protocol names and the close code.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidProtocol`] if a protocol name cannot be advertised
    /// - [`Error::InvalidCloseCode`] if the close code is reserved
    pub fn validate(&self) -> Result<()> {
        self.negotiator().validate()?;
        if let Some(frame) = &self.close_frame {
            if frame.code.is_reserved() {
                return Err(Error::InvalidCloseCode(frame.code.as_u16()));
            }
        }
        Ok(())
    }
}
