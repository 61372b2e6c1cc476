//! Connection state machine.

/// WebSocket connection state.
///
/// Represents the lifecycle states of a WebSocket connection. The numeric
/// values match the ready-state reported by transport providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[non_exhaustive]
pub enum ConnectionState {
    /// Connection is being established (handshake in progress).
    #[default]
    Connecting,
    /// Connection is open and ready for data transfer.
    Open,
    /// Close initiated locally or remotely.
    Closing,
    /// Connection is fully closed. Terminal.
    Closed,
}

impl ConnectionState {
    /// Map a provider ready-state value. Unknown values map to `Closed`.
    #[must_use]
    pub const fn from_ready_state(value: u16) -> Self {
        match value {
            0 => ConnectionState::Connecting,
            1 => ConnectionState::Open,
            2 => ConnectionState::Closing,
            _ => ConnectionState::Closed,
        }
    }

    /// Numeric ready-state value.
    #[must_use]
    pub const fn as_ready_state(&self) -> u16 {
        match self {
            ConnectionState::Connecting => 0,
            ConnectionState::Open => 1,
            ConnectionState::Closing => 2,
            ConnectionState::Closed => 3,
        }
    }

    /// Check if the connection is in an active state.
    ///
    /// Returns `true` for `Connecting`, `Open`, or `Closing` states.
    #[must_use]
    #[inline]
    pub const fn is_active(&self) -> bool {
        !matches!(self, ConnectionState::Closed)
    }

    /// Check if sending data is allowed in this state.
    ///
    /// Returns `true` only for `Open` state.
    #[must_use]
    #[inline]
    pub const fn can_send(&self) -> bool {
        matches!(self, ConnectionState::Open)
    }

    /// Check if receiving data is allowed in this state.
    ///
    /// Returns `true` for `Open` or `Closing` states.
    #[must_use]
    #[inline]
    pub const fn can_receive(&self) -> bool {
        matches!(self, ConnectionState::Open | ConnectionState::Closing)
    }
}

impl std::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConnectionState::Connecting => write!(f, "Connecting"),
            ConnectionState::Open => write!(f, "Open"),
            ConnectionState::Closing => write!(f, "Closing"),
            ConnectionState::Closed => write!(f, "Closed"),
        }
    }
}

/// Transition rules for one connection.
///
/// Each method applies an event and reports whether it was accepted.
/// Rejected events leave the machine untouched.
#[derive(Debug, Clone, Default)]
pub(crate) struct StateMachine {
    state: ConnectionState,
    opened: bool,
    /// An error arrived before the handshake completed.
    failed: bool,
}

impl StateMachine {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn state(&self) -> ConnectionState {
        self.state
    }

    /// Handshake completed. Only valid once, from `Connecting`, and not after an error.
    pub(crate) fn open(&mut self) -> bool {
        if self.state == ConnectionState::Connecting && !self.failed {
            self.state = ConnectionState::Open;
            self.opened = true;
            true
        } else {
            false
        }
    }

    /// Messages are delivered only after open and before close.
    pub(crate) fn accepts_message(&self) -> bool {
        self.opened && self.state.can_receive()
    }

    /// Transport failure. Does not change the state by itself; a failure
    /// while connecting blocks any later open.
    pub(crate) fn error(&mut self) -> bool {
        match self.state {
            ConnectionState::Closed => false,
            ConnectionState::Connecting => {
                self.failed = true;
                true
            }
            ConnectionState::Open | ConnectionState::Closing => true,
        }
    }

    /// Local close requested.
    pub(crate) fn begin_close(&mut self) -> bool {
        match self.state {
            ConnectionState::Connecting | ConnectionState::Open => {
                self.state = ConnectionState::Closing;
                true
            }
            ConnectionState::Closing | ConnectionState::Closed => false,
        }
    }

    /// Connection torn down. `Closing` may be skipped.
    pub(crate) fn finish_close(&mut self) -> bool {
        if self.state == ConnectionState::Closed {
            return false;
        }
        self.state = ConnectionState::Closed;
        true
    }
}
