//! Connection lifecycle and event dispatch.
//!
//! This module provides [`WebSocket`], the client connection object, built
//! from an exclusively owned transport handle, a state machine, and an
//! [`EventSink`] that turns provider events into delegate calls.
//!
//! ## Connection Lifecycle
//!
//! 1. **Connecting** - Initial state after a successful `init`
//! 2. **Open** - The provider reported the handshake complete
//! 3. **Closing** - A local close is in progress (may be skipped)
//! 4. **Closed** - Terminal; the handle is released by `close`/`close_async`
//!
//! ## Example
//!
//! ```rust,ignore
//! use wsclient::{Config, WebSocket};
//!
//! let ws = WebSocket::connect(transport, delegate, "wss://example/chat", Config::new())?;
//! // Delegate::on_open fires on the provider's event loop
//! ws.send_text("Hello")?;
//! ws.close_async();
//! ```

mod dispatcher;
mod handle;
mod state;
mod websocket;

pub use dispatcher::EventSink;
pub use state::ConnectionState;
pub use websocket::WebSocket;
