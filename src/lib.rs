//! # wsclient - Client-side WebSocket lifecycle over a host transport
//!
//! `wsclient` presents a uniform WebSocket client to application code while
//! the actual socket I/O, TLS and framing are done by a transport provider
//! supplied by the host environment (a browser, an embedded runtime, a native
//! networking stack).
//!
//! ## Features
//!
//! - **State machine** tracking `Connecting`, `Open`, `Closing`, `Closed`
//! - **Delegate callbacks** for open, message, error and close events
//! - **Borrowed message views** that cannot outlive the provider's buffer
//! - **Sub-protocol negotiation** with ordered advertisement
//! - **Synchronous and asynchronous close**, plus an awaitable close with `async-tokio`
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use wsclient::{Config, Delegate, ErrorCode, MessageData, WebSocket};
//!
//! struct Printer;
//!
//! impl Delegate for Printer {
//!     fn on_open(&self, ws: &WebSocket) {
//!         let _ = ws.send_text("hello");
//!     }
//!     fn on_message(&self, _ws: &WebSocket, data: &MessageData<'_>) {
//!         println!("{:?}", data.as_text());
//!     }
//!     fn on_close(&self, _ws: &WebSocket) {}
//!     fn on_error(&self, _ws: &WebSocket, error: ErrorCode) {
//!         eprintln!("error: {error}");
//!     }
//! }
//!
//! let config = Config::new().with_protocols(["chat", "superchat"]);
//! let ws = WebSocket::connect(transport, Arc::new(Printer), "wss://example/chat", config)?;
//! ```

pub mod config;
pub mod connection;
pub mod delegate;
pub mod error;
pub mod message;
pub mod protocol;
pub mod transport;

pub use config::Config;
pub use connection::{ConnectionState, EventSink, WebSocket};
pub use delegate::{Delegate, ErrorCode};
pub use error::{Error, Result};
pub use message::{CloseCode, CloseFrame, Message, MessageData};
pub use protocol::{ProtocolNegotiator, SEC_WEBSOCKET_PROTOCOL};
pub use transport::{ConnectRequest, Transport, TransportEvent, TransportId};
