#![allow(dead_code)]

//! Test harness for driving connections without a network.
//!
//! [`MockTransport`] records every call the connection makes and lets a test
//! emit provider events; [`RecordingDelegate`] records every callback.
//! [`EventLoopTransport`] delivers all events from one background thread.

mod delegate;
mod event_loop;
mod transport;

pub use delegate::{Callback, RecordingDelegate};
pub use event_loop::EventLoopTransport;
pub use transport::{MockTransport, Sent};
