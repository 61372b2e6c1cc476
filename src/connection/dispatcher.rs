//! Translates provider events into [`Delegate`](crate::Delegate) calls.

use std::cell::Cell;
use std::sync::Weak;

use crate::connection::websocket::Shared;
use crate::connection::WebSocket;
use crate::delegate::ErrorCode;
use crate::message::{CloseCode, CloseFrame, MessageData};
use crate::transport::{TransportEvent, TransportId};

thread_local! {
    /// Delegate callbacks currently running on this thread, across all connections.
    static CALLBACK_DEPTH: Cell<usize> = const { Cell::new(0) };
}

/// Returns `true` while this thread is inside any delegate callback.
pub(crate) fn in_callback() -> bool {
    CALLBACK_DEPTH.with(|depth| depth.get() > 0)
}

/// Marks the current thread as running a callback until dropped.
struct CallbackGuard;

impl CallbackGuard {
    fn enter() -> Self {
        CALLBACK_DEPTH.with(|depth| depth.set(depth.get() + 1));
        CallbackGuard
    }
}

impl Drop for CallbackGuard {
    fn drop(&mut self) {
        CALLBACK_DEPTH.with(|depth| depth.set(depth.get().saturating_sub(1)));
    }
}

/// Event entry point handed to a provider by [`Transport::register`](crate::Transport::register).
///
/// Holds only a weak reference to its connection: events for a dropped or
/// closed connection are discarded.
#[derive(Clone)]
pub struct EventSink {
    shared: Weak<Shared>,
    id: TransportId,
}

impl EventSink {
    pub(crate) fn new(shared: Weak<Shared>, id: TransportId) -> Self {
        Self { shared, id }
    }

    /// The provider connection this sink belongs to.
    #[must_use]
    pub fn id(&self) -> TransportId {
        self.id
    }

    /// Returns `true` while the owning connection still holds this handle.
    #[must_use]
    pub fn is_live(&self) -> bool {
        self.shared
            .upgrade()
            .is_some_and(|shared| shared.core.lock().owns(self.id))
    }

    /// Deliver one event.
    ///
    /// Events the state machine rejects (a second open, a message before
    /// open, anything after close) are dropped without reaching the delegate.
    pub fn dispatch(&self, event: TransportEvent<'_>) {
        let Some(shared) = self.shared.upgrade() else {
            log::trace!("dropping {} event for dropped connection {}", event.name(), self.id);
            return;
        };
        let ws = WebSocket { shared };

        let delegate = {
            let mut core = ws.shared.core.lock();
            let core = &mut *core;
            if !core.owns(self.id) {
                log::trace!("dropping {} event for released handle {}", event.name(), self.id);
                return;
            }
            let Some(machine) = core.machine.as_mut() else {
                return;
            };

            let accepted = match event {
                TransportEvent::Open { protocol } => {
                    let opened = machine.open();
                    if opened {
                        core.negotiator.select(protocol);
                        ws.shared.publish(machine.state());
                    }
                    opened
                }
                TransportEvent::Message { .. } => machine.accepts_message(),
                TransportEvent::Error => machine.error(),
                TransportEvent::Close { code, reason } => {
                    let closed = machine.finish_close();
                    if closed {
                        core.close_frame =
                            code.map(|c| CloseFrame::new(CloseCode::from_u16(c), reason));
                    }
                    closed
                }
            };
            if !accepted {
                log::warn!(
                    "ignoring {} event on {} in state {}",
                    event.name(),
                    self.id,
                    machine.state()
                );
                return;
            }

            core.delegate.clone()
        };

        if let Some(delegate) = delegate {
            let _guard = CallbackGuard::enter();
            match event {
                TransportEvent::Open { .. } => {
                    log::debug!("{} open (protocol {:?})", self.id, ws.protocol());
                    delegate.on_open(&ws);
                }
                TransportEvent::Message {
                    data,
                    issued,
                    is_text,
                    extension,
                } => {
                    let data = MessageData::new(data, !is_text)
                        .with_issued(issued)
                        .with_extension(extension);
                    log::trace!("{} message: {data:?}", self.id);
                    delegate.on_message(&ws, &data);
                }
                TransportEvent::Error => {
                    log::debug!("{} transport error", self.id);
                    delegate.on_error(&ws, ErrorCode::ConnectionFailure);
                }
                TransportEvent::Close { code, .. } => {
                    log::debug!("{} closed (code {code:?})", self.id);
                    delegate.on_close(&ws);
                }
            }
        }

        if let TransportEvent::Close { .. } = event {
            {
                let mut core = ws.shared.core.lock();
                core.close_delivered = true;
                ws.shared.publish(core.state());
            }
            ws.shared.teardown.notify_all();
        }
    }

    /// Deliver an open event.
    pub fn open(&self, protocol: Option<&str>) {
        self.dispatch(TransportEvent::Open { protocol });
    }

    /// Deliver a fully received text or binary message.
    pub fn message(&self, data: &[u8], is_text: bool) {
        self.dispatch(TransportEvent::Message {
            data,
            issued: data.len(),
            is_text,
            extension: None,
        });
    }

    /// Deliver a transport error.
    pub fn error(&self) {
        self.dispatch(TransportEvent::Error);
    }

    /// Deliver a close event.
    pub fn close(&self, code: Option<u16>, reason: &str) {
        self.dispatch(TransportEvent::Close { code, reason });
    }
}

impl std::fmt::Debug for EventSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventSink")
            .field("id", &self.id)
            .field("live", &self.is_live())
            .finish()
    }
}
