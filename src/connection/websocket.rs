use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex, MutexGuard};

use crate::config::Config;
use crate::connection::dispatcher::{self, EventSink};
use crate::connection::handle::TransportHandle;
use crate::connection::state::StateMachine;
use crate::connection::ConnectionState;
use crate::delegate::Delegate;
use crate::error::{Error, Result};
use crate::message::{CloseFrame, Message};
use crate::protocol::ProtocolNegotiator;
use crate::transport::{ConnectRequest, Transport, TransportId};

/// A client WebSocket connection driven by a [`Transport`] provider.
///
/// `WebSocket` is a cheap handle: clones refer to the same connection. When
/// the last clone is dropped the connection is closed and its transport
/// handle released.
///
/// Delegates receive a `&WebSocket` in every callback and should not store a
/// clone of it, or the connection will never be dropped.
///
/// ## Example
///
/// ```rust,ignore
/// use wsclient::{Config, WebSocket};
///
/// let ws = WebSocket::new(transport);
/// ws.init(delegate, "wss://example/chat", Config::new().with_protocols(["chat"]))?;
///
/// // ... after Delegate::on_open fired:
/// ws.send_text("hello")?;
/// ws.close();
/// ```
#[derive(Clone)]
pub struct WebSocket {
    pub(crate) shared: Arc<Shared>,
}

pub(crate) struct Shared {
    transport: Arc<dyn Transport>,
    pub(crate) core: Mutex<Core>,
    /// Signalled once `on_close` has been delivered or the handle released.
    pub(crate) teardown: Condvar,
    #[cfg(feature = "async-tokio")]
    state_tx: tokio::sync::watch::Sender<ConnectionState>,
}

pub(crate) struct Core {
    pub(crate) url: String,
    pub(crate) config: Config,
    pub(crate) negotiator: ProtocolNegotiator,
    /// `None` until a successful `init`.
    pub(crate) machine: Option<StateMachine>,
    pub(crate) handle: Option<TransportHandle>,
    pub(crate) delegate: Option<Arc<dyn Delegate>>,
    pub(crate) close_frame: Option<CloseFrame>,
    pub(crate) close_delivered: bool,
}

impl Core {
    pub(crate) fn state(&self) -> ConnectionState {
        self.machine
            .as_ref()
            .map_or(ConnectionState::Closed, StateMachine::state)
    }

    pub(crate) fn owns(&self, id: TransportId) -> bool {
        self.handle.as_ref().is_some_and(|h| h.id() == id)
    }
}

impl Shared {
    /// Mirror the state into the watch channel. Call with the `Core` lock
    /// held so concurrent publishes land in transition order.
    pub(crate) fn publish(&self, state: ConnectionState) {
        #[cfg(feature = "async-tokio")]
        let _ = self.state_tx.send_replace(state);
        #[cfg(not(feature = "async-tokio"))]
        let _ = state;
    }
}

impl Drop for Shared {
    fn drop(&mut self) {
        let core = self.core.get_mut();
        if let Some(handle) = core.handle.take() {
            if core.state().is_active() {
                log::debug!("connection to {} dropped while active", core.url);
                handle.request_close(core.config.close_frame.as_ref());
            }
        }
    }
}

impl WebSocket {
    /// Create an uninitialized connection over `transport`.
    ///
    /// The connection reports [`ConnectionState::Closed`] until [`init`](Self::init) succeeds.
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        #[cfg(feature = "async-tokio")]
        let (state_tx, _) = tokio::sync::watch::channel(ConnectionState::Closed);

        Self {
            shared: Arc::new(Shared {
                transport,
                core: Mutex::new(Core {
                    url: String::new(),
                    config: Config::default(),
                    negotiator: ProtocolNegotiator::default(),
                    machine: None,
                    handle: None,
                    delegate: None,
                    close_frame: None,
                    close_delivered: false,
                }),
                teardown: Condvar::new(),
                #[cfg(feature = "async-tokio")]
                state_tx,
            }),
        }
    }

    /// Create a connection and [`init`](Self::init) it in one step.
    ///
    /// # Errors
    ///
    /// See [`init`](Self::init).
    pub fn connect(
        transport: Arc<dyn Transport>,
        delegate: Arc<dyn Delegate>,
        url: impl Into<String>,
        config: Config,
    ) -> Result<Self> {
        let ws = Self::new(transport);
        ws.init(delegate, url, config)?;
        Ok(ws)
    }

    /// Open the connection.
    ///
    /// Stores the delegate and URL, builds the sub-protocol advertisement,
    /// asks the provider for a handle and registers the event sink. On
    /// success the state is [`ConnectionState::Connecting`].
    ///
    /// ## Errors
    ///
    /// - `Error::AlreadyInitialized` if the connection already holds a handle
    ///   or was opened before
    /// - `Error::InvalidProtocol` / `Error::InvalidCloseCode` for a bad config
    /// - `Error::InitFailure` if the provider rejects the handle; the
    ///   connection stays unusable
    pub fn init(
        &self,
        delegate: Arc<dyn Delegate>,
        url: impl Into<String>,
        config: Config,
    ) -> Result<()> {
        config.validate()?;
        let url = url.into();
        let negotiator = config.negotiator();
        let advertisement = negotiator.advertisement();

        {
            let mut core = self.lock();
            if core.handle.is_some() || core.machine.is_some() {
                return Err(Error::AlreadyInitialized);
            }
            core.delegate = Some(delegate);
            core.url = url.clone();
            core.negotiator = negotiator;
            core.config = config.clone();
        }

        let request = ConnectRequest {
            url: &url,
            protocols: advertisement.as_deref(),
            ca_file: config.ca_file(),
        };
        let id = match self.shared.transport.create(&request) {
            Ok(id) => id,
            Err(err) => {
                log::warn!("failed to create transport for {url}: {err}");
                return Err(err);
            }
        };
        let handle = TransportHandle::new(Arc::clone(&self.shared.transport), id);

        {
            let mut core = self.lock();
            if core.handle.is_some() || core.machine.is_some() {
                drop(core);
                drop(handle);
                return Err(Error::AlreadyInitialized);
            }
            core.handle = Some(handle);
            core.machine = Some(StateMachine::new());
            self.shared.publish(core.state());
        }

        log::debug!(
            "connecting to {url} as {id} (protocols: {})",
            advertisement.as_deref().unwrap_or("<none>")
        );
        self.shared
            .transport
            .register(id, EventSink::new(Arc::downgrade(&self.shared), id));
        Ok(())
    }

    /// Send a UTF-8 text frame.
    ///
    /// ## Errors
    ///
    /// - `Error::ConnectionClosed` if the handle is absent
    /// - `Error::InvalidState` if the connection is not open
    /// - `Error::Transport` if the provider refuses the frame
    pub fn send_text(&self, text: &str) -> Result<()> {
        let (transport, id) = self.sendable()?;
        log::trace!("sending {} byte text frame on {id}", text.len());
        transport.send_text(id, text)
    }

    /// Send a binary frame.
    ///
    /// Guarded exactly like [`send_text`](Self::send_text).
    ///
    /// ## Errors
    ///
    /// - `Error::ConnectionClosed` if the handle is absent
    /// - `Error::InvalidState` if the connection is not open
    /// - `Error::Transport` if the provider refuses the frame
    pub fn send_binary(&self, data: &[u8]) -> Result<()> {
        let (transport, id) = self.sendable()?;
        log::trace!("sending {} byte binary frame on {id}", data.len());
        transport.send_binary(id, data)
    }

    /// Send an owned message.
    ///
    /// # Errors
    ///
    /// See [`send_text`](Self::send_text).
    pub fn send(&self, message: &Message) -> Result<()> {
        match message {
            Message::Text(text) => self.send_text(text),
            Message::Binary(data) => self.send_binary(data),
        }
    }

    /// Close and wait for teardown.
    ///
    /// Asks the provider to close, blocks until its close event has been
    /// delivered to [`Delegate::on_close`] (or `close_timeout` elapses), then
    /// releases the handle.
    ///
    /// Called from inside any delegate callback, for this connection or
    /// another one delivered on the same thread, this cannot wait for the
    /// provider without deadlocking its event loop, so it behaves like
    /// [`close_async`](Self::close_async) instead.
    pub fn close(&self) {
        if dispatcher::in_callback() {
            log::warn!("close() called from a delegate callback; closing asynchronously");
            self.close_async();
            return;
        }

        let Some(request) = self.begin_close() else {
            return;
        };
        request.send();

        let id = request.id;
        let deadline = Instant::now() + request.timeout;
        let handle = {
            let mut core = self.lock();
            while !core.close_delivered && core.owns(id) {
                if self.shared.teardown.wait_until(&mut core, deadline).timed_out() {
                    log::warn!(
                        "timed out after {:?} waiting for {id} to close",
                        request.timeout
                    );
                    break;
                }
            }
            if let Some(machine) = core.machine.as_mut() {
                machine.finish_close();
            }
            self.shared.publish(core.state());
            if core.owns(id) {
                core.handle.take()
            } else {
                None
            }
        };
        drop(handle);
        self.shared.teardown.notify_all();
    }

    /// Close without waiting.
    ///
    /// Requests the provider close, releases the handle and forces the state
    /// to [`ConnectionState::Closed`]. No new delegate callback starts after
    /// this returns, though one already running on another thread completes;
    /// `on_close` is not delivered. Safe in any state and idempotent.
    pub fn close_async(&self) {
        let (handle, frame) = {
            let mut core = self.lock();
            let Some(handle) = core.handle.take() else {
                return;
            };
            // Skip the provider close if its close event already arrived.
            let active = core
                .machine
                .as_mut()
                .is_some_and(StateMachine::finish_close);
            let frame = if active {
                Some(core.config.close_frame.clone())
            } else {
                None
            };
            self.shared.publish(core.state());
            (handle, frame)
        };

        log::debug!("closing {} asynchronously", handle.id());
        if let Some(frame) = frame {
            handle.request_close(frame.as_ref());
        }
        drop(handle);
        self.shared.teardown.notify_all();
    }

    /// Resolve once the connection reaches [`ConnectionState::Closed`].
    ///
    /// Resolves immediately for a connection that was never opened.
    #[cfg(feature = "async-tokio")]
    pub async fn closed(&self) {
        let mut rx = self.shared.state_tx.subscribe();
        let _ = rx.wait_for(|state| *state == ConnectionState::Closed).await;
    }

    /// Non-blocking counterpart of [`close`](Self::close) for event-loop callers.
    ///
    /// Requests the close, awaits the provider's close event, then releases
    /// the handle. Wrap in a timeout if the provider may never report it.
    #[cfg(feature = "async-tokio")]
    pub async fn close_and_wait(&self) {
        let mut rx = self.shared.state_tx.subscribe();
        if let Some(request) = self.begin_close() {
            request.send();
            let _ = rx.wait_for(|state| *state == ConnectionState::Closed).await;
        }
        self.close_async();
    }

    /// Ready-state reported by the provider.
    ///
    /// Returns [`ConnectionState::Closed`] without querying the provider once
    /// the handle has been released.
    pub fn ready_state(&self) -> ConnectionState {
        self.lock()
            .handle
            .as_ref()
            .map_or(ConnectionState::Closed, TransportHandle::ready_state)
    }

    /// Locally tracked connection state.
    pub fn state(&self) -> ConnectionState {
        self.lock().state()
    }

    /// Check if the connection is open.
    pub fn is_open(&self) -> bool {
        self.state() == ConnectionState::Open
    }

    /// URL passed to [`init`](Self::init).
    pub fn url(&self) -> String {
        self.lock().url.clone()
    }

    /// Sub-protocol selected by the server, or `""` if none was negotiated.
    pub fn protocol(&self) -> String {
        self.lock().negotiator.selected().to_owned()
    }

    /// Sub-protocols offered at handshake time, in order.
    pub fn requested_protocols(&self) -> Vec<String> {
        self.lock().negotiator.requested().to_vec()
    }

    /// Close status reported by the provider's close event.
    pub fn close_frame(&self) -> Option<CloseFrame> {
        self.lock().close_frame.clone()
    }

    fn lock(&self) -> MutexGuard<'_, Core> {
        self.shared.core.lock()
    }

    fn sendable(&self) -> Result<(Arc<dyn Transport>, TransportId)> {
        let core = self.lock();
        let handle = core.handle.as_ref().ok_or(Error::ConnectionClosed)?;
        let state = core.state();
        if !state.can_send() {
            return Err(Error::InvalidState(state));
        }
        Ok((Arc::clone(handle.transport()), handle.id()))
    }

    /// Move to `Closing` and snapshot what is needed to call the provider
    /// outside the lock. `None` if there is nothing to close.
    fn begin_close(&self) -> Option<CloseRequest> {
        let (request, state) = {
            let mut core = self.lock();
            let core = &mut *core;
            let handle = core.handle.as_ref()?;
            let active = core.state().is_active();
            if let Some(machine) = core.machine.as_mut() {
                machine.begin_close();
            }
            let request = CloseRequest {
                active,
                transport: Arc::clone(handle.transport()),
                id: handle.id(),
                frame: core.config.close_frame.clone(),
                timeout: core.config.close_timeout,
            };
            let state = core.state();
            self.shared.publish(state);
            (request, state)
        };
        log::debug!("closing {} (state {state})", request.id);
        Some(request)
    }
}

/// A provider close call prepared under the lock and issued outside it.
struct CloseRequest {
    /// `false` once the provider already reported the close.
    active: bool,
    transport: Arc<dyn Transport>,
    id: TransportId,
    frame: Option<CloseFrame>,
    timeout: Duration,
}

impl CloseRequest {
    fn send(&self) {
        if self.active {
            self.transport.close(self.id, self.frame.as_ref());
        }
    }
}

impl std::fmt::Debug for WebSocket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let core = self.lock();
        f.debug_struct("WebSocket")
            .field("url", &core.url)
            .field("state", &core.state())
            .field("protocol", &core.negotiator.selected())
            .field("handle", &core.handle)
            .finish()
    }
}
