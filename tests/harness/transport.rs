use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use wsclient::{
    CloseFrame, ConnectRequest, ConnectionState, Error, EventSink, Result, Transport,
    TransportId,
};

/// An outbound frame or control call recorded by [`MockTransport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sent {
    Text(String),
    Binary(Vec<u8>),
    Close(Option<CloseFrame>),
}

#[derive(Default)]
struct Inner {
    next_id: i32,
    fail_with: Option<i32>,
    close_on_request: bool,
    requests: Vec<(String, Option<String>)>,
    sinks: HashMap<TransportId, EventSink>,
    ready: HashMap<TransportId, u16>,
    sent: Vec<(TransportId, Sent)>,
    released: Vec<TransportId>,
    ready_queries: usize,
}

/// In-memory provider. Events are emitted explicitly by the test.
pub struct MockTransport {
    inner: Mutex<Inner>,
}

impl MockTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            inner: Mutex::new(Inner::default()),
        })
    }

    /// A provider whose `create` reports `code`.
    pub fn failing(code: i32) -> Arc<Self> {
        let mock = Self::new();
        mock.inner.lock().fail_with = Some(code);
        mock
    }

    /// A provider that emits a close event from inside `close`.
    pub fn closing_immediately() -> Arc<Self> {
        let mock = Self::new();
        mock.inner.lock().close_on_request = true;
        mock
    }

    pub fn last_id(&self) -> TransportId {
        TransportId::from_raw(self.inner.lock().next_id).unwrap()
    }

    pub fn requests(&self) -> Vec<(String, Option<String>)> {
        self.inner.lock().requests.clone()
    }

    pub fn sent(&self) -> Vec<Sent> {
        self.inner.lock().sent.iter().map(|(_, s)| s.clone()).collect()
    }

    pub fn closes(&self) -> usize {
        self.sent()
            .iter()
            .filter(|s| matches!(s, Sent::Close(_)))
            .count()
    }

    pub fn released(&self) -> Vec<TransportId> {
        self.inner.lock().released.clone()
    }

    pub fn ready_queries(&self) -> usize {
        self.inner.lock().ready_queries
    }

    pub fn is_registered(&self, id: TransportId) -> bool {
        self.inner.lock().sinks.contains_key(&id)
    }

    /// The sink as registered, even after release.
    pub fn sink(&self, id: TransportId) -> Option<EventSink> {
        self.inner.lock().sinks.get(&id).cloned()
    }

    fn set_ready(&self, id: TransportId, state: ConnectionState) {
        self.inner.lock().ready.insert(id, state.as_ready_state());
    }

    pub fn open(&self, id: TransportId, protocol: Option<&str>) {
        self.set_ready(id, ConnectionState::Open);
        if let Some(sink) = self.sink(id) {
            sink.open(protocol);
        }
    }

    pub fn message(&self, id: TransportId, data: &[u8], is_text: bool) {
        if let Some(sink) = self.sink(id) {
            sink.message(data, is_text);
        }
    }

    pub fn error(&self, id: TransportId) {
        if let Some(sink) = self.sink(id) {
            sink.error();
        }
    }

    pub fn remote_close(&self, id: TransportId, code: Option<u16>, reason: &str) {
        self.set_ready(id, ConnectionState::Closed);
        if let Some(sink) = self.sink(id) {
            sink.close(code, reason);
        }
    }
}

impl Transport for MockTransport {
    fn create(&self, request: &ConnectRequest<'_>) -> Result<TransportId> {
        let mut inner = self.inner.lock();
        if let Some(code) = inner.fail_with {
            return Err(Error::InitFailure { code });
        }
        inner.next_id += 1;
        let id = TransportId::from_raw(inner.next_id)?;
        inner
            .requests
            .push((request.url.to_owned(), request.protocols.map(str::to_owned)));
        inner.ready.insert(id, ConnectionState::Connecting.as_ready_state());
        Ok(id)
    }

    fn register(&self, id: TransportId, sink: EventSink) {
        self.inner.lock().sinks.insert(id, sink);
    }

    fn send_text(&self, id: TransportId, text: &str) -> Result<()> {
        let mut inner = self.inner.lock();
        if inner.released.contains(&id) {
            return Err(Error::Transport(format!("unknown handle {id}")));
        }
        inner.sent.push((id, Sent::Text(text.to_owned())));
        Ok(())
    }

    fn send_binary(&self, id: TransportId, data: &[u8]) -> Result<()> {
        let mut inner = self.inner.lock();
        if inner.released.contains(&id) {
            return Err(Error::Transport(format!("unknown handle {id}")));
        }
        inner.sent.push((id, Sent::Binary(data.to_vec())));
        Ok(())
    }

    fn close(&self, id: TransportId, frame: Option<&CloseFrame>) {
        let close_now = {
            let mut inner = self.inner.lock();
            inner.sent.push((id, Sent::Close(frame.cloned())));
            inner.ready.insert(id, ConnectionState::Closing.as_ready_state());
            inner.close_on_request
        };
        if close_now {
            let code = frame.map(|f| f.code.as_u16());
            self.remote_close(id, code, "");
        }
    }

    fn release(&self, id: TransportId) {
        let mut inner = self.inner.lock();
        inner.released.push(id);
        inner.ready.remove(&id);
    }

    fn ready_state(&self, id: TransportId) -> u16 {
        let mut inner = self.inner.lock();
        inner.ready_queries += 1;
        inner
            .ready
            .get(&id)
            .copied()
            .unwrap_or(ConnectionState::Closed.as_ready_state())
    }
}
