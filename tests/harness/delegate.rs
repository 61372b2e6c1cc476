use std::sync::Arc;

use parking_lot::Mutex;
use wsclient::{Delegate, ErrorCode, Message, MessageData, WebSocket};

/// One recorded delegate call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Callback {
    Open,
    Message { message: Message, is_binary: bool, len: usize },
    Error(ErrorCode),
    Close,
}

type Hook = Box<dyn Fn(&WebSocket, &Callback) + Send + Sync>;

/// Delegate that records every callback in order.
#[derive(Default)]
pub struct RecordingDelegate {
    calls: Mutex<Vec<Callback>>,
    hook: Option<Hook>,
}

impl RecordingDelegate {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Run `hook` after recording each callback.
    pub fn with_hook(hook: impl Fn(&WebSocket, &Callback) + Send + Sync + 'static) -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            hook: Some(Box::new(hook)),
        })
    }

    pub fn calls(&self) -> Vec<Callback> {
        self.calls.lock().clone()
    }

    pub fn count(&self, pred: impl Fn(&Callback) -> bool) -> usize {
        self.calls.lock().iter().filter(|c| pred(c)).count()
    }

    fn record(&self, ws: &WebSocket, callback: Callback) {
        self.calls.lock().push(callback.clone());
        if let Some(hook) = &self.hook {
            hook(ws, &callback);
        }
    }
}

impl Delegate for RecordingDelegate {
    fn on_open(&self, ws: &WebSocket) {
        self.record(ws, Callback::Open);
    }

    fn on_message(&self, ws: &WebSocket, data: &MessageData<'_>) {
        let callback = Callback::Message {
            message: data.to_message(),
            is_binary: data.is_binary(),
            len: data.len(),
        };
        self.record(ws, callback);
    }

    fn on_close(&self, ws: &WebSocket) {
        self.record(ws, Callback::Close);
    }

    fn on_error(&self, ws: &WebSocket, error: ErrorCode) {
        self.record(ws, Callback::Error(error));
    }
}
