use std::sync::Arc;
use std::sync::mpsc::{self, Sender};
use std::thread;

use parking_lot::Mutex;
use wsclient::{CloseFrame, ConnectRequest, EventSink, Result, Transport, TransportId};

use super::MockTransport;

type Job = Box<dyn FnOnce(&MockTransport) + Send>;

/// Provider with a single event-loop thread that delivers every event for
/// every connection, like a browser or an embedded runtime.
///
/// Calls are recorded by an inner [`MockTransport`]; `close` posts the close
/// event to the loop instead of emitting it inline.
pub struct EventLoopTransport {
    mock: Arc<MockTransport>,
    jobs: Mutex<Sender<Job>>,
}

impl EventLoopTransport {
    pub fn new() -> Arc<Self> {
        let mock = MockTransport::new();
        let (jobs, rx) = mpsc::channel::<Job>();
        let worker = Arc::clone(&mock);
        thread::spawn(move || {
            for job in rx {
                job(&*worker);
            }
        });
        Arc::new(Self {
            mock,
            jobs: Mutex::new(jobs),
        })
    }

    pub fn mock(&self) -> &MockTransport {
        &self.mock
    }

    /// Run `job` on the event-loop thread.
    pub fn post(&self, job: impl FnOnce(&MockTransport) + Send + 'static) {
        let _ = self.jobs.lock().send(Box::new(job));
    }

    /// Block until every job posted so far has run.
    pub fn flush(&self) {
        let (done, wait) = mpsc::channel();
        self.post(move |_| {
            let _ = done.send(());
        });
        let _ = wait.recv();
    }
}

impl Transport for EventLoopTransport {
    fn create(&self, request: &ConnectRequest<'_>) -> Result<TransportId> {
        self.mock.create(request)
    }

    fn register(&self, id: TransportId, sink: EventSink) {
        self.mock.register(id, sink);
    }

    fn send_text(&self, id: TransportId, text: &str) -> Result<()> {
        self.mock.send_text(id, text)
    }

    fn send_binary(&self, id: TransportId, data: &[u8]) -> Result<()> {
        self.mock.send_binary(id, data)
    }

    fn close(&self, id: TransportId, frame: Option<&CloseFrame>) {
        self.mock.close(id, frame);
        let code = frame.map(|f| f.code.as_u16());
        self.post(move |mock| mock.remote_close(id, code, ""));
    }

    fn release(&self, id: TransportId) {
        self.mock.release(id);
    }

    fn ready_state(&self, id: TransportId) -> u16 {
        self.mock.ready_state(id)
    }
}
