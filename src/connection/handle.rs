//! Exclusively owned provider handle.

use std::sync::Arc;

use crate::connection::ConnectionState;
use crate::message::CloseFrame;
use crate::transport::{Transport, TransportId};

/// One provider connection, released when dropped.
///
/// Not `Clone`: exactly one [`WebSocket`](crate::WebSocket) owns it.
pub(crate) struct TransportHandle {
    transport: Arc<dyn Transport>,
    id: TransportId,
}

impl TransportHandle {
    pub(crate) fn new(transport: Arc<dyn Transport>, id: TransportId) -> Self {
        Self { transport, id }
    }

    pub(crate) fn id(&self) -> TransportId {
        self.id
    }

    pub(crate) fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }

    /// Ask the provider to start closing. The handle stays valid.
    pub(crate) fn request_close(&self, frame: Option<&CloseFrame>) {
        self.transport.close(self.id, frame);
    }

    pub(crate) fn ready_state(&self) -> ConnectionState {
        ConnectionState::from_ready_state(self.transport.ready_state(self.id))
    }
}

impl Drop for TransportHandle {
    fn drop(&mut self) {
        log::debug!("releasing transport handle {}", self.id);
        self.transport.release(self.id);
    }
}

impl std::fmt::Debug for TransportHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransportHandle").field("id", &self.id).finish()
    }
}
