//! Connection identity and the client-side handle.

use crate::event::StreamEvent;
use crate::hub::HubInner;
use futures::Stream;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Weak;
use std::task::{Context, Poll};
use tokio::sync::mpsc;
use uuid::Uuid;

/// Counter for generating unique connection IDs.
static CONNECTION_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique identifier for one live connection.
///
/// IDs come from an atomic counter and are never reused within a process
/// lifetime, so a stale handle can never tear down its successor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    pub(crate) fn next() -> Self {
        Self(CONNECTION_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Receiving end of one subscription.
///
/// The handle is the only way events leave the hub for this connection.
/// Dropping it unsubscribes the connection, so a client disconnect cleans
/// up its registry entry without any extra bookkeeping. The hub side may
/// also remove the connection first (expiry, dead consumer, explicit
/// unsubscribe), in which case the stream simply ends.
pub struct ConnectionHandle {
    user: Uuid,
    id: ConnectionId,
    rx: mpsc::Receiver<StreamEvent>,
    hub: Weak<HubInner>,
}

impl ConnectionHandle {
    pub(crate) fn new(
        user: Uuid,
        id: ConnectionId,
        rx: mpsc::Receiver<StreamEvent>,
        hub: Weak<HubInner>,
    ) -> Self {
        Self { user, id, rx, hub }
    }

    pub fn user(&self) -> Uuid {
        self.user
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Next event, or `None` once the connection is closed.
    pub async fn recv(&mut self) -> Option<StreamEvent> {
        self.rx.recv().await
    }
}

impl Stream for ConnectionHandle {
    type Item = StreamEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<StreamEvent>> {
        self.rx.poll_recv(cx)
    }
}

impl Drop for ConnectionHandle {
    fn drop(&mut self) {
        if let Some(hub) = self.hub.upgrade() {
            hub.remove(self.user, self.id);
        }
    }
}

impl std::fmt::Debug for ConnectionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionHandle")
            .field("user", &self.user)
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique_and_increasing() {
        let a = ConnectionId::next();
        let b = ConnectionId::next();
        assert_ne!(a, b);
        assert!(a.as_u64() < b.as_u64());
    }

    #[test]
    fn display_prefix() {
        assert!(ConnectionId::next().to_string().starts_with("conn-"));
    }
}
