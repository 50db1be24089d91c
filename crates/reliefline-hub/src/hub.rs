//! The notification hub: a registry of live per-user connections.

use crate::connection::{ConnectionHandle, ConnectionId};
use crate::event::StreamEvent;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// How a published event is routed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Every user with at least one live connection.
    Broadcast,
    /// Only the live connections of one user.
    User(Uuid),
}

/// Tuning knobs for the hub.
#[derive(Debug, Clone)]
pub struct HubConfig {
    /// Per-connection event buffer. A consumer that falls this far behind
    /// is considered stalled and its connection is torn down.
    pub channel_buffer: usize,
    /// Connections are force-closed this long after subscribing; clients
    /// are expected to reopen.
    pub connection_ttl: Duration,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            channel_buffer: 32,
            connection_ttl: Duration::from_secs(30 * 60),
        }
    }
}

struct ConnectionEntry {
    id: ConnectionId,
    tx: mpsc::Sender<StreamEvent>,
}

/// Routes transient events to the live connections of each user.
///
/// Cheap to clone; clones share the registry. Each user key owns an
/// independent connection list, so publishing to one user never contends
/// with subscribing or unsubscribing another.
#[derive(Clone)]
pub struct NotificationHub {
    inner: Arc<HubInner>,
}

pub(crate) struct HubInner {
    config: HubConfig,
    connections: DashMap<Uuid, Vec<ConnectionEntry>>,
}

impl NotificationHub {
    pub fn new(config: HubConfig) -> Self {
        Self {
            inner: Arc::new(HubInner {
                config,
                connections: DashMap::new(),
            }),
        }
    }

    /// Open a new connection for `user`.
    ///
    /// The `connected` acknowledgement is already queued on the returned
    /// handle. The connection lives until the handle is dropped, the hub
    /// removes it, or its TTL expires — whichever comes first.
    pub fn subscribe(&self, user: Uuid) -> ConnectionHandle {
        let id = ConnectionId::next();
        let (tx, rx) = mpsc::channel(self.inner.config.channel_buffer);

        // Fresh channel with a non-zero buffer; the ack cannot fail.
        let _ = tx.try_send(StreamEvent::connected());

        self.inner
            .connections
            .entry(user)
            .or_default()
            .push(ConnectionEntry { id, tx });
        info!(user = %user, connection = %id, "stream connection opened");

        // Expiry timer. Runs detached; holding only a weak ref so a hub
        // that is dropped early does not linger for the TTL.
        let weak = Arc::downgrade(&self.inner);
        let ttl = self.inner.config.connection_ttl;
        tokio::spawn(async move {
            tokio::time::sleep(ttl).await;
            if let Some(inner) = weak.upgrade() {
                if inner.remove(user, id) {
                    info!(user = %user, connection = %id, "stream connection expired");
                }
            }
        });

        ConnectionHandle::new(user, id, rx, Arc::downgrade(&self.inner))
    }

    /// Close one connection. Idempotent: closing an unknown or already
    /// removed connection is a no-op.
    pub fn unsubscribe(&self, user: Uuid, id: ConnectionId) {
        if self.inner.remove(user, id) {
            info!(user = %user, connection = %id, "stream connection closed");
        }
    }

    /// Deliver an event to every connection the route selects.
    ///
    /// Best-effort, at-most-once per connection: each delivery is attempted
    /// independently, and a connection that fails (dead or stalled) is torn
    /// down without affecting the rest. A targeted publish to a user with
    /// no connections is a no-op.
    pub fn publish(&self, route: Route, event: &StreamEvent) {
        match route {
            Route::Broadcast => {
                let users: Vec<Uuid> = self
                    .inner
                    .connections
                    .iter()
                    .map(|entry| *entry.key())
                    .collect();
                for user in users {
                    self.inner.send_to_user(user, event);
                }
            }
            Route::User(user) => self.inner.send_to_user(user, event),
        }
    }

    /// Number of distinct users with at least one live connection.
    pub fn active_user_count(&self) -> usize {
        self.inner.connections.len()
    }

    pub fn is_connected(&self, user: Uuid) -> bool {
        self.inner
            .connections
            .get(&user)
            .map(|conns| !conns.is_empty())
            .unwrap_or(false)
    }

    /// Live connections for one user.
    #[cfg(test)]
    fn connection_count(&self, user: Uuid) -> usize {
        self.inner
            .connections
            .get(&user)
            .map(|conns| conns.len())
            .unwrap_or(0)
    }
}

impl Default for NotificationHub {
    fn default() -> Self {
        Self::new(HubConfig::default())
    }
}

impl HubInner {
    /// Enqueue an event on every live connection of `user`.
    ///
    /// Senders are snapshotted first so no registry lock is held while
    /// touching the channels.
    fn send_to_user(&self, user: Uuid, event: &StreamEvent) {
        let targets: Vec<(ConnectionId, mpsc::Sender<StreamEvent>)> =
            match self.connections.get(&user) {
                Some(conns) => conns.iter().map(|c| (c.id, c.tx.clone())).collect(),
                None => return,
            };

        for (id, tx) in targets {
            match tx.try_send(event.clone()) {
                Ok(()) => {}
                Err(TrySendError::Full(_)) => {
                    warn!(user = %user, connection = %id, "stream consumer stalled, dropping connection");
                    self.remove(user, id);
                }
                Err(TrySendError::Closed(_)) => {
                    debug!(user = %user, connection = %id, "stream connection gone, removing");
                    self.remove(user, id);
                }
            }
        }
    }

    /// Remove one connection; prunes the user key once its last connection
    /// goes. Returns whether anything was removed.
    pub(crate) fn remove(&self, user: Uuid, id: ConnectionId) -> bool {
        let mut removed = false;
        let mut emptied = false;
        if let Some(mut conns) = self.connections.get_mut(&user) {
            let before = conns.len();
            conns.retain(|c| c.id != id);
            removed = conns.len() != before;
            emptied = conns.is_empty();
        }
        if emptied {
            self.connections.remove_if(&user, |_, conns| conns.is_empty());
        }
        removed
    }
}
