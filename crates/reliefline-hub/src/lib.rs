//! Live per-user event streams.
//!
//! The hub routes transient events to whoever is connected right now:
//! subscribe opens a stream for a user, publish fans an event out to the
//! matching live connections, and every disconnect path (explicit close,
//! handle drop, expiry, dead consumer) converges on the same idempotent
//! cleanup. Delivery is best-effort and at-most-once per connection; a
//! client that is not connected at publish time never sees the event.
//!
//! The hub knows nothing about what the events mean. Users are opaque
//! [`Uuid`](uuid::Uuid)s and payloads opaque JSON.

mod connection;
mod event;
mod hub;

pub use connection::{ConnectionHandle, ConnectionId};
pub use event::StreamEvent;
pub use hub::{HubConfig, NotificationHub, Route};
