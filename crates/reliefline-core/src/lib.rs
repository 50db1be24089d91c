//! Core domain for Reliefline.
//!
//! This crate owns the case lifecycle state machine and everything it needs
//! to run: the domain model, the storage seam it mutates through, the
//! lifecycle events it emits, and the dispatcher that forwards those events
//! to an outbound notification sink.
//!
//! # Architecture
//!
//! ```text
//! request layer (reliefline-web)
//!    │
//!    ▼
//! CaseLifecycleManager ──▶ CaseStore (atomic per-case mutations)
//!    │
//!    └─▶ Dispatcher ──▶ NotificationSink (fire-and-forget, after commit)
//! ```
//!
//! The manager validates authorization and transitions inside the store's
//! atomic mutator, so concurrent operations on the same case serialize at
//! the store layer and losers observe ordinary transition errors, never
//! partial writes. Notification dispatch happens strictly after the write
//! committed and can never fail the mutating operation.

pub mod actor;
pub mod case;
pub mod dispatch;
pub mod error;
pub mod events;
pub mod lifecycle;
pub mod store;

pub use actor::{Actor, Role, UserId};
pub use case::{
    Case, CaseCategory, CaseDraft, CaseFilter, CaseId, CaseStatus, GeoPoint, Intervention,
};
pub use dispatch::{Dispatcher, NoopSink, NotificationSink};
pub use error::{CaseError, CaseResult};
pub use events::{LifecycleEvent, Notification, Route};
pub use lifecycle::CaseLifecycleManager;
pub use store::{CaseStore, MemoryCaseStore};
