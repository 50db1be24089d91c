//! Fire-and-forget notification dispatch.
//!
//! The dispatcher decouples case mutations from notification delivery: the
//! lifecycle manager hands it an event after the store write committed, and
//! a detached worker task maps the event to a routed notification and feeds
//! the sink. Enqueueing never blocks and never fails the mutation; delivery
//! failures are the sink's problem and are only ever logged.
//!
//! A single worker drains the queue in order, so notifications reach the
//! sink in dispatch order. That is what gives per-connection delivery its
//! publish-order guarantee downstream.

use crate::events::{LifecycleEvent, Notification, Route};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Outbound best-effort notification sink.
///
/// `deliver` is a synchronous enqueue: implementations must not block the
/// caller. Whatever happens to the notification afterwards (slow consumers,
/// dead connections) stays inside the sink.
pub trait NotificationSink: Send + Sync {
    fn deliver(&self, route: Route, notification: Notification);
}

/// Sink that drops everything. For tests and headless setups.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSink;

impl NotificationSink for NoopSink {
    fn deliver(&self, _route: Route, _notification: Notification) {}
}

/// Maps lifecycle events to routed notifications on a background task.
pub struct Dispatcher {
    tx: mpsc::UnboundedSender<LifecycleEvent>,
}

impl Dispatcher {
    /// Spawn the dispatch worker. Must be called within a tokio runtime.
    pub fn new(sink: Arc<dyn NotificationSink>) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<LifecycleEvent>();

        tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                match route_event(&event) {
                    Some((route, notification)) => sink.deliver(route, notification),
                    None => debug!(event = event.event_type(), "event has no recipient"),
                }
            }
            debug!("notification dispatcher stopped");
        });

        Self { tx }
    }

    /// Enqueue an event for delivery. Never blocks; a dead worker only
    /// costs the notification, never the operation that produced it.
    pub fn dispatch(&self, event: LifecycleEvent) {
        if self.tx.send(event).is_err() {
            warn!("notification dispatcher is gone, event dropped");
        }
    }
}

/// Routing table from lifecycle events to notifications.
fn route_event(event: &LifecycleEvent) -> Option<(Route, Notification)> {
    match event {
        LifecycleEvent::CaseCreated { case } => Some((
            Route::Broadcast,
            Notification::for_case(
                "case_created",
                case,
                format!("New case reported: {}", case.title),
            ),
        )),
        LifecycleEvent::CaseUpdated { case } => Some((
            Route::User(case.author),
            Notification::for_case(
                "case_updated",
                case,
                format!("Your case '{}' was updated", case.title),
            ),
        )),
        LifecycleEvent::InterventionConfirmed { case } => Some((
            Route::User(case.author),
            Notification::for_case(
                "intervention_confirmed",
                case,
                format!("A volunteer has taken on your case '{}'", case.title),
            ),
        )),
        LifecycleEvent::CaseResolved { case } => {
            let volunteer = case.volunteer?;
            Some((
                Route::User(volunteer),
                Notification::for_case(
                    "case_resolved",
                    case,
                    format!("Case '{}' was marked as resolved", case.title),
                ),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::UserId;
    use crate::case::{Case, CaseCategory, CaseDraft, CaseStatus, GeoPoint};

    /// Sink that forwards deliveries into a channel so tests can await them.
    pub(crate) struct ChannelSink {
        tx: mpsc::UnboundedSender<(Route, Notification)>,
    }

    impl ChannelSink {
        pub(crate) fn pair() -> (Arc<Self>, mpsc::UnboundedReceiver<(Route, Notification)>) {
            let (tx, rx) = mpsc::unbounded_channel();
            (Arc::new(Self { tx }), rx)
        }
    }

    impl NotificationSink for ChannelSink {
        fn deliver(&self, route: Route, notification: Notification) {
            let _ = self.tx.send((route, notification));
        }
    }

    fn case_with_author(author: UserId) -> Case {
        Case::new(
            CaseDraft {
                title: "Food parcels".to_string(),
                description: "Twenty families cut off by flooding".to_string(),
                category: CaseCategory::Food,
                location: GeoPoint::new(34.0, 9.0),
            },
            author,
        )
    }

    #[tokio::test]
    async fn created_broadcasts() {
        let (sink, mut rx) = ChannelSink::pair();
        let dispatcher = Dispatcher::new(sink);

        let case = case_with_author(UserId::new());
        dispatcher.dispatch(LifecycleEvent::CaseCreated { case });

        let (route, notification) = rx.recv().await.unwrap();
        assert_eq!(route, Route::Broadcast);
        assert_eq!(notification.event, "case_created");
    }

    #[tokio::test]
    async fn updated_targets_author() {
        let (sink, mut rx) = ChannelSink::pair();
        let dispatcher = Dispatcher::new(sink);

        let author = UserId::new();
        dispatcher.dispatch(LifecycleEvent::CaseUpdated {
            case: case_with_author(author),
        });

        let (route, notification) = rx.recv().await.unwrap();
        assert_eq!(route, Route::User(author));
        assert_eq!(notification.event, "case_updated");
    }

    #[tokio::test]
    async fn resolved_targets_volunteer() {
        let (sink, mut rx) = ChannelSink::pair();
        let dispatcher = Dispatcher::new(sink);

        let volunteer = UserId::new();
        let mut case = case_with_author(UserId::new());
        case.status = CaseStatus::Resolved;
        case.volunteer = Some(volunteer);
        dispatcher.dispatch(LifecycleEvent::CaseResolved { case });

        let (route, notification) = rx.recv().await.unwrap();
        assert_eq!(route, Route::User(volunteer));
        assert_eq!(notification.event, "case_resolved");
    }

    #[tokio::test]
    async fn resolved_without_volunteer_is_dropped() {
        let (sink, mut rx) = ChannelSink::pair();
        let dispatcher = Dispatcher::new(sink);

        let author = UserId::new();
        dispatcher.dispatch(LifecycleEvent::CaseResolved {
            case: case_with_author(author),
        });
        // Follow with a routable event; if the first had produced anything
        // it would arrive before this one.
        dispatcher.dispatch(LifecycleEvent::CaseUpdated {
            case: case_with_author(author),
        });

        let (_, notification) = rx.recv().await.unwrap();
        assert_eq!(notification.event, "case_updated");
    }

    #[tokio::test]
    async fn dispatch_order_is_preserved() {
        let (sink, mut rx) = ChannelSink::pair();
        let dispatcher = Dispatcher::new(sink);

        let author = UserId::new();
        for _ in 0..3 {
            dispatcher.dispatch(LifecycleEvent::CaseUpdated {
                case: case_with_author(author),
            });
        }
        dispatcher.dispatch(LifecycleEvent::CaseCreated {
            case: case_with_author(author),
        });

        for _ in 0..3 {
            let (_, n) = rx.recv().await.unwrap();
            assert_eq!(n.event, "case_updated");
        }
        let (_, last) = rx.recv().await.unwrap();
        assert_eq!(last.event, "case_created");
    }
}
