//! Lifecycle events and the notification envelope they are mapped into.
//!
//! Events are transient: they exist only to be routed to currently
//! connected clients. Nothing here is ever persisted or replayed.

use crate::actor::UserId;
use crate::case::Case;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value as JsonValue};

/// Events emitted by the lifecycle manager after a mutation commits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LifecycleEvent {
    /// A new case was reported.
    CaseCreated { case: Case },

    /// Mutable fields of a case were rewritten.
    CaseUpdated { case: Case },

    /// A volunteer took the case and scheduled an intervention.
    InterventionConfirmed { case: Case },

    /// The case was marked resolved.
    CaseResolved { case: Case },
}

impl LifecycleEvent {
    /// Wire-level event name.
    pub fn event_type(&self) -> &'static str {
        match self {
            LifecycleEvent::CaseCreated { .. } => "case_created",
            LifecycleEvent::CaseUpdated { .. } => "case_updated",
            LifecycleEvent::InterventionConfirmed { .. } => "intervention_confirmed",
            LifecycleEvent::CaseResolved { .. } => "case_resolved",
        }
    }

    /// The case snapshot the event carries.
    pub fn case(&self) -> &Case {
        match self {
            LifecycleEvent::CaseCreated { case }
            | LifecycleEvent::CaseUpdated { case }
            | LifecycleEvent::InterventionConfirmed { case }
            | LifecycleEvent::CaseResolved { case } => case,
        }
    }
}

/// How a notification is routed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Every currently connected user.
    Broadcast,
    /// Only the live connections of one user.
    User(UserId),
}

/// A named event plus its payload, ready for delivery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub event: String,
    pub payload: JsonValue,
}

impl Notification {
    pub fn new(event: impl Into<String>, payload: JsonValue) -> Self {
        Self {
            event: event.into(),
            payload,
        }
    }

    /// Standard payload for case notifications: identity, status and a
    /// human-readable message.
    pub fn for_case(event: &'static str, case: &Case, message: String) -> Self {
        Self::new(
            event,
            json!({
                "case_id": case.id,
                "title": case.title,
                "status": case.status,
                "message": message,
            }),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::case::{CaseCategory, CaseDraft, GeoPoint};

    fn sample_case() -> Case {
        Case::new(
            CaseDraft {
                title: "Shelter needed".to_string(),
                description: "Family of four displaced".to_string(),
                category: CaseCategory::Housing,
                location: GeoPoint::new(35.0, 9.0),
            },
            UserId::new(),
        )
    }

    #[test]
    fn event_types_are_stable_names() {
        let case = sample_case();
        assert_eq!(
            LifecycleEvent::CaseCreated { case: case.clone() }.event_type(),
            "case_created"
        );
        assert_eq!(
            LifecycleEvent::InterventionConfirmed { case: case.clone() }.event_type(),
            "intervention_confirmed"
        );
        assert_eq!(
            LifecycleEvent::CaseResolved { case }.event_type(),
            "case_resolved"
        );
    }

    #[test]
    fn case_payload_carries_id_and_message() {
        let case = sample_case();
        let n = Notification::for_case("case_created", &case, "New case".to_string());

        assert_eq!(n.event, "case_created");
        assert_eq!(n.payload["case_id"], json!(case.id));
        assert_eq!(n.payload["message"], json!("New case"));
    }

    #[test]
    fn events_serialize_tagged() {
        let event = LifecycleEvent::CaseCreated {
            case: sample_case(),
        };
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["type"], "case_created");
    }
}
