//! Events flowing through hub connections.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value as JsonValue};

/// A named event plus JSON payload, as delivered to one connection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamEvent {
    /// Wire-level event name.
    pub event: String,
    /// Opaque payload.
    pub data: JsonValue,
}

impl StreamEvent {
    pub fn new(event: impl Into<String>, data: JsonValue) -> Self {
        Self {
            event: event.into(),
            data,
        }
    }

    /// Acknowledgement sent on every fresh connection.
    pub fn connected() -> Self {
        Self::new("connected", json!({ "message": "connection established" }))
    }

    /// Format as an SSE frame.
    pub fn to_sse(&self) -> String {
        format!("event: {}\ndata: {}\n\n", self.event, self.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sse_frame_layout() {
        let event = StreamEvent::new("case_created", json!({"case_id": "abc"}));
        assert_eq!(
            event.to_sse(),
            "event: case_created\ndata: {\"case_id\":\"abc\"}\n\n"
        );
    }

    #[test]
    fn connected_ack_shape() {
        let ack = StreamEvent::connected();
        assert_eq!(ack.event, "connected");
        assert!(ack.data["message"].is_string());
    }
}
