//! Shared application state and the hub/sink composition.

use crate::auth::TokenRegistry;
use reliefline_core::{
    CaseLifecycleManager, Dispatcher, MemoryCaseStore, Notification, NotificationSink,
    Route as EventRoute,
};
use reliefline_hub::{HubConfig, NotificationHub, Route as HubRoute, StreamEvent};
use std::sync::Arc;

/// State shared by every route handler.
#[derive(Clone)]
pub struct AppState {
    pub manager: Arc<CaseLifecycleManager<MemoryCaseStore>>,
    pub hub: NotificationHub,
    pub tokens: Arc<TokenRegistry>,
}

impl AppState {
    /// Wire the full stack: store → lifecycle manager → dispatcher → hub.
    ///
    /// Must be called within a tokio runtime (the dispatcher spawns its
    /// worker task).
    pub fn new(hub_config: HubConfig) -> Self {
        let hub = NotificationHub::new(hub_config);
        let dispatcher = Dispatcher::new(Arc::new(HubSink { hub: hub.clone() }));
        let manager = Arc::new(CaseLifecycleManager::new(MemoryCaseStore::new(), dispatcher));

        Self {
            manager,
            hub,
            tokens: Arc::new(TokenRegistry::new()),
        }
    }
}

/// Adapts the hub to the core's notification sink seam, keeping the hub
/// crate itself free of case semantics.
struct HubSink {
    hub: NotificationHub,
}

impl NotificationSink for HubSink {
    fn deliver(&self, route: EventRoute, notification: Notification) {
        let event = StreamEvent::new(notification.event, notification.payload);
        let route = match route {
            EventRoute::Broadcast => HubRoute::Broadcast,
            EventRoute::User(user) => HubRoute::User(user.as_uuid()),
        };
        self.hub.publish(route, &event);
    }
}
