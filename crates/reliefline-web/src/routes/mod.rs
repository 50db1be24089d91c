//! HTTP route modules.

mod admin;
mod cases;
mod health;
mod notifications;

pub use admin::admin_routes;
pub use cases::case_routes;
pub use health::health_routes;
pub use notifications::notification_routes;
