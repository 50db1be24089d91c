//! HTTP and SSE surface for Reliefline.
//!
//! Thin request layer over [`reliefline_core`]: routes resolve the caller
//! into an actor, invoke one lifecycle operation, and map the typed errors
//! to HTTP responses. The notification stream endpoint exposes hub
//! connections as server-sent events.

pub mod auth;
pub mod config;
pub mod routes;
pub mod server;
pub mod state;

mod error;

pub use config::ServerConfig;
pub use error::{Result, WebError};
pub use server::{router, start_server};
pub use state::AppState;
