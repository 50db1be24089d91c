//! Router assembly and server startup.

use crate::auth::TokenRegistry;
use crate::config::ServerConfig;
use crate::error::{Result, WebError};
use crate::routes::{admin_routes, case_routes, health_routes, notification_routes};
use crate::state::AppState;
use axum::http::{header, HeaderValue, Method};
use axum::Router;
use reliefline_core::{Actor, Role, UserId};
use std::net::SocketAddr;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::{info, warn};

/// Assemble the full application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(case_routes())
        .merge(admin_routes())
        .merge(notification_routes())
        .merge(health_routes())
        .with_state(state)
}

pub async fn start_server(config: &ServerConfig) -> Result<()> {
    let state = AppState::new(config.hub_config());
    if config.seed_dev_tokens {
        seed_dev_tokens(&state.tokens);
    }

    let app = router(state).layer(cors_layer(config));

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .map_err(|e| WebError::Config(format!("invalid listen address: {e}")))?;

    info!("starting reliefline server on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn cors_layer(config: &ServerConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "ignoring unparseable CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

/// Issue one token per role and log them. Development convenience for the
/// in-memory identity registry.
fn seed_dev_tokens(tokens: &TokenRegistry) {
    for role in [Role::Citizen, Role::Volunteer, Role::Admin] {
        let actor = Actor::new(UserId::new(), role);
        let token = tokens.issue(actor);
        info!(role = ?role, user = %actor.id, token = %token, "dev token issued");
    }
}
