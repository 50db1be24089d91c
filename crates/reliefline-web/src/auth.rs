//! Bearer-token identity resolution.
//!
//! Token verification proper is an external concern; the registry here is
//! the boundary the rest of the service sees: an opaque token resolves to
//! an [`Actor`] or it does not. Stream clients cannot always set headers,
//! so the `token` query parameter is accepted as a fallback to the
//! `Authorization` header.

use crate::error::WebError;
use crate::state::AppState;
use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts, HeaderMap};
use dashmap::DashMap;
use rand::distributions::Alphanumeric;
use rand::Rng;
use reliefline_core::Actor;

const TOKEN_LEN: usize = 40;

/// Maps opaque bearer tokens to resolved actors.
#[derive(Default)]
pub struct TokenRegistry {
    tokens: DashMap<String, Actor>,
}

impl TokenRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mint a random token for an actor.
    pub fn issue(&self, actor: Actor) -> String {
        let token: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(TOKEN_LEN)
            .map(char::from)
            .collect();
        self.tokens.insert(token.clone(), actor);
        token
    }

    /// Register a caller-chosen token. For tests and fixtures.
    pub fn register(&self, token: impl Into<String>, actor: Actor) {
        self.tokens.insert(token.into(), actor);
    }

    pub fn resolve(&self, token: &str) -> Option<Actor> {
        self.tokens.get(token).map(|entry| *entry.value())
    }

    pub fn revoke(&self, token: &str) {
        self.tokens.remove(token);
    }
}

/// Extractor for the authenticated actor of a request.
pub struct CurrentActor(pub Actor);

impl FromRequestParts<AppState> for CurrentActor {
    type Rejection = WebError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)
            .or_else(|| query_token(parts.uri.query()))
            .ok_or(WebError::MissingCredentials)?;
        let actor = state
            .tokens
            .resolve(&token)
            .ok_or(WebError::InvalidCredentials)?;
        Ok(CurrentActor(actor))
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(|token| token.trim().to_string())
}

fn query_token(query: Option<&str>) -> Option<String> {
    query?
        .split('&')
        .find_map(|pair| pair.strip_prefix("token="))
        .filter(|token| !token.is_empty())
        .map(|token| token.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use reliefline_core::{Role, UserId};

    #[test]
    fn issue_then_resolve() {
        let registry = TokenRegistry::new();
        let actor = Actor::new(UserId::new(), Role::Volunteer);

        let token = registry.issue(actor);
        assert_eq!(token.len(), TOKEN_LEN);
        assert_eq!(registry.resolve(&token), Some(actor));

        registry.revoke(&token);
        assert_eq!(registry.resolve(&token), None);
    }

    #[test]
    fn bearer_header_parsing() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);

        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Bearer abc123"),
        );
        assert_eq!(bearer_token(&headers), Some("abc123".to_string()));

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic xyz"));
        assert_eq!(bearer_token(&headers), None);
    }

    #[test]
    fn query_fallback_parsing() {
        assert_eq!(query_token(None), None);
        assert_eq!(query_token(Some("foo=bar")), None);
        assert_eq!(query_token(Some("token=")), None);
        assert_eq!(
            query_token(Some("foo=bar&token=abc123")),
            Some("abc123".to_string())
        );
    }
}
