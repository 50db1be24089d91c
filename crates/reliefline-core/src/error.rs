//! Error taxonomy for case operations.

use crate::actor::UserId;
use crate::case::{CaseId, CaseStatus};
use thiserror::Error;

/// Failure kinds surfaced by the lifecycle manager and the store.
///
/// Every variant is a distinct, catchable condition; operations never
/// swallow one of these silently.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CaseError {
    #[error("case not found: {0}")]
    NotFound(CaseId),

    #[error("actor {actor} may not {action}")]
    Unauthorized { actor: UserId, action: &'static str },

    #[error("invalid transition: {from} -> {to}")]
    InvalidTransition { from: CaseStatus, to: CaseStatus },

    #[error("store error: {0}")]
    Store(String),
}

/// Result type for case operations.
pub type CaseResult<T> = Result<T, CaseError>;

impl CaseError {
    pub fn unauthorized(actor: UserId, action: &'static str) -> Self {
        Self::Unauthorized { actor, action }
    }

    pub fn invalid_transition(from: CaseStatus, to: CaseStatus) -> Self {
        Self::InvalidTransition { from, to }
    }

    /// Create a generic store-layer error.
    pub fn store<S: Into<String>>(msg: S) -> Self {
        Self::Store(msg.into())
    }

    /// True for conditions caused by the caller rather than the system.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, Self::Store(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification() {
        let id = CaseId::new();
        assert!(CaseError::NotFound(id).is_client_error());
        assert!(CaseError::unauthorized(UserId::new(), "resolve this case").is_client_error());
        assert!(
            CaseError::invalid_transition(CaseStatus::Pending, CaseStatus::InProgress)
                .is_client_error()
        );
        assert!(!CaseError::store("connection reset").is_client_error());
    }

    #[test]
    fn display_names_the_transition() {
        let err = CaseError::invalid_transition(CaseStatus::Resolved, CaseStatus::InProgress);
        assert_eq!(err.to_string(), "invalid transition: resolved -> in_progress");
    }
}
