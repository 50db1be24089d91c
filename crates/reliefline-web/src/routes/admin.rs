//! Admin moderation endpoints.

use crate::auth::CurrentActor;
use crate::error::WebError;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, put},
    Json, Router,
};
use reliefline_core::{Case, CaseFilter, CaseId, CaseStatus};
use serde::Deserialize;
use uuid::Uuid;

pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/api/admin/cases", get(list_all_cases))
        .route("/api/admin/cases/{id}/status", put(set_case_status))
        .route("/api/admin/cases/{id}", delete(admin_delete_case))
}

#[derive(Debug, Deserialize)]
struct SetStatusRequest {
    status: CaseStatus,
}

fn require_admin(actor: &reliefline_core::Actor) -> Result<(), WebError> {
    if !actor.is_admin() {
        return Err(WebError::Forbidden("admin privilege required".to_string()));
    }
    Ok(())
}

async fn list_all_cases(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
) -> Result<Json<Vec<Case>>, WebError> {
    require_admin(&actor)?;
    let cases = state.manager.list(&CaseFilter::default()).await?;
    Ok(Json(cases))
}

/// Force a case status, subject to the manager's downgrade rule.
async fn set_case_status(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<Uuid>,
    Json(request): Json<SetStatusRequest>,
) -> Result<Json<Case>, WebError> {
    let case = state
        .manager
        .admin_set_status(CaseId::from_uuid(id), request.status, &actor)
        .await?;
    Ok(Json(case))
}

async fn admin_delete_case(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, WebError> {
    require_admin(&actor)?;
    state.manager.delete(CaseId::from_uuid(id), &actor).await?;
    Ok(StatusCode::NO_CONTENT)
}
