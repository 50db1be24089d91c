//! Case lifecycle endpoints.

use crate::auth::CurrentActor;
use crate::error::WebError;
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use reliefline_core::{
    Case, CaseCategory, CaseDraft, CaseFilter, CaseId, CaseStatus, GeoPoint, Intervention,
};
use serde::Deserialize;
use uuid::Uuid;

pub fn case_routes() -> Router<AppState> {
    Router::new()
        .route("/api/cases", post(create_case).get(list_cases))
        .route("/api/cases/mine", get(my_cases))
        .route("/api/cases/interventions", get(my_interventions))
        .route("/api/cases/nearby", get(nearby_cases))
        .route(
            "/api/cases/{id}",
            get(get_case).put(update_case).delete(delete_case),
        )
        .route("/api/cases/{id}/take", post(take_case))
        .route("/api/cases/{id}/resolve", post(resolve_case))
}

/// Request body for creating or updating a case.
#[derive(Debug, Deserialize)]
struct CaseRequest {
    title: String,
    description: String,
    category: CaseCategory,
    latitude: f64,
    longitude: f64,
}

impl CaseRequest {
    fn into_draft(self) -> CaseDraft {
        CaseDraft {
            title: self.title,
            description: self.description,
            category: self.category,
            location: GeoPoint::new(self.latitude, self.longitude),
        }
    }
}

/// Request body for taking a case.
#[derive(Debug, Deserialize)]
struct TakeRequest {
    scheduled_for: DateTime<Utc>,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct ListQuery {
    status: Option<CaseStatus>,
    category: Option<CaseCategory>,
}

#[derive(Debug, Deserialize)]
struct NearbyQuery {
    lat: f64,
    lon: f64,
    #[serde(default = "default_radius_m")]
    radius: f64,
}

fn default_radius_m() -> f64 {
    10_000.0
}

async fn create_case(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Json(request): Json<CaseRequest>,
) -> Result<(StatusCode, Json<Case>), WebError> {
    let case = state.manager.create(request.into_draft(), &actor).await?;
    Ok((StatusCode::CREATED, Json(case)))
}

async fn list_cases(
    State(state): State<AppState>,
    CurrentActor(_actor): CurrentActor,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Case>>, WebError> {
    let filter = CaseFilter {
        status: query.status,
        category: query.category,
        ..Default::default()
    };
    let cases = state.manager.list(&filter).await?;
    Ok(Json(cases))
}

async fn my_cases(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
) -> Result<Json<Vec<Case>>, WebError> {
    let cases = state.manager.list(&CaseFilter::by_author(actor.id)).await?;
    Ok(Json(cases))
}

async fn my_interventions(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
) -> Result<Json<Vec<Case>>, WebError> {
    let cases = state
        .manager
        .list(&CaseFilter::by_volunteer(actor.id))
        .await?;
    Ok(Json(cases))
}

/// Validated cases within `radius` meters of the given origin.
async fn nearby_cases(
    State(state): State<AppState>,
    CurrentActor(_actor): CurrentActor,
    Query(query): Query<NearbyQuery>,
) -> Result<Json<Vec<Case>>, WebError> {
    if !(-90.0..=90.0).contains(&query.lat) || !(-180.0..=180.0).contains(&query.lon) {
        return Err(WebError::BadRequest("coordinates out of range".to_string()));
    }
    let cases = state
        .manager
        .list_nearby(GeoPoint::new(query.lat, query.lon), query.radius)
        .await?;
    Ok(Json(cases))
}

async fn get_case(
    State(state): State<AppState>,
    CurrentActor(_actor): CurrentActor,
    Path(id): Path<Uuid>,
) -> Result<Json<Case>, WebError> {
    let case = state.manager.get(CaseId::from_uuid(id)).await?;
    Ok(Json(case))
}

async fn update_case(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<Uuid>,
    Json(request): Json<CaseRequest>,
) -> Result<Json<Case>, WebError> {
    let case = state
        .manager
        .update(CaseId::from_uuid(id), request.into_draft(), &actor)
        .await?;
    Ok(Json(case))
}

async fn delete_case(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, WebError> {
    state.manager.delete(CaseId::from_uuid(id), &actor).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn take_case(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<Uuid>,
    Json(request): Json<TakeRequest>,
) -> Result<Json<Case>, WebError> {
    if !actor.is_volunteer() {
        return Err(WebError::Forbidden(
            "only volunteers may take cases".to_string(),
        ));
    }
    let intervention = Intervention {
        scheduled_for: request.scheduled_for,
        message: request.message,
    };
    let case = state
        .manager
        .take(CaseId::from_uuid(id), intervention, &actor)
        .await?;
    Ok(Json(case))
}

async fn resolve_case(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<Uuid>,
) -> Result<Json<Case>, WebError> {
    let case = state.manager.resolve(CaseId::from_uuid(id), &actor).await?;
    Ok(Json(case))
}
