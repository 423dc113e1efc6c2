use axum::{
    extract::{Path, State},
    Json,
};

use crate::precompute::PrecomputedTrack;
use crate::service::{ServiceStatus, VisibleSummary};
use crate::web::api::error::{ApiError, ApiResult, ErrorResponse};
use crate::web::server::AppState;

#[utoipa::path(
    get,
    path = "/api/visible",
    responses(
        (
            status = 200,
            description = "Objects in the current snapshot, highest elevation first",
            body = Vec<VisibleSummary>
        )
    ),
    tag = "sky"
)]
pub async fn list_visible(State(state): State<AppState>) -> Json<Vec<VisibleSummary>> {
    Json(state.query.visible_now())
}

#[utoipa::path(
    get,
    path = "/api/status",
    responses(
        (status = 200, description = "Cache and refresh status", body = ServiceStatus)
    ),
    tag = "sky"
)]
pub async fn status(State(state): State<AppState>) -> Json<ServiceStatus> {
    Json(state.query.status())
}

#[utoipa::path(
    get,
    path = "/api/tracks/{name}",
    params(
        ("name" = String, Path, description = "Object name as published")
    ),
    responses(
        (status = 200, description = "Full precomputed trajectory", body = PrecomputedTrack),
        (status = 404, description = "Object not in the current snapshot", body = ErrorResponse)
    ),
    tag = "sky"
)]
pub async fn get_track(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<Json<PrecomputedTrack>> {
    state
        .query
        .track(&name)
        .map(Json)
        .ok_or(ApiError::NotFound("track_not_found"))
}
