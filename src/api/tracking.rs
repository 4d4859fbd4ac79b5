use axum::{ extract::{ Path, Query, State }, Json };
use serde::{ Deserialize, Serialize };
use uuid::Uuid;

use crate::error::Result;

use super::AppState;

#[derive(Deserialize)]
pub struct TrackRequest {
    pub user_id: Uuid,
    pub url: String,
}

#[derive(Deserialize)]
pub struct UntrackQuery {
    pub user_id: Uuid,
}

#[derive(Serialize)]
pub struct TrackResponse {
    pub tracking_id: Uuid,
    pub message: String,
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

pub async fn track(
    State(state): State<AppState>,
    Json(request): Json<TrackRequest>
) -> Result<Json<TrackResponse>> {
    let record = state.tracking_service.track(request.user_id, request.url.trim()).await?;

    Ok(
        Json(TrackResponse {
            tracking_id: record.id,
            message: "Tracking product success!".to_string(),
        })
    )
}

pub async fn untrack(
    State(state): State<AppState>,
    Path(tracking_id): Path<Uuid>,
    Query(query): Query<UntrackQuery>
) -> Result<Json<MessageResponse>> {
    state.tracking_service.untrack(query.user_id, tracking_id).await?;

    Ok(
        Json(MessageResponse {
            message: "Untracking product success!".to_string(),
        })
    )
}
