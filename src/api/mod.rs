use std::sync::Arc;

use axum::{ routing::{ delete, get, post }, Router };
use tower_http::{ cors::CorsLayer, trace::TraceLayer };

pub mod tracking;

use crate::services::TrackingService;

#[derive(Clone)]
pub struct AppState {
    pub tracking_service: Arc<TrackingService>,
}

impl AppState {
    pub fn new(tracking_service: Arc<TrackingService>) -> Self {
        Self { tracking_service }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/trackings", post(tracking::track))
        .route("/api/trackings/{id}", delete(tracking::untrack))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

async fn health_check() -> &'static str {
    "OK"
}
