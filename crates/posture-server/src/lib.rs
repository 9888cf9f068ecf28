pub mod api;
pub mod pdf;
pub mod store;

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
    Router,
};
use posture_sources::Orchestrator;
use std::sync::Arc;
use store::ReportStore;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub struct AppState {
    pub store: Arc<dyn ReportStore>,
    pub orchestrator: Orchestrator,
}

impl AppState {
    pub fn new(store: Arc<dyn ReportStore>, orchestrator: Orchestrator) -> Self {
        Self {
            store,
            orchestrator,
        }
    }
}

pub fn router(state: Arc<AppState>, body_limit: usize) -> Router {
    Router::new()
        .route("/ping", get(api::ping))
        .route("/scan", post(api::start_scan))
        .route("/summarize", post(api::summarize_bag))
        .route("/save", post(api::save_scan))
        .route("/allScans", get(api::list_scans))
        .route("/scan/:id", get(api::get_scan))
        .route("/scan/:id/pdf", get(api::download_pdf))
        .route(
            "/saved-reports",
            get(api::list_saved_reports).post(api::save_report),
        )
        .route("/saved-reports/:id", delete(api::delete_saved_report))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
