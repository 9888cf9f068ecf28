use crate::pdf::render_report;
use crate::store::StoreError;
use crate::AppState;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use posture_core::{summarize, LiveScan, RawScanBag, ScanSummary, Target};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::{error, info};

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    NotFound(String),
    Persistence(String),
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, json!({ "error": msg })),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, json!({ "error": msg })),
            ApiError::Persistence(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "ok": false, "error": msg }),
            ),
            ApiError::Internal(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, json!({ "error": msg }))
            }
        };
        (status, Json(body)).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::UnknownScan(_) => ApiError::NotFound(e.to_string()),
            other => {
                error!(error = %other, "store operation failed");
                ApiError::Persistence(other.to_string())
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

fn not_found() -> ApiError {
    ApiError::NotFound("not found".to_string())
}

// --- DTOs ---

#[derive(Debug, Default, Deserialize)]
pub struct ScanRequest {
    pub target: Option<String>,
    pub url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ScanResponse {
    pub ok: bool,
    pub result: LiveScan,
}

#[derive(Debug, Deserialize)]
pub struct SaveRequest {
    #[serde(default)]
    pub target: String,
    #[serde(default)]
    pub url: String,
    pub result: ScanSummary,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveReportRequest {
    pub scan_id: String,
    #[serde(default)]
    pub domain: String,
}

#[derive(Debug, Serialize)]
pub struct DataResponse<T> {
    pub ok: bool,
    pub data: T,
}

#[derive(Debug, Serialize)]
pub struct OkResponse {
    pub ok: bool,
}

// --- Endpoints ---

pub async fn ping() -> &'static str {
    "ok"
}

pub async fn start_scan(
    State(state): State<Arc<AppState>>,
    body: Result<Json<ScanRequest>, JsonRejection>,
) -> Result<Json<ScanResponse>, ApiError> {
    let Json(req) = body?;
    let target = Target::from_parts(req.target.as_deref(), req.url.as_deref())
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;
    let result = state.orchestrator.live_scan(&target).await;
    info!(domain = %target.domain, risks = result.risks.len(), "scan served");
    Ok(Json(ScanResponse { ok: true, result }))
}

pub async fn summarize_bag(
    body: Result<Json<RawScanBag>, JsonRejection>,
) -> Result<Json<ScanSummary>, ApiError> {
    let Json(bag) = body?;
    Ok(Json(summarize(&bag)))
}

pub async fn save_scan(
    State(state): State<Arc<AppState>>,
    body: Result<Json<SaveRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = body?;
    let target = req.target.trim();
    if target.is_empty() {
        return Err(ApiError::BadRequest("target is required".to_string()));
    }
    let record = state.store.upsert_scan(target, &req.url, req.result).await?;
    info!(target = %record.target, id = %record.id, "scan saved");
    Ok(Json(DataResponse {
        ok: true,
        data: record,
    }))
}

pub async fn list_scans(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.store.list_scans().await?))
}

pub async fn get_scan(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let record = state.store.get_scan(&id).await?.ok_or_else(not_found)?;
    Ok(Json(record))
}

pub async fn download_pdf(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let record = state.store.get_scan(&id).await?.ok_or_else(not_found)?;
    let bytes = render_report(&record).map_err(|e| {
        error!(id = %id, error = %e, "pdf export failed");
        ApiError::Internal(e.to_string())
    })?;

    let headers = [
        (header::CONTENT_TYPE, "application/pdf".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=scan-{}.pdf", id),
        ),
    ];
    Ok((headers, bytes))
}

pub async fn list_saved_reports(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.store.list_saved_reports().await?))
}

pub async fn save_report(
    State(state): State<Arc<AppState>>,
    body: Result<Json<SaveReportRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = body?;
    let domain = req.domain.trim();
    if domain.is_empty() {
        return Err(ApiError::BadRequest("domain is required".to_string()));
    }
    let pointer = state.store.upsert_saved_report(domain, &req.scan_id).await?;
    Ok(Json(DataResponse {
        ok: true,
        data: pointer,
    }))
}

pub async fn delete_saved_report(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    if !state.store.delete_saved_report(&id).await? {
        return Err(not_found());
    }
    Ok(Json(OkResponse { ok: true }))
}
