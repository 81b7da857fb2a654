//! Axum route handlers for the generation form and API.

use axum::{
    extract::{rejection::JsonRejection, State},
    response::Html,
    Json,
};
use tracing::debug;

use crate::errors::AppError;
use crate::generation::models::{GenerateRequest, ModelCatalog};
use crate::generation::orchestrator::{handle_request, GenerationOutcome};
use crate::prompt::PipelineStatus;
use crate::state::AppState;

const INDEX_HTML: &str = include_str!("../../static/index.html");

/// GET /
pub async fn handle_index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// GET /api/v1/status
///
/// Startup initialization result, shown under the form title.
pub async fn handle_status(State(state): State<AppState>) -> Json<PipelineStatus> {
    Json(state.pipeline_status.clone())
}

/// GET /api/v1/models
pub async fn handle_models() -> Json<ModelCatalog> {
    Json(ModelCatalog::supported())
}

/// POST /api/v1/generate
///
/// Always 200 once the body parses: generation failures are reported inside
/// the `result` field, not as HTTP errors.
pub async fn handle_generate(
    State(state): State<AppState>,
    payload: Result<Json<GenerateRequest>, JsonRejection>,
) -> Result<Json<GenerationOutcome>, AppError> {
    let Json(request) = payload.map_err(|e| AppError::Validation(e.body_text()))?;
    let outcome = handle_request(&state, &request).await;
    debug!("Generate request finished in state {:?}", outcome.state);
    Ok(Json(outcome))
}
