use std::sync::Arc;

use crate::llm_client::{ChatModel, DecodingParams};
use crate::prompt::{BoundPipeline, PipelineStatus};

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Built once at startup; `None` when initialization failed.
    pub pipeline: Option<Arc<BoundPipeline>>,
    pub pipeline_status: PipelineStatus,
    pub llm: Arc<dyn ChatModel>,
    pub decoding: DecodingParams,
}
