// Generation: form handlers and the per-request orchestration flow.
// All model calls go through llm_client::ChatModel.

pub mod handlers;
pub mod models;
pub mod orchestrator;
