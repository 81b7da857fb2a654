// Prompt pipeline: template parsing, startup loading, per-request composition.

pub mod composer;
pub mod loader;
pub mod template;

pub use composer::{BoundPipeline, RuntimeParams};
pub use loader::PipelineStatus;
