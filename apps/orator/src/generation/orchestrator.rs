//! Request orchestration — compose, check credential, invoke, format.
//!
//! Flow: pipeline present? → compose messages → credential pre-check →
//!       chat model call → display triple.
//!
//! Every outcome, failures included, becomes a display triple here. Nothing
//! past this point distinguishes an error from a reply except its text.

use std::fmt::Display;

use serde::Serialize;
use tracing::{error, info, warn};

use crate::generation::models::GenerateRequest;
use crate::llm_client::{ChatModel, DecodingParams, InferenceRequest};
use crate::prompt::BoundPipeline;
use crate::state::AppState;

/// Environment variable holding the inference credential.
pub const HF_TOKEN_ENV: &str = "HF_TOKEN";
const CREDENTIAL_PREFIX: &str = "hf_";

/// Displayed system prompts are cut to this many characters.
pub const SYSTEM_DISPLAY_LIMIT: usize = 800;
pub const ELISION_MARKER: &str = "\n\n...(long example text omitted)...";

pub const NOT_READY_MESSAGE: &str = "Error: prompt pipeline not initialized";
pub const NOT_READY_FIELD: &str = "Error";
pub const TOKEN_REQUIRED_MESSAGE: &str = "❌ Please set a valid Hugging Face API token (HF_TOKEN)";
pub const PROMPT_PENDING: &str = "Generating prompt...";

/// How a request ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminalState {
    Done,
    FailedUninitialized,
    FailedComposition,
    FailedCredential,
    FailedInvocation,
}

/// The display triple returned for every generate request.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationOutcome {
    pub system_prompt: String,
    pub user_prompt: String,
    pub result: String,
    #[serde(skip)]
    pub state: TerminalState,
}

impl GenerationOutcome {
    fn not_ready() -> Self {
        Self {
            system_prompt: NOT_READY_MESSAGE.to_string(),
            user_prompt: NOT_READY_FIELD.to_string(),
            result: NOT_READY_FIELD.to_string(),
            state: TerminalState::FailedUninitialized,
        }
    }

    fn failed(state: TerminalState, error: &dyn Display) -> Self {
        Self {
            system_prompt: PROMPT_PENDING.to_string(),
            user_prompt: PROMPT_PENDING.to_string(),
            result: format!(
                "❌ AI call failed: {error}\nPlease check your network or token permissions."
            ),
            state,
        }
    }
}

/// Handles one generate request against the shared application state.
/// The credential is read from the environment on every call.
pub async fn handle_request(state: &AppState, request: &GenerateRequest) -> GenerationOutcome {
    let credential = std::env::var(HF_TOKEN_ENV).ok();
    run_generation(
        state.pipeline.as_deref(),
        state.llm.as_ref(),
        state.decoding,
        credential.as_deref(),
        request,
    )
    .await
}

pub async fn run_generation(
    pipeline: Option<&BoundPipeline>,
    llm: &dyn ChatModel,
    decoding: DecodingParams,
    credential: Option<&str>,
    request: &GenerateRequest,
) -> GenerationOutcome {
    let model_id = request.model.id();

    let Some(pipeline) = pipeline else {
        warn!("Generation requested before the prompt pipeline was initialized");
        return GenerationOutcome::not_ready();
    };

    // Composed before the credential check so the prompt is always shown.
    let messages = match pipeline.compose(&request.params) {
        Ok(messages) => messages,
        Err(e) => {
            error!("Prompt composition failed: {e}");
            return GenerationOutcome::failed(TerminalState::FailedComposition, &e);
        }
    };

    let system_prompt = truncate_for_display(&messages.system);

    let Some(credential) = credential.filter(|c| is_well_formed_credential(c)) else {
        warn!("{HF_TOKEN_ENV} is missing or malformed; skipping model call");
        return GenerationOutcome {
            system_prompt,
            user_prompt: messages.user,
            result: TOKEN_REQUIRED_MESSAGE.to_string(),
            state: TerminalState::FailedCredential,
        };
    };

    info!(
        "Invoking {model_id}: system_chars={}, user_chars={}",
        messages.system.chars().count(),
        messages.user.chars().count()
    );

    // The model always receives the full system text, never the truncated one.
    let inference = InferenceRequest {
        model_id,
        credential,
        system: &messages.system,
        user: &messages.user,
        params: decoding,
    };

    match llm.invoke(&inference).await {
        Ok(reply) => {
            info!("Generation with {model_id} completed");
            GenerationOutcome {
                system_prompt,
                user_prompt: messages.user,
                result: reply,
                state: TerminalState::Done,
            }
        }
        Err(e) => {
            warn!("Generation with {model_id} failed: {e}");
            GenerationOutcome::failed(TerminalState::FailedInvocation, &e)
        }
    }
}

/// Format pre-check only; the remote service is the authority on validity.
fn is_well_formed_credential(credential: &str) -> bool {
    credential.starts_with(CREDENTIAL_PREFIX)
}

/// Cuts the system prompt to [`SYSTEM_DISPLAY_LIMIT`] characters for display.
pub fn truncate_for_display(system: &str) -> String {
    match system.char_indices().nth(SYSTEM_DISPLAY_LIMIT) {
        Some((cut, _)) => format!("{}{ELISION_MARKER}", &system[..cut]),
        None => system.to_string(),
    }
}
