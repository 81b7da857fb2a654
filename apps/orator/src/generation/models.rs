use serde::{Deserialize, Serialize};

use crate::prompt::RuntimeParams;

/// Hosted models offered in the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ModelChoice {
    #[default]
    #[serde(rename = "Qwen/Qwen2.5-72B-Instruct")]
    Qwen25Instruct72B,
    #[serde(rename = "Qwen/Qwen3-Next-80B-A3B-Instruct")]
    Qwen3NextInstruct80B,
    #[serde(rename = "Qwen/Qwen3-235B-A22B-Instruct-2507")]
    Qwen3Instruct235B,
}

impl ModelChoice {
    pub const ALL: [ModelChoice; 3] = [
        ModelChoice::Qwen25Instruct72B,
        ModelChoice::Qwen3NextInstruct80B,
        ModelChoice::Qwen3Instruct235B,
    ];

    pub fn id(self) -> &'static str {
        match self {
            ModelChoice::Qwen25Instruct72B => "Qwen/Qwen2.5-72B-Instruct",
            ModelChoice::Qwen3NextInstruct80B => "Qwen/Qwen3-Next-80B-A3B-Instruct",
            ModelChoice::Qwen3Instruct235B => "Qwen/Qwen3-235B-A22B-Instruct-2507",
        }
    }
}

/// Body of `POST /api/v1/generate`. `model` may be omitted.
#[derive(Debug, Clone, Deserialize)]
pub struct GenerateRequest {
    #[serde(default)]
    pub model: ModelChoice,
    #[serde(flatten)]
    pub params: RuntimeParams,
}

#[derive(Debug, Serialize)]
pub struct ModelCatalog {
    pub models: Vec<&'static str>,
    pub default: &'static str,
}

impl ModelCatalog {
    pub fn supported() -> Self {
        Self {
            models: ModelChoice::ALL.iter().map(|m| m.id()).collect(),
            default: ModelChoice::default().id(),
        }
    }
}
