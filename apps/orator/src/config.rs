use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result};

use crate::llm_client::{DecodingParams, DEFAULT_API_BASE, DEFAULT_TIMEOUT_SECS};

/// Application configuration loaded from environment variables.
///
/// `HF_TOKEN` is intentionally absent: the credential is read per request.
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub rust_log: String,
    pub prompt_dir: PathBuf,
    pub hf_api_base: String,
    pub request_timeout_secs: u64,
    pub decoding: DecodingParams,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let defaults = DecodingParams::default();

        Ok(Config {
            host: env_or("HOST", "0.0.0.0".to_string())?,
            port: env_or("PORT", 7860)?,
            rust_log: env_or("RUST_LOG", "info".to_string())?,
            prompt_dir: env_or("PROMPT_DIR", PathBuf::from("prompts"))?,
            hf_api_base: env_or("HF_API_BASE", DEFAULT_API_BASE.to_string())?,
            request_timeout_secs: env_or("HF_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?,
            decoding: DecodingParams {
                temperature: env_or("DECODING_TEMPERATURE", defaults.temperature)?,
                max_new_tokens: env_or("DECODING_MAX_NEW_TOKENS", defaults.max_new_tokens)?,
                top_k: env_or("DECODING_TOP_K", defaults.top_k)?,
            },
        })
    }
}

fn env_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    parse_or(key, std::env::var(key).ok(), default)
}

fn parse_or<T>(key: &str, raw: Option<String>, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match raw {
        Some(value) if !value.trim().is_empty() => value
            .trim()
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value '{value}'")),
        _ => Ok(default),
    }
}
