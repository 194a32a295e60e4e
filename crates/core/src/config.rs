//! Process configuration read from the environment.
//!
//! | Variable            | Meaning                         | Default                               |
//! |---------------------|---------------------------------|---------------------------------------|
//! | `PROXYAPI_KEY`      | API credential (required)       |                                       |
//! | `PROXYAPI_BASE_URL` | OpenAI-compatible endpoint      | `https://api.proxyapi.ru/openai/v1`   |
//! | `AI_MODEL`          | default model                   | `gpt-4o`                              |
//! | `MAX_TEXT_LENGTH`   | input cap in characters         | `16000`                               |
//!
//! A `.env` file in the working directory is loaded first when present.

use crate::provider::{DEFAULT_BASE_URL, Model, OpenAiProvider};
use crate::summarize::SummarizerConfig;
use crate::{Result, SynopsisError};

pub const API_KEY_VAR: &str = "PROXYAPI_KEY";
pub const BASE_URL_VAR: &str = "PROXYAPI_BASE_URL";
pub const MODEL_VAR: &str = "AI_MODEL";
pub const MAX_TEXT_LENGTH_VAR: &str = "MAX_TEXT_LENGTH";

/// Settings read once at startup and never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct SynopsisConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: Model,
    pub max_text_length: usize,
}

impl SynopsisConfig {
    /// Load from the process environment, after an optional `.env` file.
    ///
    /// # Errors
    ///
    /// Returns [`SynopsisError::Config`] when the API key is missing or the
    /// length is not a positive integer, and
    /// [`SynopsisError::UnsupportedModel`] for an unknown model name.
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let value = |key: &str| lookup_value(&lookup, key);

        let api_key = value(API_KEY_VAR).ok_or_else(|| {
            SynopsisError::Config(format!("API key not found; set {} or pass it explicitly", API_KEY_VAR))
        })?;

        let base_url = value(BASE_URL_VAR).unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let model = Self::model_from_lookup(&lookup)?;

        let max_text_length = match value(MAX_TEXT_LENGTH_VAR) {
            Some(raw) => parse_positive(&raw).ok_or_else(|| {
                SynopsisError::Config(format!("{} must be a positive integer, got '{}'", MAX_TEXT_LENGTH_VAR, raw))
            })?,
            None => SummarizerConfig::default().max_input_chars,
        };

        Ok(Self { api_key, base_url, model, max_text_length })
    }

    /// The default model from the process environment, without requiring a key.
    ///
    /// # Errors
    ///
    /// Returns [`SynopsisError::UnsupportedModel`] when `AI_MODEL` names an
    /// unknown model.
    pub fn model_from_env() -> Result<Model> {
        dotenv::dotenv().ok();
        Self::model_from_lookup(|key| std::env::var(key).ok())
    }

    /// The default model from an arbitrary key lookup.
    pub fn model_from_lookup<F>(lookup: F) -> Result<Model>
    where
        F: Fn(&str) -> Option<String>,
    {
        match lookup_value(&lookup, MODEL_VAR) {
            Some(name) => name.parse(),
            None => Ok(Model::default()),
        }
    }

    /// Summarizer settings derived from this configuration.
    pub fn summarizer_config(&self) -> SummarizerConfig {
        SummarizerConfig::builder()
            .max_input_chars(self.max_text_length)
            .default_model(self.model)
            .build()
    }

    /// Provider for the configured endpoint and credential.
    pub fn provider(&self) -> Result<OpenAiProvider> {
        OpenAiProvider::new(self.api_key.clone(), self.base_url.clone())
            .map_err(|e| SynopsisError::Config(format!("failed to build provider client: {}", e)))
    }
}

fn lookup_value<F>(lookup: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn parse_positive(raw: &str) -> Option<usize> {
    raw.parse::<usize>().ok().filter(|n| *n > 0)
}
