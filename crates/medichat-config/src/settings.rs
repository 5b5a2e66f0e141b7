//! Configuration schema.
//!
//! `MediChatConfig` is deserialized from TOML. Every table is optional;
//! anything omitted falls back to the built-in defaults below.
//!
//! Example:
//! ```toml
//! [provider]
//! api_key_env = "GEMINI_API_KEY"
//! timeout_secs = 30
//!
//! [defaults]
//! model = "gemini-2.0-flash"
//!
//! [flows.symptom-analyzer]
//! temperature = 0.2
//! ```

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_API_KEY_ENV: &str = "GEMINI_API_KEY";
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";
pub const ANALYSIS_MODEL: &str = "gemini-1.5-flash";

/// Where and how to reach the model provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// REST base URL, without a trailing slash.
    pub base_url: String,
    /// Name of the environment variable holding the API key.
    pub api_key_env: String,
    /// Whole-request timeout for model calls.
    pub timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key_env: DEFAULT_API_KEY_ENV.to_string(),
            timeout_secs: 60,
        }
    }
}

/// Sampling settings. Every field is optional so tables can be layered.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelOverrides {
    pub model: Option<String>,
    pub temperature: Option<f32>,
    pub max_output_tokens: Option<u32>,
}

impl ModelOverrides {
    /// Fill every unset field of `self` from `lower`.
    pub(crate) fn over(&self, lower: &ModelOverrides) -> ModelOverrides {
        ModelOverrides {
            model: self.model.clone().or_else(|| lower.model.clone()),
            temperature: self.temperature.or(lower.temperature),
            max_output_tokens: self.max_output_tokens.or(lower.max_output_tokens),
        }
    }
}

/// Input limits that are policy rather than form validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Limits {
    /// Most recent companion messages kept in the prompt.
    pub companion_history: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            companion_history: 20,
        }
    }
}

/// The top-level structure deserialized from a TOML config file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MediChatConfig {
    pub provider: ProviderConfig,
    /// Applied to every flow below its own overrides.
    pub defaults: ModelOverrides,
    /// Per-flow overrides keyed by flow id.
    pub flows: HashMap<String, ModelOverrides>,
    pub limits: Limits,
}

/// Fully-resolved settings for one flow run.
#[derive(Debug, Clone, PartialEq)]
pub struct FlowSettings {
    pub model: String,
    pub temperature: Option<f32>,
    pub max_output_tokens: Option<u32>,
}

/// Settings each flow uses when neither `[flows.<id>]` nor `[defaults]`
/// says otherwise.
pub(crate) fn builtin_overrides(flow_id: &str) -> ModelOverrides {
    match flow_id {
        "symptom-analyzer" => ModelOverrides {
            model: Some(ANALYSIS_MODEL.to_string()),
            temperature: Some(0.3),
            max_output_tokens: Some(1500),
        },
        "health-analytics" => ModelOverrides {
            model: Some(ANALYSIS_MODEL.to_string()),
            temperature: Some(0.2),
            max_output_tokens: Some(2000),
        },
        "ai-doctor" => ModelOverrides {
            temperature: Some(0.7),
            ..ModelOverrides::default()
        },
        _ => ModelOverrides::default(),
    }
}
