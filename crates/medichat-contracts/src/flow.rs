//! Flow identity and model request types.
//!
//! These types describe what a flow sends to the hosted model. They carry no
//! provider-specific wire details; the client in `medichat-core` maps them
//! onto the provider's request format.

use serde::{Deserialize, Serialize};

/// Stable, human-readable identifier for a flow.
///
/// Used as the key for per-flow configuration and in every log record.
/// Example: FlowId("symptom-analyzer")
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FlowId(pub String);

impl FlowId {
    /// Construct a flow id from any string-like value.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for FlowId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Unique identifier for a single flow run.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InvocationId(pub uuid::Uuid);

impl InvocationId {
    /// Create a new, unique invocation ID.
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for InvocationId {
    fn default() -> Self {
        Self::new()
    }
}

/// An image attached to a model request, already base64-encoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineImage {
    /// MIME type, e.g. "image/png".
    pub mime_type: String,
    /// Standard base64 of the raw image bytes.
    pub data_base64: String,
}

/// A single text generation request.
///
/// Built by a flow from its input and the resolved settings, then handed to
/// whichever `LlmClient` the runner owns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateRequest {
    /// Provider model name, e.g. "gemini-2.0-flash".
    pub model: String,
    /// The rendered user prompt.
    pub prompt: String,
    /// Optional system instruction sent separately from the prompt.
    pub system: Option<String>,
    pub temperature: Option<f32>,
    pub max_output_tokens: Option<u32>,
    /// Images sent alongside the prompt (skin-lesion triage).
    #[serde(default)]
    pub images: Vec<InlineImage>,
    /// Ask the provider for a JSON-only reply.
    #[serde(default)]
    pub json_output: bool,
}

impl GenerateRequest {
    /// A plain text request with no sampling overrides.
    pub fn text(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            system: None,
            temperature: None,
            max_output_tokens: None,
            images: Vec::new(),
            json_output: false,
        }
    }
}
