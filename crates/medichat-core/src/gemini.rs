//! Blocking HTTP client for the Gemini `generateContent` endpoint.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use medichat_config::MediChatConfig;
use medichat_contracts::{
    error::{MediChatError, MediChatResult},
    flow::GenerateRequest,
};

use crate::traits::LlmClient;

/// Gemini REST client.
pub struct GeminiClient {
    base_url: String,
    api_key: String,
    client: reqwest::blocking::Client,
    timeout_secs: u64,
}

impl GeminiClient {
    pub fn new(base_url: &str, api_key: String, timeout_secs: u64) -> MediChatResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| MediChatError::ConfigError {
                reason: format!("failed to build HTTP client: {e}"),
            })?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            client,
            timeout_secs,
        })
    }

    /// Build a client from the `[provider]` table and the API key in the
    /// environment.
    pub fn from_config(config: &MediChatConfig) -> MediChatResult<Self> {
        let api_key = config.api_key()?;
        Self::new(&config.provider.base_url, api_key, config.provider.timeout_secs)
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/models/{}:generateContent", self.base_url, model)
    }
}

// ── Wire types ───────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part<'a> {
    Text {
        text: &'a str,
    },
    #[serde(rename_all = "camelCase")]
    Inline {
        inline_data: InlineData<'a>,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData<'a> {
    mime_type: &'a str,
    data: &'a str,
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<&'static str>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
    #[serde(rename = "finishReason")]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

/// Map a provider-neutral request onto the Gemini body.
fn build_body(request: &GenerateRequest) -> GeminiRequest<'_> {
    let mut parts = vec![Part::Text {
        text: &request.prompt,
    }];
    parts.extend(request.images.iter().map(|image| Part::Inline {
        inline_data: InlineData {
            mime_type: &image.mime_type,
            data: &image.data_base64,
        },
    }));

    GeminiRequest {
        contents: vec![Content {
            role: Some("user"),
            parts,
        }],
        system_instruction: request.system.as_deref().map(|system| Content {
            role: None,
            parts: vec![Part::Text { text: system }],
        }),
        generation_config: GenerationConfig {
            temperature: request.temperature,
            max_output_tokens: request.max_output_tokens,
            response_mime_type: request.json_output.then_some("application/json"),
        },
    }
}

/// Concatenate the text parts of the first candidate.
fn extract_text(response: GeminiResponse) -> MediChatResult<String> {
    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| MediChatError::ResponseParsing {
            reason: "no candidates in response".to_string(),
        })?;

    let text: String = candidate
        .content
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(MediChatError::ResponseParsing {
            reason: format!(
                "candidate has no text (finish reason: {})",
                candidate.finish_reason.as_deref().unwrap_or("unknown")
            ),
        });
    }
    Ok(text)
}

impl LlmClient for GeminiClient {
    fn name(&self) -> &str {
        "gemini"
    }

    fn generate(&self, request: &GenerateRequest) -> MediChatResult<String> {
        let url = self.endpoint(&request.model);
        let body = build_body(request);

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .map_err(|e| {
                if e.is_timeout() {
                    MediChatError::ModelRequest {
                        reason: format!("request timed out after {}s", self.timeout_secs),
                    }
                } else if e.is_connect() {
                    MediChatError::ModelRequest {
                        reason: format!("cannot reach {}", self.base_url),
                    }
                } else {
                    MediChatError::ModelRequest { reason: e.to_string() }
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(MediChatError::ModelHttp {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GeminiResponse = response
            .json()
            .map_err(|e| MediChatError::ResponseParsing { reason: e.to_string() })?;

        let text = extract_text(parsed)?;
        debug!(model = %request.model, reply_chars = text.len(), "gemini reply received");
        Ok(text)
    }
}
