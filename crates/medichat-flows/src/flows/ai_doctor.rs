//! Short conversational replies from the "AI doctor".
//!
//! Text only; voice input and speech output are handled by the client.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::json;

use medichat_config::FlowSettings;
use medichat_contracts::{
    error::{MediChatError, MediChatResult},
    flow::{FlowId, GenerateRequest},
    verify::{OutputSchema, VerificationRule, VerificationRuleType},
};
use medichat_core::traits::Flow;

use crate::flows::request_with;
use crate::rules::required;

pub const FLOW_ID: &str = "ai-doctor";

/// A leading "As an AI doctor, ..." style sentence or clause.
static AI_PREAMBLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^as an ai(?: doctor| language model| assistant| model)?[^,.!]*[,.!]\s*")
        .expect("preamble regex")
});

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DoctorQuestion {
    pub prompt: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DoctorReply {
    pub response: String,
}

pub struct AiDoctor;

impl Flow for AiDoctor {
    type Input = DoctorQuestion;
    type Output = DoctorReply;

    fn id(&self) -> FlowId {
        FlowId::new(FLOW_ID)
    }

    fn validate(&self, input: &DoctorQuestion) -> MediChatResult<()> {
        if input.prompt.trim().is_empty() {
            return Err(MediChatError::invalid("prompt", "Please enter a message."));
        }
        Ok(())
    }

    fn request(&self, input: &DoctorQuestion, settings: &FlowSettings) -> MediChatResult<GenerateRequest> {
        let prompt = format!(
            "You are a helpful and empathetic AI doctor. A user is talking to you. Provide a concise \
and helpful response with precautions if applicable. Keep your response to 2-3 sentences.

IMPORTANT: Do not start your response with \"As an AI doctor\" or any similar disclaimer. Just \
provide the medical information directly. Be friendly and conversational.

User's message: \"{}\"",
            input.prompt.trim()
        );
        Ok(request_with(settings, prompt))
    }

    fn parse(&self, _input: &DoctorQuestion, reply: &str) -> MediChatResult<DoctorReply> {
        let response = clean_reply(reply);
        if response.is_empty() {
            return Err(MediChatError::ResponseParsing {
                reason: "empty doctor reply".to_string(),
            });
        }
        Ok(DoctorReply { response })
    }

    fn schema(&self) -> OutputSchema {
        OutputSchema {
            schema_id: "ai-doctor-v1".to_string(),
            json_schema: json!({
                "type": "object",
                "required": ["response"],
                "properties": { "response": { "type": "string", "minLength": 1 } }
            }),
            rules: vec![
                required("response"),
                VerificationRule::new(
                    "no-ai-preamble",
                    "reply must not open with an AI disclaimer",
                    VerificationRuleType::ForbiddenPattern {
                        field_path: "response".to_string(),
                        pattern: "as an ai doctor".to_string(),
                    },
                ),
            ],
        }
    }
}

/// Trim, drop wrapping quotes, and strip an opening AI disclaimer.
fn clean_reply(reply: &str) -> String {
    let trimmed = reply.trim();
    let unquoted = trimmed
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(trimmed)
        .trim();
    let stripped = AI_PREAMBLE.replace(unquoted, "");

    let mut chars = stripped.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(prompt: &str) -> DoctorQuestion {
        DoctorQuestion {
            prompt: prompt.to_string(),
        }
    }

    #[test]
    fn blank_message_is_rejected() {
        assert!(AiDoctor.validate(&question("   ")).is_err());
        assert!(AiDoctor.validate(&question("I have a cough")).is_ok());
    }

    #[test]
    fn request_quotes_the_message() {
        let settings = FlowSettings {
            model: "gemini-2.0-flash".to_string(),
            temperature: Some(0.7),
            max_output_tokens: None,
        };
        let req = AiDoctor.request(&question(" I have a cough "), &settings).unwrap();
        assert!(req.prompt.ends_with("User's message: \"I have a cough\""));
        assert_eq!(req.temperature, Some(0.7));
    }

    #[test]
    fn preamble_and_quotes_are_removed() {
        let reply = "\"As an AI doctor, I recommend rest. Drink warm fluids and see a doctor if it lasts over a week.\"";
        let out = AiDoctor.parse(&question("cough"), reply).unwrap();
        assert_eq!(
            out.response,
            "I recommend rest. Drink warm fluids and see a doctor if it lasts over a week."
        );
    }

    #[test]
    fn plain_reply_is_kept() {
        let reply = "  Rest and stay hydrated. A doctor should check any fever over 39°C.  ";
        let out = AiDoctor.parse(&question("fever"), reply).unwrap();
        assert_eq!(out.response, "Rest and stay hydrated. A doctor should check any fever over 39°C.");
    }

    #[test]
    fn empty_reply_is_parse_error() {
        assert!(AiDoctor.parse(&question("cough"), " \"\" ").unwrap_err().is_model_failure());
    }
}
