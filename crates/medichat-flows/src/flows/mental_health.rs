//! Supportive chat companion with a mood read-out.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::json;

use medichat_config::FlowSettings;
use medichat_contracts::{
    error::{MediChatError, MediChatResult},
    flow::{FlowId, GenerateRequest},
    verify::{OutputSchema, VerificationRule, VerificationRuleType},
};
use medichat_core::traits::Flow;

use crate::flows::json_request_with;
use crate::json::parse_reply;
use crate::rules::required;

pub const FLOW_ID: &str = "mental-health-companion";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mood {
    Positive,
    Negative,
    Neutral,
    Mixed,
}

impl Mood {
    pub const ALL: [Mood; 4] = [Mood::Positive, Mood::Negative, Mood::Neutral, Mood::Mixed];
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Positive => "Positive",
            Self::Negative => "Negative",
            Self::Neutral => "Neutral",
            Self::Mixed => "Mixed",
        })
    }
}

impl FromStr for Mood {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Mood::ALL
            .into_iter()
            .find(|m| m.to_string().eq_ignore_ascii_case(s.trim()))
            .ok_or(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanionMessage {
    pub prompt: String,
    /// Earlier messages, oldest first.
    #[serde(default)]
    pub history: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanionReply {
    pub response: String,
    pub mood: Mood,
}

#[derive(Debug, Deserialize)]
struct RawReply {
    response: String,
    #[serde(default)]
    mood: String,
}

/// The companion flow. Only the most recent `history_limit` messages are
/// sent to the model.
pub struct MentalHealthCompanion {
    history_limit: usize,
}

impl MentalHealthCompanion {
    pub fn new(history_limit: usize) -> Self {
        Self { history_limit }
    }

    fn render_history(&self, history: &[String]) -> String {
        let skip = history.len().saturating_sub(self.history_limit);
        let lines: Vec<String> = history[skip..]
            .iter()
            .map(|m| m.trim())
            .filter(|m| !m.is_empty())
            .map(|m| format!("- {m}"))
            .collect();
        if lines.is_empty() {
            "(no earlier messages)".to_string()
        } else {
            lines.join("\n")
        }
    }
}

impl Flow for MentalHealthCompanion {
    type Input = CompanionMessage;
    type Output = CompanionReply;

    fn id(&self) -> FlowId {
        FlowId::new(FLOW_ID)
    }

    fn validate(&self, input: &CompanionMessage) -> MediChatResult<()> {
        if input.prompt.trim().is_empty() {
            return Err(MediChatError::invalid("prompt", "Please enter a message."));
        }
        Ok(())
    }

    fn request(&self, input: &CompanionMessage, settings: &FlowSettings) -> MediChatResult<GenerateRequest> {
        let prompt = format!(
            "You are a warm, empathetic, and non-judgmental AI mental health companion. You are not a \
therapist, but a supportive friend to talk to. Your goal is to listen, validate feelings, ask gentle, \
reflective questions, and offer encouragement.

Conversation History (for context, most recent message is last):
{history}

User's latest message: \"{prompt}\"

Provide a supportive and caring response in 2-4 sentences. Ask an open-ended, reflective question if \
it feels natural, but don't force it. Do not give medical advice. Also assess the user's current mood \
based on their message and the history.

Reply with a single JSON object: {{\"response\": string, \"mood\": \"Positive\" | \"Negative\" | \
\"Neutral\" | \"Mixed\"}}",
            history = self.render_history(&input.history),
            prompt = input.prompt.trim(),
        );
        Ok(json_request_with(settings, prompt))
    }

    fn parse(&self, _input: &CompanionMessage, reply: &str) -> MediChatResult<CompanionReply> {
        let raw: RawReply = parse_reply(reply)?;
        let response = raw.response.trim().to_string();
        if response.is_empty() {
            return Err(MediChatError::ResponseParsing {
                reason: "companion reply is empty".to_string(),
            });
        }
        Ok(CompanionReply {
            response,
            mood: raw.mood.parse().unwrap_or(Mood::Neutral),
        })
    }

    fn schema(&self) -> OutputSchema {
        OutputSchema {
            schema_id: "companion-v1".to_string(),
            json_schema: json!({
                "type": "object",
                "required": ["response", "mood"]
            }),
            rules: vec![
                required("response"),
                VerificationRule::new(
                    "mood-value",
                    "mood must be one of the four labels",
                    VerificationRuleType::AllowedValues {
                        field_path: "mood".to_string(),
                        allowed: Mood::ALL.iter().map(|m| json!(m.to_string())).collect(),
                    },
                ),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> FlowSettings {
        FlowSettings {
            model: "gemini-2.0-flash".to_string(),
            temperature: None,
            max_output_tokens: None,
        }
    }

    fn message(prompt: &str, history: &[&str]) -> CompanionMessage {
        CompanionMessage {
            prompt: prompt.to_string(),
            history: history.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn history_is_truncated_to_the_most_recent() {
        let flow = MentalHealthCompanion::new(2);
        let req = flow
            .request(&message("still tired", &["first", "second", "third"]), &settings())
            .unwrap();

        assert!(!req.prompt.contains("- first"));
        assert!(req.prompt.contains("- second\n- third\n"));
        assert!(req.prompt.contains("User's latest message: \"still tired\""));
    }

    #[test]
    fn empty_history_is_stated() {
        let req = MentalHealthCompanion::new(20)
            .request(&message("hello", &[]), &settings())
            .unwrap();
        assert!(req.prompt.contains("(no earlier messages)"));
    }

    #[test]
    fn mood_is_parsed_case_insensitively() {
        let flow = MentalHealthCompanion::new(20);
        let out = flow
            .parse(
                &message("I got the job!", &[]),
                r#"{"response": "That's wonderful news! How are you celebrating?", "mood": "positive"}"#,
            )
            .unwrap();
        assert_eq!(out.mood, Mood::Positive);
    }

    #[test]
    fn unknown_mood_is_neutral() {
        let flow = MentalHealthCompanion::new(20);
        let out = flow
            .parse(&message("ok", &[]), r#"{"response": "I'm here for you.", "mood": "meh"}"#)
            .unwrap();
        assert_eq!(out.mood, Mood::Neutral);
    }

    #[test]
    fn blank_prompt_and_blank_reply() {
        let flow = MentalHealthCompanion::new(20);
        assert!(flow.validate(&message(" ", &["earlier"])).is_err());
        assert!(flow
            .parse(&message("hi", &[]), r#"{"response": "  ", "mood": "Neutral"}"#)
            .unwrap_err()
            .is_model_failure());
    }

    #[test]
    fn mood_serializes_as_label() {
        assert_eq!(serde_json::to_value(Mood::Mixed).unwrap(), json!("Mixed"));
    }
}
