//! Short topic summaries with links to reputable sources.

use serde::{Deserialize, Serialize};
use serde_json::json;

use medichat_config::FlowSettings;
use medichat_contracts::{
    error::{MediChatError, MediChatResult},
    flow::{FlowId, GenerateRequest},
    verify::OutputSchema,
};
use medichat_core::traits::Flow;

use crate::flows::json_request_with;
use crate::json::parse_reply;
use crate::rules::{custom, required, SOURCE_LINKS_RULE};

pub const FLOW_ID: &str = "medical-summarizer";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicRequest {
    pub topic: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicSummary {
    pub summary: String,
    #[serde(default)]
    pub source_links: Vec<String>,
}

pub struct MedicalSummarizer;

impl Flow for MedicalSummarizer {
    type Input = TopicRequest;
    type Output = TopicSummary;

    fn id(&self) -> FlowId {
        FlowId::new(FLOW_ID)
    }

    fn validate(&self, input: &TopicRequest) -> MediChatResult<()> {
        if input.topic.trim().chars().count() < 3 {
            return Err(MediChatError::invalid(
                "topic",
                "Please enter a topic with at least 3 characters.",
            ));
        }
        Ok(())
    }

    fn request(&self, input: &TopicRequest, settings: &FlowSettings) -> MediChatResult<GenerateRequest> {
        let prompt = format!(
            "Summarize the following medical topic for a general audience in one or two short \
paragraphs, and list links to reputable source documents (for example WHO, CDC, NIH, MedlinePlus, \
NHS, Mayo Clinic).

Topic: {topic}

Reply with a single JSON object: {{\"summary\": string, \"source_links\": [string]}}. Every link \
must be a full https:// URL.",
            topic = input.topic.trim()
        );
        Ok(json_request_with(settings, prompt))
    }

    fn parse(&self, _input: &TopicRequest, reply: &str) -> MediChatResult<TopicSummary> {
        let mut summary: TopicSummary = parse_reply(reply)?;
        summary.summary = summary.summary.trim().to_string();
        summary.source_links = summary
            .source_links
            .into_iter()
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty())
            .collect();
        Ok(summary)
    }

    fn schema(&self) -> OutputSchema {
        OutputSchema {
            schema_id: "medical-summary-v1".to_string(),
            json_schema: json!({
                "type": "object",
                "required": ["summary", "source_links"],
                "properties": {
                    "summary": { "type": "string", "minLength": 1 },
                    "source_links": { "type": "array", "items": { "type": "string" } }
                }
            }),
            rules: vec![
                required("summary"),
                custom(SOURCE_LINKS_RULE, "source links must be http(s) URLs"),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn topic(t: &str) -> TopicRequest {
        TopicRequest { topic: t.to_string() }
    }

    #[test]
    fn short_topic_is_rejected() {
        let err = MedicalSummarizer.validate(&topic(" fl ")).unwrap_err();
        assert_eq!(err.to_string(), "Please enter a topic with at least 3 characters.");
        assert!(MedicalSummarizer.validate(&topic("flu")).is_ok());
    }

    #[test]
    fn links_are_trimmed_and_blanks_dropped() {
        let reply = r#"{"summary": " Asthma is a chronic lung condition. ",
                        "source_links": [" https://www.who.int/news-room/fact-sheets/detail/asthma ", ""]}"#;
        let out = MedicalSummarizer.parse(&topic("asthma"), reply).unwrap();

        assert_eq!(out.summary, "Asthma is a chronic lung condition.");
        assert_eq!(
            out.source_links,
            vec!["https://www.who.int/news-room/fact-sheets/detail/asthma"]
        );
    }

    #[test]
    fn links_default_to_empty() {
        let out = MedicalSummarizer
            .parse(&topic("asthma"), r#"{"summary": "Asthma narrows the airways."}"#)
            .unwrap();
        assert!(out.source_links.is_empty());
    }
}
