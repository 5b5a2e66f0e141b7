//! Symptom analysis from a free-text description.
//!
//! The model answers in three sections. Conditions are the list items of the
//! first section; confidence and severity are read from each item and its
//! labelled sub-lines. A reply with no recognisable condition is a parse
//! failure, which the runner answers with [`SymptomAnalyzer::fallback`].

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
use crate::rules::{non_empty, required};
use crate::sections::{clean_line, first_word_of, labelled, section, section_lines};

pub const FLOW_ID: &str = "symptom-analyzer";
const MIN_SYMPTOM_CHARS: usize = 10;
const MAX_CONDITIONS: usize = 3;

const CONDITIONS: &str = "POTENTIAL CONDITIONS:";
const URGENCY: &str = "URGENCY ASSESSMENT:";
const RECOMMENDATIONS: &str = "RECOMMENDATIONS:";
const HEADERS: &[&str] = &[CONDITIONS, URGENCY, RECOMMENDATIONS];

const DEFAULT_NEXT_STEPS: &str = "Monitor symptoms and consult a doctor if they worsen";
const DEFAULT_CONFIDENCE: f32 = 0.5;

static PERCENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{1,3}(?:\.\d+)?)\s*%").expect("percent regex"));

/// Sub-line labels that belong to the condition above them.
const FIELD_LABELS: &[&str] = &["confidence", "confidence level", "severity", "description", "next steps"];

// ── Types ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymptomInput {
    pub symptoms: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Mild,
    Moderate,
    Severe,
    Critical,
}

impl Severity {
    const NAMES: [&'static str; 4] = ["Mild", "Moderate", "Severe", "Critical"];

    fn from_name(name: &str) -> Option<Self> {
        match name {
            "Mild" => Some(Self::Mild),
            "Moderate" => Some(Self::Moderate),
            "Severe" => Some(Self::Severe),
            "Critical" => Some(Self::Critical),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Urgency {
    Low,
    Medium,
    High,
    Immediate,
}

impl Urgency {
    const NAMES: [&'static str; 4] = ["Immediate", "High", "Medium", "Low"];

    fn from_name(name: &str) -> Option<Self> {
        match name {
            "Immediate" => Some(Self::Immediate),
            "High" => Some(Self::High),
            "Medium" => Some(Self::Medium),
            "Low" => Some(Self::Low),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionAnalysis {
    pub condition: String,
    pub description: String,
    pub severity: Severity,
    /// Model-reported likelihood in `0.0..=1.0`.
    pub confidence: f32,
    pub next_steps: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymptomAnalysis {
    pub analysis: Vec<ConditionAnalysis>,
    pub urgency: Urgency,
    pub risk_factors: Vec<String>,
    pub recommendations: Vec<String>,
}

// ── Flow ─────────────────────────────────────────────────────────────────────

pub struct SymptomAnalyzer;

impl Flow for SymptomAnalyzer {
    type Input = SymptomInput;
    type Output = SymptomAnalysis;

    fn id(&self) -> FlowId {
        FlowId::new(FLOW_ID)
    }

    fn validate(&self, input: &SymptomInput) -> MediChatResult<()> {
        if input.symptoms.trim().chars().count() < MIN_SYMPTOM_CHARS {
            return Err(MediChatError::invalid(
                "symptoms",
                "Please describe your symptoms in at least 10 characters.",
            ));
        }
        Ok(())
    }

    fn request(&self, input: &SymptomInput, settings: &FlowSettings) -> MediChatResult<GenerateRequest> {
        Ok(request_with(settings, render_prompt(input.symptoms.trim())))
    }

    fn parse(&self, _input: &SymptomInput, reply: &str) -> MediChatResult<SymptomAnalysis> {
        let analysis = parse_conditions(reply);
        if analysis.is_empty() {
            return Err(MediChatError::ResponseParsing {
                reason: "reply lists no potential conditions".to_string(),
            });
        }

        let urgency_lines = section_lines(reply, URGENCY, HEADERS);
        let urgency = urgency_lines
            .first()
            .and_then(|line| first_word_of(line, &Urgency::NAMES))
            .or_else(|| section(reply, URGENCY, HEADERS).and_then(|s| first_word_of(s, &Urgency::NAMES)))
            .and_then(Urgency::from_name)
            .unwrap_or(Urgency::Low);

        let mut risk_factors: Vec<String> = urgency_lines.into_iter().skip(1).collect();
        if risk_factors.is_empty() {
            risk_factors = vec![
                "Age-related factors".to_string(),
                "Lifestyle considerations".to_string(),
            ];
        }

        Ok(SymptomAnalysis {
            analysis,
            urgency,
            risk_factors,
            recommendations: section_lines(reply, RECOMMENDATIONS, HEADERS),
        })
    }

    fn fallback(&self, input: &SymptomInput) -> Option<SymptomAnalysis> {
        Some(SymptomAnalysis {
            analysis: vec![ConditionAnalysis {
                condition: "Symptom evaluation required".to_string(),
                description: format!(
                    "Based on your symptoms: \"{}\", a professional medical evaluation is recommended.",
                    input.symptoms.trim()
                ),
                severity: Severity::Moderate,
                confidence: 0.6,
                next_steps: "Schedule appointment with healthcare provider".to_string(),
            }],
            urgency: Urgency::Medium,
            risk_factors: vec![
                "Self-reported symptoms".to_string(),
                "Requires professional assessment".to_string(),
            ],
            recommendations: vec![
                "Monitor symptoms and note any changes".to_string(),
                "Keep a symptom diary".to_string(),
                "Schedule appointment with doctor".to_string(),
                "Seek immediate care if symptoms worsen".to_string(),
            ],
        })
    }

    fn schema(&self) -> OutputSchema {
        OutputSchema {
            schema_id: "symptom-analysis-v1".to_string(),
            json_schema: json!({
                "type": "object",
                "required": ["analysis", "urgency", "risk_factors", "recommendations"],
                "properties": {
                    "analysis": {
                        "type": "array",
                        "items": {
                            "type": "object",
                            "required": ["condition", "severity", "confidence"],
                            "properties": {
                                "confidence": { "type": "number", "minimum": 0, "maximum": 1 }
                            }
                        }
                    },
                    "risk_factors": { "type": "array", "items": { "type": "string" } },
                    "recommendations": { "type": "array", "items": { "type": "string" } }
                }
            }),
            rules: vec![
                non_empty("analysis"),
                required("analysis.0.condition"),
                VerificationRule::new(
                    "urgency-level",
                    "urgency must be a known level",
                    VerificationRuleType::AllowedValues {
                        field_path: "urgency".to_string(),
                        allowed: Urgency::NAMES.iter().map(|n| json!(n)).collect(),
                    },
                ),
            ],
        }
    }
}

fn render_prompt(symptoms: &str) -> String {
    format!(
        "You are an advanced AI medical expert specializing in symptom analysis.

SYMPTOMS: {symptoms}

Please provide a comprehensive analysis using exactly these sections:

1. POTENTIAL CONDITIONS:
   - List 2-3 most likely conditions, one per line
   - Confidence level for each (0-100%)
   - Severity assessment (Mild/Moderate/Severe/Critical)
   - Detailed description of each condition

2. URGENCY ASSESSMENT:
   - Overall urgency level (Low/Medium/High/Immediate) on the first line
   - Risk factors to consider
   - Emergency warning signs

3. RECOMMENDATIONS:
   - Immediate actions needed
   - When to seek medical attention
   - Preventive measures

Use evidence-based medicine and consider symptom patterns, age and \
gender-specific factors, red flag symptoms, and common versus rare conditions.

IMPORTANT: Start with a clear disclaimer that this is not a medical diagnosis."
    )
}

// ── Condition parsing ────────────────────────────────────────────────────────

/// A condition headline and the labelled lines that follow it.
struct Draft {
    headline: String,
    fields: Vec<String>,
}

fn is_field_line(line: &str) -> bool {
    line.split_once(':').is_some_and(|(head, _)| {
        let head = head.trim().to_ascii_lowercase();
        FIELD_LABELS.contains(&head.as_str())
    })
}

fn parse_conditions(reply: &str) -> Vec<ConditionAnalysis> {
    let Some(body) = section(reply, CONDITIONS, HEADERS) else {
        return Vec::new();
    };

    let mut drafts: Vec<Draft> = Vec::new();
    for line in body.lines().filter_map(clean_line) {
        if is_field_line(&line) {
            if let Some(draft) = drafts.last_mut() {
                draft.fields.push(line);
            }
        } else if !line.ends_with(':') {
            // Lines ending in a colon introduce the list rather than name a
            // condition.
            drafts.push(Draft {
                headline: line,
                fields: Vec::new(),
            });
        }
    }

    drafts.iter().take(MAX_CONDITIONS).map(build_condition).collect()
}

fn build_condition(draft: &Draft) -> ConditionAnalysis {
    let cut = draft
        .headline
        .find([':', '(', '–'])
        .or_else(|| draft.headline.find(" - "))
        .unwrap_or(draft.headline.len());
    let condition = draft.headline[..cut].trim().to_string();
    let remainder = draft.headline[cut..]
        .trim_start_matches([':', '-', '–', ' '])
        .trim();

    let all_text = std::iter::once(draft.headline.as_str())
        .chain(draft.fields.iter().map(String::as_str))
        .collect::<Vec<_>>()
        .join("\n");

    let confidence = PERCENT
        .captures(&all_text)
        .and_then(|c| c[1].parse::<f32>().ok())
        .map(|pct| ((pct / 100.0).clamp(0.0, 1.0) * 100.0).round() / 100.0)
        .unwrap_or(DEFAULT_CONFIDENCE);

    let severity = first_word_of(&all_text, &Severity::NAMES)
        .and_then(Severity::from_name)
        .unwrap_or(Severity::Moderate);

    let description = labelled(&draft.fields, "description")
        .map(str::to_string)
        .unwrap_or_else(|| remainder.to_string());

    let next_steps = labelled(&draft.fields, "next steps")
        .unwrap_or(DEFAULT_NEXT_STEPS)
        .to_string();

    ConditionAnalysis {
        condition,
        description,
        severity,
        confidence,
        next_steps,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const REPLY: &str = "**Disclaimer:** This is not a medical diagnosis.

**1. POTENTIAL CONDITIONS:**

1. **Tension-type headache** (Confidence: 65%, Severity: Mild)
   - Description: Muscle tightness in the head and neck.
   - Next steps: Rest, hydrate, and try an over-the-counter pain reliever.
2. **Migraine**: recurrent throbbing headache. Confidence 25%. Severity: Moderate
3. **Meningitis** (Confidence: 5%)
   - Severity: Critical
   - Description: Inflammation of the membranes around the brain.

**2. URGENCY ASSESSMENT:**

- Overall urgency level: Medium
- Risk factors: recent sleep loss
- Warning signs: stiff neck with fever needs immediate care

**3. RECOMMENDATIONS:**

- Rest in a quiet, dark room
- See a doctor if headaches persist beyond a week
";

    fn input(symptoms: &str) -> SymptomInput {
        SymptomInput {
            symptoms: symptoms.to_string(),
        }
    }

    #[test]
    fn short_symptoms_are_rejected() {
        let err = SymptomAnalyzer.validate(&input("  headache ")).unwrap_err();
        assert_eq!(err.to_string(), "Please describe your symptoms in at least 10 characters.");
        assert!(SymptomAnalyzer.validate(&input("headache and fever")).is_ok());
    }

    #[test]
    fn request_uses_settings_and_symptoms() {
        let settings = FlowSettings {
            model: "gemini-1.5-flash".to_string(),
            temperature: Some(0.3),
            max_output_tokens: Some(1500),
        };
        let req = SymptomAnalyzer.request(&input("  sore throat for 3 days "), &settings).unwrap();

        assert_eq!(req.model, "gemini-1.5-flash");
        assert_eq!(req.temperature, Some(0.3));
        assert_eq!(req.max_output_tokens, Some(1500));
        assert!(req.prompt.contains("SYMPTOMS: sore throat for 3 days\n"));
        assert!(!req.json_output);
    }

    #[test]
    fn conditions_are_parsed_with_confidence_and_severity() {
        let out = SymptomAnalyzer.parse(&input("headache"), REPLY).unwrap();

        assert_eq!(out.analysis.len(), 3);

        let first = &out.analysis[0];
        assert_eq!(first.condition, "Tension-type headache");
        assert_eq!(first.confidence, 0.65);
        assert_eq!(first.severity, Severity::Mild);
        assert_eq!(first.description, "Muscle tightness in the head and neck.");
        assert!(first.next_steps.starts_with("Rest, hydrate"));

        let second = &out.analysis[1];
        assert_eq!(second.condition, "Migraine");
        assert_eq!(second.confidence, 0.25);
        assert_eq!(second.severity, Severity::Moderate);
        assert!(second.description.starts_with("recurrent throbbing"));
        assert_eq!(second.next_steps, DEFAULT_NEXT_STEPS);

        let third = &out.analysis[2];
        assert_eq!(third.severity, Severity::Critical);
        assert_eq!(third.confidence, 0.05);
    }

    #[test]
    fn urgency_risk_factors_and_recommendations() {
        let out = SymptomAnalyzer.parse(&input("headache"), REPLY).unwrap();

        // "immediate" appears later in the section but the first line wins.
        assert_eq!(out.urgency, Urgency::Medium);
        assert_eq!(out.risk_factors.len(), 2);
        assert_eq!(out.risk_factors[0], "Risk factors: recent sleep loss");
        assert_eq!(
            out.recommendations,
            vec![
                "Rest in a quiet, dark room".to_string(),
                "See a doctor if headaches persist beyond a week".to_string()
            ]
        );
    }

    #[test]
    fn missing_urgency_defaults_to_low() {
        let reply = "POTENTIAL CONDITIONS:\n- Common cold (80%)\n";
        let out = SymptomAnalyzer.parse(&input("runny nose"), reply).unwrap();

        assert_eq!(out.urgency, Urgency::Low);
        assert_eq!(out.analysis[0].condition, "Common cold");
        assert_eq!(out.risk_factors, vec!["Age-related factors", "Lifestyle considerations"]);
        assert!(out.recommendations.is_empty());
    }

    #[test]
    fn reply_without_conditions_is_parse_error() {
        let err = SymptomAnalyzer
            .parse(&input("headache"), "I'm sorry, I can't help with that.")
            .unwrap_err();
        assert!(err.is_model_failure());
    }

    #[test]
    fn fallback_quotes_the_symptoms() {
        let out = SymptomAnalyzer.fallback(&input(" dizzy spells ")).unwrap();

        assert_eq!(out.urgency, Urgency::Medium);
        assert_eq!(out.analysis[0].condition, "Symptom evaluation required");
        assert!(out.analysis[0].description.contains("\"dizzy spells\""));
        assert_eq!(out.recommendations.len(), 4);
    }

    #[test]
    fn at_most_three_conditions() {
        let reply = "POTENTIAL CONDITIONS:\n- A\n- B\n- C\n- D\nURGENCY ASSESSMENT: High";
        let out = SymptomAnalyzer.parse(&input("many symptoms"), reply).unwrap();
        assert_eq!(out.analysis.len(), 3);
        assert_eq!(out.urgency, Urgency::High);
    }
}
