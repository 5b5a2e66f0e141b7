//! Verification rules shared by the flows.

use serde_json::Value;

use medichat_contracts::verify::{VerificationRule, VerificationRuleType};
use medichat_verify::SchemaVerifier;

/// Custom rule: `disclaimer` must point the reader to a professional.
pub const PROFESSIONAL_CARE_RULE: &str = "professional-care-disclaimer";

/// Custom rule: every entry of `source_links` is an http(s) URL.
pub const SOURCE_LINKS_RULE: &str = "http-source-links";

/// Used when a JSON reply leaves the disclaimer empty.
pub const STANDARD_DISCLAIMER: &str = "This information is for educational purposes only and \
    is not a substitute for professional medical advice. Always consult a healthcare provider \
    for any health concerns or before taking any medication.";

const PROFESSIONAL_TERMS: &[&str] = &["doctor", "physician", "healthcare provider", "professional"];

/// A `SchemaVerifier` with every custom rule the flows reference.
pub fn default_verifier() -> SchemaVerifier {
    let mut verifier = SchemaVerifier::new();
    verifier.register_rule(PROFESSIONAL_CARE_RULE, Box::new(check_professional_care));
    verifier.register_rule(SOURCE_LINKS_RULE, Box::new(check_source_links));
    verifier
}

fn check_professional_care(payload: &Value) -> Option<String> {
    let Some(disclaimer) = payload.get("disclaimer").and_then(Value::as_str) else {
        return Some("output has no disclaimer".to_string());
    };
    let lowered = disclaimer.to_lowercase();
    if PROFESSIONAL_TERMS.iter().any(|t| lowered.contains(t)) {
        None
    } else {
        Some("disclaimer does not refer the reader to a medical professional".to_string())
    }
}

fn check_source_links(payload: &Value) -> Option<String> {
    let links = payload.get("source_links").and_then(Value::as_array)?;
    let bad: Vec<String> = links
        .iter()
        .filter(|link| {
            !link
                .as_str()
                .is_some_and(|s| s.starts_with("https://") || s.starts_with("http://"))
        })
        .map(Value::to_string)
        .collect();
    (!bad.is_empty()).then(|| format!("source links are not http(s) URLs: {}", bad.join(", ")))
}

// ── Rule builders ────────────────────────────────────────────────────────────

pub(crate) fn required(field_path: &str) -> VerificationRule {
    VerificationRule::new(
        format!("req-{}", field_path.replace('.', "-")),
        format!("{field_path} must be present"),
        VerificationRuleType::RequiredField {
            field_path: field_path.to_string(),
        },
    )
}

pub(crate) fn non_empty(field_path: &str) -> VerificationRule {
    VerificationRule::new(
        format!("non-empty-{}", field_path.replace('.', "-")),
        format!("{field_path} must list at least one item"),
        VerificationRuleType::NonEmptyList {
            field_path: field_path.to_string(),
        },
    )
}

pub(crate) fn custom(function_name: &str, description: &str) -> VerificationRule {
    VerificationRule::new(
        function_name,
        description,
        VerificationRuleType::Custom {
            function_name: function_name.to_string(),
        },
    )
}
