//! Schema and rule verifier for flow outputs.
//!
//! `SchemaVerifier` runs in two phases:
//!
//! 1. **Structural**: the payload is validated against
//!    `OutputSchema::json_schema` with the `jsonschema` crate.
//! 2. **Rules**: each `VerificationRule` in `OutputSchema::rules` is
//!    evaluated in order.
//!
//! Failures from both phases are collected into one report.

use std::collections::HashMap;

use serde_json::Value;
use tracing::{debug, warn};

use medichat_contracts::{
    error::MediChatResult,
    verify::{OutputSchema, VerificationFailure, VerificationReport, VerificationRule, VerificationRuleType},
};
use medichat_core::traits::Verifier;

/// A named check over the whole payload.
///
/// Returns `Some(message)` on failure, `None` on success.
pub type CustomVerifierFn = Box<dyn Fn(&Value) -> Option<String> + Send + Sync>;

/// The MediChat output verifier.
pub struct SchemaVerifier {
    custom_rules: HashMap<String, CustomVerifierFn>,
}

impl SchemaVerifier {
    pub fn new() -> Self {
        Self {
            custom_rules: HashMap::new(),
        }
    }

    /// Register `f` under `name`, replacing any earlier function of that
    /// name. `VerificationRuleType::Custom { function_name }` looks it up.
    pub fn register_rule(&mut self, name: impl Into<String>, f: CustomVerifierFn) {
        self.custom_rules.insert(name.into(), f);
    }

    pub fn has_rule(&self, name: &str) -> bool {
        self.custom_rules.contains_key(name)
    }

    /// Evaluate one rule; `Some(message)` when it fails.
    fn check_rule(&self, payload: &Value, rule: &VerificationRule) -> Option<String> {
        match &rule.rule_type {
            VerificationRuleType::RequiredField { field_path } => resolve_path(payload, field_path)
                .is_none()
                .then(|| format!("required field '{field_path}' is missing or null")),

            VerificationRuleType::AllowedValues { field_path, allowed } => {
                match resolve_path(payload, field_path) {
                    None => Some(format!(
                        "field '{field_path}' is missing; cannot check allowed values"
                    )),
                    Some(actual) if allowed.contains(actual) => None,
                    Some(actual) => Some(format!(
                        "field '{field_path}' has value {actual}, expected one of {}",
                        render_allowed(allowed)
                    )),
                }
            }

            // Absent and non-string fields pass.
            VerificationRuleType::ForbiddenPattern { field_path, pattern } => {
                let text = resolve_path(payload, field_path)?.as_str()?;
                text.to_lowercase()
                    .contains(&pattern.to_lowercase())
                    .then(|| format!("field '{field_path}' contains forbidden text '{pattern}'"))
            }

            VerificationRuleType::NonEmptyList { field_path } => {
                match resolve_path(payload, field_path).and_then(Value::as_array) {
                    Some(items) if !items.is_empty() => None,
                    Some(_) => Some(format!("list '{field_path}' is empty")),
                    None => Some(format!("field '{field_path}' is not a list")),
                }
            }

            VerificationRuleType::Custom { function_name } => {
                match self.custom_rules.get(function_name.as_str()) {
                    Some(f) => f(payload),
                    None => Some(format!(
                        "no custom rule registered under '{function_name}'"
                    )),
                }
            }
        }
    }
}

impl Default for SchemaVerifier {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolve a dotted path such as `"analysis.0.condition"`.
///
/// Numeric segments index into arrays. `None` when any segment is missing or
/// the value is JSON `null`.
pub fn resolve_path<'v>(value: &'v Value, path: &str) -> Option<&'v Value> {
    let mut current = value;
    for segment in path.split('.') {
        let next = match current {
            Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => current.get(segment),
        };
        match next {
            Some(v) if !v.is_null() => current = v,
            _ => return None,
        }
    }
    Some(current)
}

fn render_allowed(allowed: &[Value]) -> String {
    allowed
        .iter()
        .map(Value::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

impl Verifier for SchemaVerifier {
    fn verify(&self, payload: &Value, schema: &OutputSchema) -> MediChatResult<VerificationReport> {
        let mut failures: Vec<VerificationFailure> = Vec::new();

        // ── Phase 1: JSON Schema ─────────────────────────────────────────────
        if !schema.json_schema.is_null() {
            match jsonschema::validator_for(&schema.json_schema) {
                Ok(validator) => {
                    failures.extend(validator.iter_errors(payload).map(|error| {
                        VerificationFailure {
                            rule_id: "json-schema".to_string(),
                            message: format!("at '{}': {}", error.instance_path, error),
                        }
                    }));
                }
                Err(e) => failures.push(VerificationFailure {
                    rule_id: "json-schema".to_string(),
                    message: format!("invalid JSON Schema document: {e}"),
                }),
            }
        }

        // ── Phase 2: Rules ───────────────────────────────────────────────────
        for rule in &schema.rules {
            debug!(rule_id = %rule.rule_id, description = %rule.description, "evaluating rule");
            if let Some(message) = self.check_rule(payload, rule) {
                failures.push(VerificationFailure {
                    rule_id: rule.rule_id.clone(),
                    message,
                });
            }
        }

        for failure in &failures {
            warn!(
                schema_id = %schema.schema_id,
                rule_id = %failure.rule_id,
                message = %failure.message,
                "verification failure"
            );
        }

        let passed = failures.is_empty();
        debug!(
            schema_id = %schema.schema_id,
            passed,
            failure_count = failures.len(),
            "verification complete"
        );
        Ok(VerificationReport { passed, failures })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
