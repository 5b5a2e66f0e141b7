//! Output verification schema and report types.
//!
//! Before a parsed flow output is handed back to a caller, the verifier runs
//! it against an `OutputSchema`. Only a passing `VerificationReport` lets the
//! run complete.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Everything the verifier checks a flow output against.
///
/// Each flow declares its own schema. It combines a JSON Schema document with
/// rules that JSON Schema cannot express well (disclaimer wording, banned
/// phrases).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputSchema {
    /// Unique identifier for this schema (e.g. "medicine-info-v1").
    pub schema_id: String,
    /// A JSON Schema document used for structural validation. `Null` skips it.
    pub json_schema: Value,
    /// Additional rules evaluated after structural validation.
    pub rules: Vec<VerificationRule>,
}

/// A single verification rule applied to a flow output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationRule {
    /// Unique identifier for this rule, referenced in failure reports.
    pub rule_id: String,
    /// Human-readable description for logs.
    pub description: String,
    pub rule_type: VerificationRuleType,
}

impl VerificationRule {
    pub fn new(
        rule_id: impl Into<String>,
        description: impl Into<String>,
        rule_type: VerificationRuleType,
    ) -> Self {
        Self {
            rule_id: rule_id.into(),
            description: description.into(),
            rule_type,
        }
    }
}

/// The kinds of checks the verifier supports.
///
/// `Custom` lets the flows crate hook in named functions without the
/// verifier knowing anything about medicine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum VerificationRuleType {
    /// The field at `field_path` must be present and non-null.
    RequiredField {
        /// Dotted path, e.g. "analysis.0.condition".
        field_path: String,
    },

    /// The field at `field_path` must equal one of `allowed`.
    AllowedValues {
        field_path: String,
        allowed: Vec<Value>,
    },

    /// The string at `field_path` must not contain `pattern`
    /// (case-insensitive substring).
    ForbiddenPattern { field_path: String, pattern: String },

    /// The field at `field_path` must be an array with at least one element.
    NonEmptyList { field_path: String },

    /// Delegate to a named function registered with the verifier.
    Custom { function_name: String },
}

/// The result of running an `OutputSchema` against an output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationReport {
    /// True only if all rules passed.
    pub passed: bool,
    /// Every failure collected during the run. Empty on pass.
    pub failures: Vec<VerificationFailure>,
}

impl VerificationReport {
    /// Render failures as `[rule_id] message` joined by `; `.
    pub fn summary(&self) -> String {
        self.failures
            .iter()
            .map(|f| format!("[{}] {}", f.rule_id, f.message))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// A single rule failure within a `VerificationReport`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationFailure {
    pub rule_id: String,
    pub message: String,
}
