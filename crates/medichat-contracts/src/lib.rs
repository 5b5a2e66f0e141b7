//! # medichat-contracts
//!
//! Shared types, schemas, and error contracts for MediChat.
//!
//! All crates in the workspace import from here. No business logic lives in
//! this crate, only data definitions and error types.

pub mod error;
pub mod flow;
pub mod outcome;
pub mod verify;

#[cfg(test)]
mod tests {
    use super::*;
    use error::MediChatError;
    use flow::{GenerateRequest, InvocationId};
    use outcome::{ActionResponse, ReplySource};
    use verify::{VerificationFailure, VerificationReport};

    // ── InvocationId ─────────────────────────────────────────────────────────

    #[test]
    fn invocation_id_new_produces_unique_values() {
        let unique: std::collections::HashSet<String> =
            (0..100).map(|_| InvocationId::new().0.to_string()).collect();
        assert_eq!(unique.len(), 100);
    }

    // ── GenerateRequest ──────────────────────────────────────────────────────

    #[test]
    fn text_request_has_no_overrides() {
        let req = GenerateRequest::text("gemini-2.0-flash", "hello");
        assert_eq!(req.model, "gemini-2.0-flash");
        assert_eq!(req.prompt, "hello");
        assert!(req.system.is_none());
        assert!(req.images.is_empty());
        assert!(!req.json_output);
    }

    #[test]
    fn generate_request_missing_images_defaults_to_empty() {
        let json = r#"{
            "model": "m", "prompt": "p", "system": null,
            "temperature": 0.3, "max_output_tokens": 10
        }"#;
        let req: GenerateRequest = serde_json::from_str(json).unwrap();
        assert!(req.images.is_empty());
        assert_eq!(req.max_output_tokens, Some(10));
    }

    // ── ActionResponse ───────────────────────────────────────────────────────

    #[test]
    fn action_response_ok_serializes_without_error_key() {
        let resp = ActionResponse::ok(serde_json::json!({ "usage": "pain" }));
        let value = serde_json::to_value(&resp).unwrap();
        assert_eq!(value["success"], true);
        assert_eq!(value["data"]["usage"], "pain");
        assert!(value.get("error").is_none());
    }

    #[test]
    fn action_response_err_serializes_without_data_key() {
        let resp: ActionResponse<()> = ActionResponse::err("try again later");
        let value = serde_json::to_value(&resp).unwrap();
        assert_eq!(value["success"], false);
        assert_eq!(value["error"], "try again later");
        assert!(value.get("data").is_none());
    }

    #[test]
    fn reply_source_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&ReplySource::Fallback).unwrap(),
            "\"fallback\""
        );
    }

    // ── VerificationReport ───────────────────────────────────────────────────

    #[test]
    fn report_summary_joins_failures() {
        let report = VerificationReport {
            passed: false,
            failures: vec![
                VerificationFailure {
                    rule_id: "req-disclaimer".to_string(),
                    message: "missing".to_string(),
                },
                VerificationFailure {
                    rule_id: "mood".to_string(),
                    message: "not allowed".to_string(),
                },
            ],
        };
        assert_eq!(report.summary(), "[req-disclaimer] missing; [mood] not allowed");
    }

    // ── MediChatError ────────────────────────────────────────────────────────

    #[test]
    fn invalid_input_displays_reason_verbatim() {
        let err = MediChatError::invalid(
            "symptoms",
            "Please describe your symptoms in at least 10 characters.",
        );
        assert_eq!(
            err.to_string(),
            "Please describe your symptoms in at least 10 characters."
        );
    }

    #[test]
    fn model_http_display_includes_status() {
        let err = MediChatError::ModelHttp {
            status: 429,
            body: "quota exceeded".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("429"));
        assert!(msg.contains("quota exceeded"));
    }

    #[test]
    fn model_failure_classification() {
        assert!(MediChatError::ModelRequest { reason: "timeout".into() }.is_model_failure());
        assert!(MediChatError::ModelHttp { status: 500, body: String::new() }.is_model_failure());
        assert!(MediChatError::ResponseParsing { reason: "no json".into() }.is_model_failure());
        assert!(!MediChatError::invalid("topic", "too short").is_model_failure());
        assert!(!MediChatError::VerificationFailed { reason: "x".into() }.is_model_failure());
    }

    #[test]
    fn not_found_display() {
        let err = MediChatError::NotFound {
            entity: "product".to_string(),
            id: "42".to_string(),
        };
        assert_eq!(err.to_string(), "product '42' not found");
    }
}
