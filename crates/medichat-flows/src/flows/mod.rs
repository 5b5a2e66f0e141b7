//! One module per AI feature.

pub mod ai_doctor;
pub mod health_analytics;
pub mod medical_summarizer;
pub mod medicine_info;
pub mod mental_health;
pub mod prescription;
pub mod skin_lesion;
pub mod symptom_analyzer;

use medichat_config::FlowSettings;
use medichat_contracts::flow::GenerateRequest;

/// A request carrying the resolved model settings.
pub(crate) fn request_with(settings: &FlowSettings, prompt: String) -> GenerateRequest {
    GenerateRequest {
        temperature: settings.temperature,
        max_output_tokens: settings.max_output_tokens,
        ..GenerateRequest::text(settings.model.clone(), prompt)
    }
}

/// The same request in JSON-output mode.
pub(crate) fn json_request_with(settings: &FlowSettings, prompt: String) -> GenerateRequest {
    GenerateRequest {
        json_output: true,
        ..request_with(settings, prompt)
    }
}
