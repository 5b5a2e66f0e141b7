//! The action layer: one call per feature, one envelope per call.
//!
//! Validation messages reach the caller verbatim. Every other failure is
//! logged with its cause and replaced by a fixed, feature-specific message,
//! so provider errors and parse details never leak to the user.

use tracing::error;

use medichat_config::MediChatConfig;
use medichat_contracts::{
    error::{MediChatError, MediChatResult},
    outcome::{ActionResponse, FlowOutcome},
};
use medichat_core::{traits::LlmClient, FlowRunner};

use crate::flows::{
    ai_doctor::{AiDoctor, DoctorQuestion, DoctorReply},
    health_analytics::{HealthAnalytics, HealthAnalyticsInput, HealthAnalyticsReport},
    medical_summarizer::{MedicalSummarizer, TopicRequest, TopicSummary},
    medicine_info::{MedicineInfo, MedicineInfoLookup, MedicineQuery},
    mental_health::{CompanionMessage, CompanionReply, MentalHealthCompanion},
    prescription::{PatientRequest, Prescription, PrescriptionGenerator},
    skin_lesion::{SkinLesionAnalyzer, SkinLesionAssessment, SkinPhoto},
    symptom_analyzer::{SymptomAnalysis, SymptomAnalyzer, SymptomInput},
};
use crate::rules::default_verifier;

/// Entry point for every AI feature.
pub struct HealthAssistant {
    runner: FlowRunner,
    companion: MentalHealthCompanion,
}

impl HealthAssistant {
    pub fn new(runner: FlowRunner) -> Self {
        let companion = MentalHealthCompanion::new(runner.config().limits.companion_history);
        Self { runner, companion }
    }

    /// Build an assistant around `client` with the default verifier.
    pub fn with_client(client: Box<dyn LlmClient>, config: MediChatConfig) -> Self {
        Self::new(FlowRunner::new(client, Box::new(default_verifier()), config))
    }

    pub fn analyze_symptoms(&self, symptoms: &str) -> ActionResponse<SymptomAnalysis> {
        let input = SymptomInput {
            symptoms: symptoms.to_string(),
        };
        respond(
            "symptom-analyzer",
            self.runner.run(&SymptomAnalyzer, input),
            "An unexpected error occurred while analyzing symptoms. Please try again later.",
        )
    }

    pub fn health_analytics(&self, input: HealthAnalyticsInput) -> ActionResponse<HealthAnalyticsReport> {
        respond(
            "health-analytics",
            self.runner.run(&HealthAnalytics, input),
            "Unable to complete health analysis. Please try again later.",
        )
    }

    pub fn medicine_info(&self, medicine_name: &str) -> ActionResponse<MedicineInfo> {
        let input = MedicineQuery {
            medicine_name: medicine_name.to_string(),
        };
        respond(
            "medicine-info",
            self.runner.run(&MedicineInfoLookup, input),
            "Failed to get information for the specified medicine. Please try again later.",
        )
    }

    pub fn talk_to_doctor(&self, prompt: &str) -> ActionResponse<DoctorReply> {
        let input = DoctorQuestion {
            prompt: prompt.to_string(),
        };
        respond(
            "ai-doctor",
            self.runner.run(&AiDoctor, input),
            "The AI doctor is unavailable right now. Please try again later.",
        )
    }

    pub fn analyze_skin_lesion(&self, photo_data_uri: &str) -> ActionResponse<SkinLesionAssessment> {
        let input = SkinPhoto {
            photo_data_uri: photo_data_uri.to_string(),
        };
        respond(
            "skin-lesion-analyzer",
            self.runner.run(&SkinLesionAnalyzer, input),
            "An unexpected error occurred while analyzing the image. Please try again later.",
        )
    }

    pub fn generate_prescription(&self, input: PatientRequest) -> ActionResponse<Prescription> {
        respond(
            "prescription-generator",
            self.runner.run(&PrescriptionGenerator, input),
            "An unexpected error occurred while generating the prescription. Please try again later.",
        )
    }

    pub fn talk_to_companion(&self, prompt: &str, history: Vec<String>) -> ActionResponse<CompanionReply> {
        let input = CompanionMessage {
            prompt: prompt.to_string(),
            history,
        };
        respond(
            "mental-health-companion",
            self.runner.run(&self.companion, input),
            "The companion could not respond right now. Please try again in a moment.",
        )
    }

    pub fn summarize_topic(&self, topic: &str) -> ActionResponse<TopicSummary> {
        let input = TopicRequest {
            topic: topic.to_string(),
        };
        respond(
            "medical-summarizer",
            self.runner.run(&MedicalSummarizer, input),
            "An unexpected error occurred while summarizing the topic. Please try again later.",
        )
    }
}

fn respond<T>(
    action: &str,
    result: MediChatResult<FlowOutcome<T>>,
    failure_message: &str,
) -> ActionResponse<T> {
    match result {
        Ok(outcome) => ActionResponse::ok(outcome.output),
        Err(MediChatError::InvalidInput { reason, .. }) => ActionResponse::err(reason),
        Err(err) => {
            error!(action, error = %err, "action failed");
            ActionResponse::err(failure_message)
        }
    }
}
