//! # medichat-flows
//!
//! The eight MediChat AI features, each a [`medichat_core::traits::Flow`]:
//!
//! | Flow id | Type |
//! |---|---|
//! | `symptom-analyzer` | [`flows::symptom_analyzer::SymptomAnalyzer`] |
//! | `health-analytics` | [`flows::health_analytics::HealthAnalytics`] |
//! | `medicine-info` | [`flows::medicine_info::MedicineInfoLookup`] |
//! | `ai-doctor` | [`flows::ai_doctor::AiDoctor`] |
//! | `skin-lesion-analyzer` | [`flows::skin_lesion::SkinLesionAnalyzer`] |
//! | `prescription-generator` | [`flows::prescription::PrescriptionGenerator`] |
//! | `mental-health-companion` | [`flows::mental_health::MentalHealthCompanion`] |
//! | `medical-summarizer` | [`flows::medical_summarizer::MedicalSummarizer`] |
//!
//! [`assistant::HealthAssistant`] wraps a `FlowRunner` and exposes one
//! method per feature, returning the `ActionResponse` envelope.
//!
//! Replies are parsed in one of two ways: sectioned plain text sliced by
//! header ([`sections`]), or a JSON object pulled out of the reply
//! ([`json`]).

pub mod assistant;
pub mod flows;
pub mod json;
pub mod rules;
pub mod sections;

pub use assistant::HealthAssistant;
pub use rules::default_verifier;
