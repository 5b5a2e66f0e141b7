//! AI-generated sample prescriptions.
//!
//! The model supplies the diagnosis, medicines, precautions and disclaimer.
//! Patient details and the date always come from the request, never from
//! the reply.

use std::fmt;
use std::str::FromStr;

use chrono::{Local, NaiveDate};
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
use crate::rules::{custom, non_empty, required, PROFESSIONAL_CARE_RULE};

pub const FLOW_ID: &str = "prescription-generator";
const MAX_AGE: u32 = 130;

const DEFAULT_DISCLAIMER: &str = "This is an AI-generated sample, not a real medical \
prescription. You must consult a qualified healthcare professional before taking any \
medication or making any health decisions.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Male => "Male",
            Self::Female => "Female",
            Self::Other => "Other",
        })
    }
}

impl FromStr for Gender {
    type Err = MediChatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "male" => Ok(Self::Male),
            "female" => Ok(Self::Female),
            "other" => Ok(Self::Other),
            _ => Err(MediChatError::invalid("gender", "Gender must be Male, Female, or Other.")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientRequest {
    pub name: String,
    pub age: u32,
    pub gender: Gender,
    pub symptoms: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrescribedMedicine {
    pub name: String,
    pub dosage: String,
    pub frequency: String,
    pub duration: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prescription {
    pub patient_name: String,
    pub age: u32,
    pub gender: Gender,
    /// `Month Day, Year`, the day the prescription was generated.
    pub date: String,
    pub diagnosis: String,
    pub medicines: Vec<PrescribedMedicine>,
    pub precautions: Vec<String>,
    pub disclaimer: String,
}

/// The part of the prescription the model writes.
#[derive(Debug, Deserialize)]
struct ModelPrescription {
    diagnosis: String,
    #[serde(default)]
    medicines: Vec<PrescribedMedicine>,
    #[serde(default)]
    precautions: Vec<String>,
    #[serde(default)]
    disclaimer: String,
}

pub struct PrescriptionGenerator;

/// `January 5, 2026`.
pub fn format_date(date: NaiveDate) -> String {
    date.format("%B %-d, %Y").to_string()
}

impl Flow for PrescriptionGenerator {
    type Input = PatientRequest;
    type Output = Prescription;

    fn id(&self) -> FlowId {
        FlowId::new(FLOW_ID)
    }

    fn validate(&self, input: &PatientRequest) -> MediChatResult<()> {
        if input.name.trim().chars().count() < 2 {
            return Err(MediChatError::invalid("name", "Name must be at least 2 characters."));
        }
        if input.age > MAX_AGE {
            return Err(MediChatError::invalid("age", "Age must be between 0 and 130."));
        }
        if input.symptoms.trim().chars().count() < 10 {
            return Err(MediChatError::invalid("symptoms", "Symptoms must be at least 10 characters."));
        }
        Ok(())
    }

    fn request(&self, input: &PatientRequest, settings: &FlowSettings) -> MediChatResult<GenerateRequest> {
        let prompt = format!(
            "You are an AI medical assistant. Your task is to generate a sample prescription based on \
the patient's information and symptoms.

Patient Information:
- Name: {name}
- Age: {age}
- Gender: {gender}
- Symptoms: {symptoms}

Based on the symptoms, provide a likely diagnosis and generate a sample prescription with 2-3 \
appropriate medications and 2-3 general precautions or lifestyle advice.

Reply with a single JSON object with these fields:
- \"diagnosis\": string
- \"medicines\": array of objects with string fields \"name\", \"dosage\", \"frequency\", \"duration\"
- \"precautions\": array of strings
- \"disclaimer\": a strong statement that this is an AI-generated sample, not a real medical \
prescription, and that the user MUST consult a qualified healthcare professional before taking any \
medication",
            name = input.name.trim(),
            age = input.age,
            gender = input.gender,
            symptoms = input.symptoms.trim(),
        );
        Ok(json_request_with(settings, prompt))
    }

    fn parse(&self, input: &PatientRequest, reply: &str) -> MediChatResult<Prescription> {
        let written: ModelPrescription = parse_reply(reply)?;
        let disclaimer = if written.disclaimer.trim().is_empty() {
            DEFAULT_DISCLAIMER.to_string()
        } else {
            written.disclaimer
        };

        Ok(Prescription {
            patient_name: input.name.trim().to_string(),
            age: input.age,
            gender: input.gender,
            date: format_date(Local::now().date_naive()),
            diagnosis: written.diagnosis,
            medicines: written.medicines,
            precautions: written.precautions,
            disclaimer,
        })
    }

    fn schema(&self) -> OutputSchema {
        OutputSchema {
            schema_id: "prescription-v1".to_string(),
            json_schema: json!({
                "type": "object",
                "required": ["patient_name", "age", "gender", "date", "diagnosis", "medicines", "precautions", "disclaimer"],
                "properties": {
                    "age": { "type": "integer", "minimum": 0, "maximum": MAX_AGE },
                    "medicines": {
                        "type": "array",
                        "items": {
                            "type": "object",
                            "required": ["name", "dosage", "frequency", "duration"]
                        }
                    }
                }
            }),
            rules: vec![
                required("diagnosis"),
                non_empty("medicines"),
                custom(PROFESSIONAL_CARE_RULE, "disclaimer must refer the reader to a professional"),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patient() -> PatientRequest {
        PatientRequest {
            name: "Jane Doe".to_string(),
            age: 34,
            gender: Gender::Female,
            symptoms: "Sore throat and mild fever for two days".to_string(),
        }
    }

    const REPLY: &str = r#"{
        "patient_name": "Somebody Else",
        "age": 99,
        "diagnosis": "Viral pharyngitis",
        "medicines": [
            {"name": "Paracetamol", "dosage": "500mg", "frequency": "Every 6 hours", "duration": "3 days"},
            {"name": "Throat lozenges", "dosage": "1 lozenge", "frequency": "As needed", "duration": "5 days"}
        ],
        "precautions": ["Rest", "Drink warm fluids"],
        "disclaimer": "Sample only. Consult a qualified healthcare professional."
    }"#;

    #[test]
    fn validation_messages() {
        let mut p = patient();
        p.name = "J".to_string();
        assert_eq!(
            PrescriptionGenerator.validate(&p).unwrap_err().to_string(),
            "Name must be at least 2 characters."
        );

        let mut p = patient();
        p.age = 131;
        assert!(PrescriptionGenerator.validate(&p).is_err());

        let mut p = patient();
        p.symptoms = "cough".to_string();
        assert_eq!(
            PrescriptionGenerator.validate(&p).unwrap_err().to_string(),
            "Symptoms must be at least 10 characters."
        );

        assert!(PrescriptionGenerator.validate(&patient()).is_ok());
    }

    #[test]
    fn gender_from_str() {
        assert_eq!("female".parse::<Gender>().unwrap(), Gender::Female);
        assert_eq!(" OTHER ".parse::<Gender>().unwrap(), Gender::Other);
        assert!("unknown".parse::<Gender>().is_err());
    }

    #[test]
    fn patient_fields_come_from_input() {
        let out = PrescriptionGenerator.parse(&patient(), REPLY).unwrap();

        assert_eq!(out.patient_name, "Jane Doe");
        assert_eq!(out.age, 34);
        assert_eq!(out.gender, Gender::Female);
        assert_eq!(out.date, format_date(Local::now().date_naive()));
        assert_eq!(out.diagnosis, "Viral pharyngitis");
        assert_eq!(out.medicines.len(), 2);
        assert_eq!(out.medicines[0].dosage, "500mg");
        assert_eq!(out.precautions, vec!["Rest", "Drink warm fluids"]);
    }

    #[test]
    fn date_format() {
        let date = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap();
        assert_eq!(format_date(date), "January 5, 2026");
    }

    #[test]
    fn empty_disclaimer_is_replaced() {
        let reply = r#"{"diagnosis": "Common cold", "medicines": [], "precautions": []}"#;
        let out = PrescriptionGenerator.parse(&patient(), reply).unwrap();
        assert_eq!(out.disclaimer, DEFAULT_DISCLAIMER);
    }

    #[test]
    fn prompt_carries_patient_details() {
        let settings = FlowSettings {
            model: "gemini-2.0-flash".to_string(),
            temperature: None,
            max_output_tokens: None,
        };
        let req = PrescriptionGenerator.request(&patient(), &settings).unwrap();
        assert!(req.prompt.contains("- Name: Jane Doe\n"));
        assert!(req.prompt.contains("- Gender: Female\n"));
        assert!(req.json_output);
    }
}
