//! Plain-language information about a named medication.

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
use crate::rules::{custom, required, PROFESSIONAL_CARE_RULE, STANDARD_DISCLAIMER};

pub const FLOW_ID: &str = "medicine-info";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MedicineQuery {
    pub medicine_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MedicineInfo {
    pub usage: String,
    pub dosage: String,
    pub side_effects: String,
    pub precautions: String,
    #[serde(default)]
    pub disclaimer: String,
}

pub struct MedicineInfoLookup;

impl Flow for MedicineInfoLookup {
    type Input = MedicineQuery;
    type Output = MedicineInfo;

    fn id(&self) -> FlowId {
        FlowId::new(FLOW_ID)
    }

    fn validate(&self, input: &MedicineQuery) -> MediChatResult<()> {
        if input.medicine_name.trim().chars().count() < 2 {
            return Err(MediChatError::invalid(
                "medicine_name",
                "Medicine name must be at least 2 characters.",
            ));
        }
        Ok(())
    }

    fn request(&self, input: &MedicineQuery, settings: &FlowSettings) -> MediChatResult<GenerateRequest> {
        let prompt = format!(
            "You are a helpful medical assistant. Provide detailed information about the following \
medication: {name}.

Reply with a single JSON object with these string fields:
- \"usage\": what the medicine is typically used for
- \"dosage\": general dosage information
- \"side_effects\": common side effects
- \"precautions\": important precautions and warnings
- \"disclaimer\": a clear statement that this information is for educational purposes only, is \
not a substitute for professional medical advice, and that the user must consult a healthcare \
provider before taking any medication",
            name = input.medicine_name.trim()
        );
        Ok(json_request_with(settings, prompt))
    }

    fn parse(&self, _input: &MedicineQuery, reply: &str) -> MediChatResult<MedicineInfo> {
        let mut info: MedicineInfo = parse_reply(reply)?;
        if info.disclaimer.trim().is_empty() {
            info.disclaimer = STANDARD_DISCLAIMER.to_string();
        }
        Ok(info)
    }

    fn schema(&self) -> OutputSchema {
        OutputSchema {
            schema_id: "medicine-info-v1".to_string(),
            json_schema: json!({
                "type": "object",
                "required": ["usage", "dosage", "side_effects", "precautions", "disclaimer"],
                "properties": {
                    "usage": { "type": "string", "minLength": 1 },
                    "dosage": { "type": "string", "minLength": 1 }
                }
            }),
            rules: vec![
                required("usage"),
                custom(PROFESSIONAL_CARE_RULE, "disclaimer must refer the reader to a professional"),
            ],
        }
    }
}
