//! Preliminary triage of a skin-lesion photo.
//!
//! The photo arrives as a `data:image/<type>;base64,<data>` URI and is sent
//! to the model as an inline image part next to the prompt.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use serde_json::json;

use medichat_config::FlowSettings;
use medichat_contracts::{
    error::{MediChatError, MediChatResult},
    flow::{FlowId, GenerateRequest, InlineImage},
    verify::OutputSchema,
};
use medichat_core::traits::Flow;

use crate::flows::json_request_with;
use crate::json::parse_reply;
use crate::rules::required;

pub const FLOW_ID: &str = "skin-lesion-analyzer";

const PROMPT: &str = "You are a dermatology assistant AI. Your role is to provide a preliminary \
analysis of a skin lesion based on the attached image. You are not a medical professional and your \
analysis is not a diagnosis.

Analyze the attached image of a skin lesion. Based on the visual information, identify the most \
likely potential condition. Provide a brief, easy-to-understand description of that condition, \
assess the likely urgency, and suggest clear, actionable next steps for the user.

Reply with a single JSON object with these string fields:
- \"potential_condition\": the most likely potential condition
- \"description\": a brief description of the condition and an assessment of its urgency
- \"next_steps\": recommended next steps, such as consulting a dermatologist or monitoring the lesion";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkinPhoto {
    pub photo_data_uri: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkinLesionAssessment {
    pub potential_condition: String,
    pub description: String,
    pub next_steps: String,
}

pub struct SkinLesionAnalyzer;

/// Split and check a base64 image data URI.
pub fn parse_data_uri(uri: &str) -> MediChatResult<InlineImage> {
    let bad = |reason: &str| MediChatError::invalid("photo_data_uri", reason);

    let rest = uri
        .trim()
        .strip_prefix("data:")
        .ok_or_else(|| bad("Please upload a photo of the skin lesion."))?;
    let (meta, data) = rest
        .split_once(',')
        .ok_or_else(|| bad("The photo could not be read. Please upload it again."))?;
    let mime_type = meta
        .strip_suffix(";base64")
        .ok_or_else(|| bad("The photo must be base64 encoded."))?;
    if !mime_type.starts_with("image/") || mime_type.len() <= "image/".len() {
        return Err(bad("Please upload an image file."));
    }
    if data.is_empty() || STANDARD.decode(data).is_err() {
        return Err(bad("The photo could not be read. Please upload it again."));
    }

    Ok(InlineImage {
        mime_type: mime_type.to_string(),
        data_base64: data.to_string(),
    })
}

impl Flow for SkinLesionAnalyzer {
    type Input = SkinPhoto;
    type Output = SkinLesionAssessment;

    fn id(&self) -> FlowId {
        FlowId::new(FLOW_ID)
    }

    fn validate(&self, input: &SkinPhoto) -> MediChatResult<()> {
        parse_data_uri(&input.photo_data_uri).map(|_| ())
    }

    fn request(&self, input: &SkinPhoto, settings: &FlowSettings) -> MediChatResult<GenerateRequest> {
        let image = parse_data_uri(&input.photo_data_uri)?;
        let mut request = json_request_with(settings, PROMPT.to_string());
        request.images.push(image);
        Ok(request)
    }

    fn parse(&self, _input: &SkinPhoto, reply: &str) -> MediChatResult<SkinLesionAssessment> {
        parse_reply(reply)
    }

    fn schema(&self) -> OutputSchema {
        OutputSchema {
            schema_id: "skin-lesion-v1".to_string(),
            json_schema: json!({
                "type": "object",
                "required": ["potential_condition", "description", "next_steps"],
                "properties": {
                    "potential_condition": { "type": "string", "minLength": 1 },
                    "next_steps": { "type": "string", "minLength": 1 }
                }
            }),
            rules: vec![required("potential_condition"), required("next_steps")],
        }
    }
}
