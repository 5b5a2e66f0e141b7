//! Risk assessment and health scoring from a patient record.
//!
//! The prompt embeds every known field of the record, with `Not specified`
//! for gaps, plus a BMI computed locally. The reply's four sections are
//! sliced into lists; numeric scores are read from the text when the model
//! gives them and fall back to fixed baselines otherwise.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use medichat_config::FlowSettings;
use medichat_contracts::{
    error::{MediChatError, MediChatResult},
    flow::{FlowId, GenerateRequest},
    verify::OutputSchema,
};
use medichat_core::traits::Flow;

use crate::flows::request_with;
use crate::rules::required;
use crate::sections::{first_word_of, section, section_lines};

pub const FLOW_ID: &str = "health-analytics";

const RISK: &str = "RISK ASSESSMENT:";
const INSIGHTS: &str = "PREDICTIVE INSIGHTS:";
const RECOMMENDATIONS: &str = "RECOMMENDATIONS:";
const SCORE: &str = "HEALTH SCORE:";
const HEADERS: &[&str] = &[RISK, INSIGHTS, RECOMMENDATIONS, SCORE];

const NOT_SPECIFIED: &str = "Not specified";

// Baselines used when the reply carries no figure.
const DEFAULT_RISK_SCORE: u8 = 65;
const DEFAULT_CURRENT_SCORE: u8 = 75;
const DEFAULT_PROJECTED_SCORE: u8 = 85;
const DEFAULT_COMPONENTS: ScoreComponents = ScoreComponents {
    cardiovascular: 80,
    metabolic: 70,
    lifestyle: 75,
    preventive: 80,
};

// ── Input ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatientData {
    pub demographics: Demographics,
    pub vitals: Vitals,
    pub lab_results: LabResults,
    pub lifestyle: Lifestyle,
    pub medical_history: MedicalHistory,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Demographics {
    pub age: Option<u32>,
    pub gender: Option<String>,
    /// Centimetres.
    pub height: Option<f64>,
    /// Kilograms.
    pub weight: Option<f64>,
    pub ethnicity: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Vitals {
    pub blood_pressure: Option<String>,
    pub heart_rate: Option<u32>,
    /// Degrees Celsius.
    pub temperature: Option<f64>,
    pub oxygen_saturation: Option<u32>,
    pub bmi: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabResults {
    /// mg/dL.
    pub blood_sugar: Option<f64>,
    pub cholesterol: Option<Value>,
    pub kidney_function: Option<Value>,
    pub liver_function: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Lifestyle {
    pub smoking: bool,
    pub alcohol: Option<String>,
    pub exercise: Option<String>,
    pub diet: Option<String>,
    /// Hours per night.
    pub sleep: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MedicalHistory {
    pub conditions: Vec<String>,
    pub medications: Vec<String>,
    pub surgeries: Vec<String>,
    pub family_history: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthAnalyticsInput {
    pub patient_data: PatientData,
    /// Free-form focus, e.g. "comprehensive" or "cardiovascular".
    pub analysis_type: String,
}

// ── Output ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub overall_risk: RiskLevel,
    pub risk_score: u8,
    pub risk_factors: Vec<String>,
    pub protective_factors: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictiveInsights {
    pub short_term: Vec<String>,
    pub long_term: Vec<String>,
    pub trends: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthRecommendations {
    pub immediate: Vec<String>,
    pub lifestyle: Vec<String>,
    pub screening: Vec<String>,
    pub monitoring: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreComponents {
    pub cardiovascular: u8,
    pub metabolic: u8,
    pub lifestyle: u8,
    pub preventive: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthScore {
    pub current: u8,
    pub projected: u8,
    pub components: ScoreComponents,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthAnalyticsReport {
    /// BMI computed from height and weight, when both are known.
    pub bmi: Option<f64>,
    pub risk_assessment: RiskAssessment,
    pub predictive_insights: PredictiveInsights,
    pub recommendations: HealthRecommendations,
    pub health_score: HealthScore,
}

// ── Flow ─────────────────────────────────────────────────────────────────────

pub struct HealthAnalytics;

impl Flow for HealthAnalytics {
    type Input = HealthAnalyticsInput;
    type Output = HealthAnalyticsReport;

    fn id(&self) -> FlowId {
        FlowId::new(FLOW_ID)
    }

    fn validate(&self, input: &HealthAnalyticsInput) -> MediChatResult<()> {
        if input.analysis_type.trim().is_empty() {
            return Err(MediChatError::invalid("analysis_type", "Please choose an analysis type."));
        }
        let demographics = &input.patient_data.demographics;
        let non_positive = |v: Option<f64>| v.is_some_and(|x| x <= 0.0 || !x.is_finite());
        if non_positive(demographics.height) || non_positive(demographics.weight) {
            return Err(MediChatError::invalid(
                "demographics",
                "Height and weight must be positive numbers.",
            ));
        }
        Ok(())
    }

    fn request(&self, input: &HealthAnalyticsInput, settings: &FlowSettings) -> MediChatResult<GenerateRequest> {
        Ok(request_with(settings, render_prompt(input)))
    }

    fn parse(&self, input: &HealthAnalyticsInput, reply: &str) -> MediChatResult<HealthAnalyticsReport> {
        if HEADERS.iter().all(|h| section(reply, h, HEADERS).is_none()) {
            return Err(MediChatError::ResponseParsing {
                reason: "reply contains none of the expected sections".to_string(),
            });
        }

        let risk_text = section(reply, RISK, HEADERS).unwrap_or_default();
        let score_text = section(reply, SCORE, HEADERS).unwrap_or_default();

        let overall_risk = match first_word_of(risk_text, &["high", "medium", "moderate", "low"]) {
            Some("high") => RiskLevel::High,
            Some("medium" | "moderate") => RiskLevel::Medium,
            _ => RiskLevel::Low,
        };

        Ok(HealthAnalyticsReport {
            bmi: bmi(&input.patient_data.demographics),
            risk_assessment: RiskAssessment {
                overall_risk,
                risk_score: score_after(risk_text, "risk score").unwrap_or(DEFAULT_RISK_SCORE),
                risk_factors: section_lines(reply, RISK, HEADERS),
                protective_factors: owned(&["Regular exercise", "Healthy diet"]),
            },
            predictive_insights: PredictiveInsights {
                short_term: section_lines(reply, INSIGHTS, HEADERS),
                long_term: owned(&["Maintain current lifestyle for optimal health"]),
                trends: owned(&["Improving health metrics with current interventions"]),
            },
            recommendations: HealthRecommendations {
                immediate: section_lines(reply, RECOMMENDATIONS, HEADERS),
                lifestyle: owned(&["Increase physical activity", "Improve diet quality"]),
                screening: owned(&["Annual health checkup recommended"]),
                monitoring: owned(&["Monitor blood pressure weekly", "Track weight monthly"]),
            },
            health_score: HealthScore {
                current: score_after(score_text, "current").unwrap_or(DEFAULT_CURRENT_SCORE),
                projected: score_after(score_text, "projected").unwrap_or(DEFAULT_PROJECTED_SCORE),
                components: ScoreComponents {
                    cardiovascular: score_after(score_text, "cardiovascular")
                        .unwrap_or(DEFAULT_COMPONENTS.cardiovascular),
                    metabolic: score_after(score_text, "metabolic").unwrap_or(DEFAULT_COMPONENTS.metabolic),
                    lifestyle: score_after(score_text, "lifestyle").unwrap_or(DEFAULT_COMPONENTS.lifestyle),
                    preventive: score_after(score_text, "preventive").unwrap_or(DEFAULT_COMPONENTS.preventive),
                },
            },
        })
    }

    fn schema(&self) -> OutputSchema {
        OutputSchema {
            schema_id: "health-analytics-v1".to_string(),
            json_schema: json!({
                "type": "object",
                "required": ["risk_assessment", "predictive_insights", "recommendations", "health_score"],
                "properties": {
                    "risk_assessment": {
                        "type": "object",
                        "properties": {
                            "risk_score": { "type": "integer", "minimum": 0, "maximum": 100 }
                        }
                    },
                    "health_score": {
                        "type": "object",
                        "properties": {
                            "current": { "type": "integer", "minimum": 0, "maximum": 100 },
                            "projected": { "type": "integer", "minimum": 0, "maximum": 100 }
                        }
                    }
                }
            }),
            rules: vec![
                required("risk_assessment.overall_risk"),
                required("health_score.components"),
            ],
        }
    }
}

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Body-mass index rounded to one decimal.
pub fn bmi(demographics: &Demographics) -> Option<f64> {
    let (weight, height) = (demographics.weight?, demographics.height?);
    if weight <= 0.0 || height <= 0.0 {
        return None;
    }
    let metres = height / 100.0;
    Some((weight / (metres * metres) * 10.0).round() / 10.0)
}

/// The first integer in `0..=100` that follows `label` within a short span.
fn score_after(text: &str, label: &str) -> Option<u8> {
    static NUMBER: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"\d{1,3}").expect("number regex"));

    let lowered = text.to_ascii_lowercase();
    let start = lowered.find(label)? + label.len();
    let window: String = lowered[start..].chars().take(40).collect();
    NUMBER
        .find(&window)
        .and_then(|m| m.as_str().parse::<u8>().ok())
        .filter(|n| *n <= 100)
}

fn or_unspecified<T: ToString>(value: Option<T>) -> String {
    value.map_or_else(|| NOT_SPECIFIED.to_string(), |v| v.to_string())
}

fn json_or_unspecified(value: &Option<Value>) -> String {
    value
        .as_ref()
        .map_or_else(|| NOT_SPECIFIED.to_string(), Value::to_string)
}

fn list_or_none(items: &[String]) -> String {
    if items.is_empty() {
        "None".to_string()
    } else {
        items.join(", ")
    }
}

fn render_prompt(input: &HealthAnalyticsInput) -> String {
    let p = &input.patient_data;
    let d = &p.demographics;
    let v = &p.vitals;
    let l = &p.lab_results;
    let s = &p.lifestyle;
    let h = &p.medical_history;
    let bmi = bmi(d);

    format!(
        "You are an advanced AI health analytics system with expertise in predictive medicine and risk assessment.

PATIENT DATA:
DEMOGRAPHICS:
- Age: {age}
- Gender: {gender}
- Height: {height} cm
- Weight: {weight} kg
- BMI: {bmi_text}
- Ethnicity: {ethnicity}

VITALS:
- Blood Pressure: {bp}
- Heart Rate: {hr} bpm
- Temperature: {temp}°C
- Oxygen Saturation: {spo2}%
- BMI: {vitals_bmi}

LAB RESULTS:
- Blood Sugar: {sugar} mg/dL
- Cholesterol: {chol}
- Kidney Function: {kidney}
- Liver Function: {liver}

LIFESTYLE:
- Smoking: {smoking}
- Alcohol: {alcohol}
- Exercise: {exercise}
- Diet: {diet}
- Sleep: {sleep} hours

MEDICAL HISTORY:
- Conditions: {conditions}
- Medications: {medications}
- Surgeries: {surgeries}
- Family History: {family}

ANALYSIS TYPE: {analysis_type}

Please provide health analytics using exactly these sections:

1. RISK ASSESSMENT:
   - Overall health risk level (Low/Medium/High)
   - Risk score (0-100)
   - Key risk factors
   - Protective factors

2. PREDICTIVE INSIGHTS:
   - Short-term health predictions (3-6 months)
   - Long-term health projections (1-5 years)
   - Health trend analysis

3. RECOMMENDATIONS:
   - Immediate actions needed
   - Lifestyle modifications
   - Screening recommendations
   - Monitoring requirements

4. HEALTH SCORE:
   - Current health score (0-100)
   - Projected health score with interventions
   - Component breakdown (cardiovascular, metabolic, lifestyle, preventive)

Consider age and gender-specific risk factors, lifestyle impact, family history, \
and current health metrics.",
        age = or_unspecified(d.age),
        gender = or_unspecified(d.gender.as_deref()),
        height = or_unspecified(d.height),
        weight = or_unspecified(d.weight),
        bmi_text = bmi.map_or_else(|| "Not calculated".to_string(), |b| format!("{b:.1}")),
        ethnicity = or_unspecified(d.ethnicity.as_deref()),
        bp = or_unspecified(v.blood_pressure.as_deref()),
        hr = or_unspecified(v.heart_rate),
        temp = or_unspecified(v.temperature),
        spo2 = or_unspecified(v.oxygen_saturation),
        vitals_bmi = or_unspecified(v.bmi.or(bmi)),
        sugar = or_unspecified(l.blood_sugar),
        chol = json_or_unspecified(&l.cholesterol),
        kidney = json_or_unspecified(&l.kidney_function),
        liver = json_or_unspecified(&l.liver_function),
        smoking = if s.smoking { "Yes" } else { "No" },
        alcohol = or_unspecified(s.alcohol.as_deref()),
        exercise = or_unspecified(s.exercise.as_deref()),
        diet = or_unspecified(s.diet.as_deref()),
        sleep = or_unspecified(s.sleep),
        conditions = list_or_none(&h.conditions),
        medications = list_or_none(&h.medications),
        surgeries = list_or_none(&h.surgeries),
        family = list_or_none(&h.family_history),
        analysis_type = input.analysis_type.trim(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(patient_data: PatientData) -> HealthAnalyticsInput {
        HealthAnalyticsInput {
            patient_data,
            analysis_type: "comprehensive".to_string(),
        }
    }

    fn settings() -> FlowSettings {
        FlowSettings {
            model: "gemini-1.5-flash".to_string(),
            temperature: Some(0.2),
            max_output_tokens: Some(2000),
        }
    }

    fn patient() -> PatientData {
        serde_json::from_value(json!({
            "demographics": { "age": 52, "gender": "Female", "height": 165.0, "weight": 72.0 },
            "vitals": { "blood_pressure": "138/88" },
            "lab_results": { "cholesterol": { "ldl": 160, "hdl": 45 } },
            "lifestyle": { "smoking": true, "sleep": 6.5 },
            "medical_history": { "family_history": ["Type 2 diabetes", "Hypertension"] }
        }))
        .unwrap()
    }

    const REPLY: &str = "1. RISK ASSESSMENT:
- Overall risk level: High
- Risk score: 72/100
- Smoking and elevated LDL

2. PREDICTIVE INSIGHTS:
- Blood pressure likely to rise over the next 6 months

3. RECOMMENDATIONS:
- Begin a smoking cessation program
- Repeat lipid panel in 3 months

4. HEALTH SCORE:
- Current health score: 58
- Projected health score: 74
- Cardiovascular: 50, Metabolic: 65
";

    #[test]
    fn bmi_is_rounded_to_one_decimal() {
        let d = patient().demographics;
        assert_eq!(bmi(&d), Some(26.4));
        assert_eq!(bmi(&Demographics::default()), None);
    }

    #[test]
    fn missing_analysis_type_or_bad_measurements_are_rejected() {
        let mut blank = input(patient());
        blank.analysis_type = " ".to_string();
        assert!(HealthAnalytics.validate(&blank).is_err());

        let mut bad = input(patient());
        bad.patient_data.demographics.weight = Some(-1.0);
        let err = HealthAnalytics.validate(&bad).unwrap_err();
        assert!(matches!(err, MediChatError::InvalidInput { .. }));

        assert!(HealthAnalytics.validate(&input(PatientData::default())).is_ok());
    }

    #[test]
    fn prompt_renders_known_and_missing_fields() {
        let req = HealthAnalytics.request(&input(patient()), &settings()).unwrap();
        let p = &req.prompt;

        assert!(p.contains("- Age: 52\n"));
        assert!(p.contains("- BMI: 26.4\n"));
        assert!(p.contains("- Ethnicity: Not specified\n"));
        assert!(p.contains("- Blood Pressure: 138/88\n"));
        assert!(p.contains("- Heart Rate: Not specified bpm"));
        assert!(p.contains(r#""ldl":160"#) && p.contains(r#""hdl":45"#));
        assert!(p.contains("- Smoking: Yes\n"));
        assert!(p.contains("- Sleep: 6.5 hours"));
        assert!(p.contains("- Conditions: None\n"));
        assert!(p.contains("- Family History: Type 2 diabetes, Hypertension\n"));
        assert!(p.contains("ANALYSIS TYPE: comprehensive"));
        assert_eq!(req.temperature, Some(0.2));
    }

    #[test]
    fn empty_record_prompt_says_not_calculated() {
        let req = HealthAnalytics.request(&input(PatientData::default()), &settings()).unwrap();
        assert!(req.prompt.contains("- BMI: Not calculated\n"));
        assert!(req.prompt.contains("- Smoking: No\n"));
    }

    #[test]
    fn scores_come_from_the_reply_when_present() {
        let out = HealthAnalytics.parse(&input(patient()), REPLY).unwrap();

        assert_eq!(out.bmi, Some(26.4));
        assert_eq!(out.risk_assessment.overall_risk, RiskLevel::High);
        assert_eq!(out.risk_assessment.risk_score, 72);
        assert_eq!(out.risk_assessment.risk_factors.len(), 3);
        assert_eq!(out.predictive_insights.short_term.len(), 1);
        assert_eq!(
            out.recommendations.immediate,
            vec!["Begin a smoking cessation program", "Repeat lipid panel in 3 months"]
        );
        assert_eq!(out.health_score.current, 58);
        assert_eq!(out.health_score.projected, 74);
        assert_eq!(out.health_score.components.cardiovascular, 50);
        assert_eq!(out.health_score.components.metabolic, 65);
        // Not in the reply: baselines.
        assert_eq!(out.health_score.components.lifestyle, 75);
        assert_eq!(out.health_score.components.preventive, 80);
    }

    #[test]
    fn scores_default_when_absent() {
        let reply = "RISK ASSESSMENT:\n- Generally healthy\n";
        let out = HealthAnalytics.parse(&input(PatientData::default()), reply).unwrap();

        assert_eq!(out.risk_assessment.overall_risk, RiskLevel::Low);
        assert_eq!(out.risk_assessment.risk_score, 65);
        assert_eq!(out.health_score.current, 75);
        assert_eq!(out.health_score.projected, 85);
        assert_eq!(out.health_score.components, DEFAULT_COMPONENTS);
        assert!(out.recommendations.immediate.is_empty());
        assert_eq!(out.recommendations.screening, vec!["Annual health checkup recommended"]);
    }

    #[test]
    fn unsectioned_reply_is_parse_error() {
        let err = HealthAnalytics
            .parse(&input(PatientData::default()), "You seem fine.")
            .unwrap_err();
        assert!(err.is_model_failure());
    }

    #[test]
    fn risk_level_serializes_lowercase() {
        assert_eq!(serde_json::to_value(RiskLevel::Medium).unwrap(), json!("medium"));
    }
}
