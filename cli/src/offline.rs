//! Canned model replies for `--offline` runs.
//!
//! Each reply is shaped the way the real model is asked to answer, so the
//! full parse and verification path runs without network access.

use medichat_core::scripted::ScriptedLlm;
use medichat_flows::flows::{
    ai_doctor, health_analytics, medical_summarizer, medicine_info, mental_health, prescription,
    skin_lesion, symptom_analyzer,
};

const SYMPTOMS: &str = "**1. POTENTIAL CONDITIONS:**

1. **Common cold** (Confidence: 60%, Severity: Mild)
   - Description: A viral infection of the nose and throat.
   - Next steps: Rest, fluids, and over-the-counter symptom relief.
2. **Seasonal allergies** (Confidence: 25%, Severity: Mild)
   - Description: An immune reaction to pollen or dust.
   - Next steps: Try an antihistamine and avoid known triggers.

**2. URGENCY ASSESSMENT:**

- Overall urgency level: Low
- Recent exposure to sick contacts

**3. RECOMMENDATIONS:**

- Rest and stay hydrated
- See a doctor if a fever above 39C develops or symptoms last over 10 days
";

const MEDICINE: &str = r#"{
  "usage": "Relieves mild to moderate pain, fever, and inflammation.",
  "dosage": "Adults: 200-400 mg every 4-6 hours as needed, not exceeding 1200 mg a day without medical advice.",
  "side_effects": "Upset stomach, heartburn, nausea, dizziness.",
  "precautions": "Take with food. Avoid with stomach ulcers, kidney disease, or late pregnancy.",
  "disclaimer": "This information is for general knowledge only. Always consult a doctor or pharmacist before starting any medication."
}"#;

const DOCTOR: &str = "It sounds like a tension headache. Rest, drink water, and take a break \
from screens. If it is sudden and severe, or comes with fever and a stiff neck, seek care right away.";

const SKIN: &str = r#"{
  "potential_condition": "Benign nevus (common mole)",
  "description": "A small, evenly colored, round spot is most often a harmless mole. Urgency appears low.",
  "next_steps": "Monitor for changes in size, shape, or color and have a dermatologist examine it at your next visit."
}"#;

const PRESCRIPTION: &str = r#"{
  "diagnosis": "Upper respiratory tract infection",
  "medicines": [
    {"name": "Paracetamol", "dosage": "500 mg", "frequency": "Every 6 hours as needed", "duration": "3 days"},
    {"name": "Saline nasal spray", "dosage": "2 sprays per nostril", "frequency": "Three times a day", "duration": "5 days"}
  ],
  "precautions": ["Rest and drink warm fluids", "Avoid cold drinks"],
  "disclaimer": "This is an AI-generated sample, not a real prescription. Consult a qualified healthcare professional before taking any medication."
}"#;

const COMPANION: &str = r#"{
  "response": "Thank you for sharing that with me. It sounds like you have been carrying a lot lately. What has felt heaviest this week?",
  "mood": "Mixed"
}"#;

const SUMMARY: &str = r#"{
  "summary": "A common, usually mild condition. Most people recover with rest and fluids, and vaccination lowers the risk of severe illness.",
  "source_links": [
    "https://www.who.int/health-topics",
    "https://medlineplus.gov/"
  ]
}"#;

const ANALYTICS: &str = "1. RISK ASSESSMENT:
- Overall risk level: Medium
- Risk score: 42/100
- Blood pressure at the upper end of normal

2. PREDICTIVE INSIGHTS:
- Weight likely to stay stable with current habits

3. RECOMMENDATIONS:
- Add two sessions of moderate exercise per week
- Recheck blood pressure in one month

4. HEALTH SCORE:
- Current health score: 72
- Projected health score: 80
";

/// A scripted model holding the canned reply for `flow_id`.
pub fn llm_for(flow_id: &str) -> ScriptedLlm {
    let reply = match flow_id {
        symptom_analyzer::FLOW_ID => SYMPTOMS,
        medicine_info::FLOW_ID => MEDICINE,
        ai_doctor::FLOW_ID => DOCTOR,
        skin_lesion::FLOW_ID => SKIN,
        prescription::FLOW_ID => PRESCRIPTION,
        mental_health::FLOW_ID => COMPANION,
        medical_summarizer::FLOW_ID => SUMMARY,
        health_analytics::FLOW_ID => ANALYTICS,
        _ => return ScriptedLlm::new(),
    };
    ScriptedLlm::repeating(reply)
}
