//! Symptom triage: possible conditions, specialists, urgency and risk.

use super::sanitize::{self, Repairs};
use super::{not_blank, schema, Flow};
use crate::models::lenient::{self, StringOrList};
use crate::models::{MacroBreakdown, RawMacroBreakdown, RiskScore, TriageLevel};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SymptomAnalysisInput {
    #[validate(
        length(
            min = 10,
            max = 10000,
            message = "Please describe your symptoms in at least 10 characters."
        ),
        custom(function = "not_blank")
    )]
    pub symptoms: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SymptomAnalysis {
    pub possible_conditions: String,
    pub suggested_specialists: Vec<String>,
    pub triage_level: TriageLevel,
    pub risk_score: RiskScore,
    pub next_steps: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_chat_suggestion: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_dietary_considerations: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conceptual_macro_breakdown: Option<MacroBreakdown>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSymptomAnalysis {
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub possible_conditions: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string_or_list")]
    pub suggested_specialists: Option<StringOrList>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub triage_level: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub risk_score: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub next_steps: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub ai_chat_suggestion: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub suggested_dietary_considerations: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_or_invalid")]
    pub conceptual_macro_breakdown: Option<RawMacroBreakdown>,
}

pub struct SymptomAnalysisFlow;

impl Flow for SymptomAnalysisFlow {
    const NAME: &'static str = "symptom_analysis";

    type Input = SymptomAnalysisInput;
    type Raw = RawSymptomAnalysis;
    type Output = SymptomAnalysis;

    fn output_schema() -> serde_json::Value {
        let triage: Vec<&str> = TriageLevel::ALL.iter().map(|t| t.label()).collect();
        let risk: Vec<&str> = RiskScore::ALL.iter().map(|r| r.label()).collect();

        schema::object(
            vec![
                (
                    "possibleConditions",
                    schema::string("Possible conditions matching the symptoms. Not a diagnosis."),
                ),
                (
                    "suggestedSpecialists",
                    schema::array(
                        schema::string("Specialist type, e.g. Cardiologist"),
                        Some(1),
                        Some(3),
                        "Specialists best suited to evaluate the symptoms",
                    ),
                ),
                (
                    "triageLevel",
                    schema::string_enum(&triage, "Urgency of seeking medical attention"),
                ),
                (
                    "riskScore",
                    schema::string_enum(&risk, "General risk read of the symptoms"),
                ),
                (
                    "nextSteps",
                    schema::string("Next steps, always including professional consultation"),
                ),
                (
                    "aiChatSuggestion",
                    schema::string("What to ask or tell a doctor"),
                ),
                (
                    "suggestedDietaryConsiderations",
                    schema::string("One or two sentences of general dietary guidance"),
                ),
                ("conceptualMacroBreakdown", schema::macro_breakdown()),
            ],
            &[
                "possibleConditions",
                "suggestedSpecialists",
                "triageLevel",
                "riskScore",
                "nextSteps",
            ],
            "Symptom analysis",
        )
    }

    fn sanitize(
        _input: &SymptomAnalysisInput,
        raw: RawSymptomAnalysis,
        repairs: &mut Repairs,
    ) -> SymptomAnalysis {
        let triage_level = match raw.triage_level.as_deref().and_then(TriageLevel::from_label) {
            Some(level) => level,
            None => {
                repairs.note("triage_default");
                TriageLevel::default()
            }
        };

        let risk_score = match raw.risk_score.as_deref().and_then(RiskScore::from_label) {
            Some(score) => score,
            None => {
                repairs.note("risk_default");
                RiskScore::default()
            }
        };

        SymptomAnalysis {
            possible_conditions: sanitize::text_or(
                raw.possible_conditions,
                sanitize::DEFAULT_POSSIBLE_CONDITIONS,
                "conditions_default",
                repairs,
            ),
            suggested_specialists: sanitize::specialists(raw.suggested_specialists, repairs),
            triage_level,
            risk_score,
            next_steps: sanitize::text_or(
                raw.next_steps,
                sanitize::DEFAULT_NEXT_STEPS,
                "next_steps_default",
                repairs,
            ),
            ai_chat_suggestion: sanitize::non_blank(raw.ai_chat_suggestion),
            suggested_dietary_considerations: sanitize::non_blank(
                raw.suggested_dietary_considerations,
            ),
            conceptual_macro_breakdown: sanitize::checked_macros(
                raw.conceptual_macro_breakdown,
                repairs,
            ),
        }
    }
}
