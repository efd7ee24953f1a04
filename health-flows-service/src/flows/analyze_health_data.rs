//! Summary, recommendations and a conceptual macro split for extracted
//! report data.

use super::extract_health_data::ExtractedHealthData;
use super::sanitize::{self, Repairs, HEALTH_ANALYSIS_DISCLAIMER};
use super::{schema, Flow};
use crate::models::lenient;
use crate::models::{MacroBreakdown, RawMacroBreakdown};
use serde::{Deserialize, Serialize};
use tera::Context;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthDataAnalysis {
    pub report_summary: String,
    pub health_recommendations: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub important_observations: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_dietary_plan: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conceptual_macro_breakdown: Option<MacroBreakdown>,
    pub disclaimer: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawHealthDataAnalysis {
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub report_summary: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub health_recommendations: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub important_observations: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub suggested_dietary_plan: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_or_invalid")]
    pub conceptual_macro_breakdown: Option<RawMacroBreakdown>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub disclaimer: Option<String>,
}

pub struct AnalyzeHealthDataFlow;

impl Flow for AnalyzeHealthDataFlow {
    const NAME: &'static str = "analyze_health_data";
    const FAILURE_MESSAGE: &'static str = "AI failed to generate analysis for the health data.";

    type Input = ExtractedHealthData;
    type Raw = RawHealthDataAnalysis;
    type Output = HealthDataAnalysis;

    fn output_schema() -> serde_json::Value {
        schema::object(
            vec![
                ("reportSummary", schema::string("Brief overview of the report")),
                (
                    "healthRecommendations",
                    schema::string("General lifestyle or wellness advice"),
                ),
                (
                    "importantObservations",
                    schema::string("Data points worth discussing with a doctor"),
                ),
                (
                    "suggestedDietaryPlan",
                    schema::string("One or two sentences of general dietary guidance"),
                ),
                ("conceptualMacroBreakdown", schema::macro_breakdown()),
                ("disclaimer", schema::string("The exact disclaimer text")),
            ],
            &["reportSummary", "healthRecommendations", "disclaimer"],
            "Analysis of extracted health data",
        )
    }

    fn prompt_context(input: &ExtractedHealthData) -> Result<Context, tera::Error> {
        let mut context = Context::from_serialize(input)?;
        context.insert("disclaimer", HEALTH_ANALYSIS_DISCLAIMER);
        Ok(context)
    }

    fn sanitize(
        _input: &ExtractedHealthData,
        raw: RawHealthDataAnalysis,
        repairs: &mut Repairs,
    ) -> HealthDataAnalysis {
        HealthDataAnalysis {
            report_summary: sanitize::text_or(raw.report_summary, "", "summary_default", repairs),
            health_recommendations: sanitize::text_or(
                raw.health_recommendations,
                "",
                "recommendations_default",
                repairs,
            ),
            important_observations: sanitize::non_blank(raw.important_observations),
            suggested_dietary_plan: sanitize::non_blank(raw.suggested_dietary_plan),
            conceptual_macro_breakdown: sanitize::checked_macros(
                raw.conceptual_macro_breakdown,
                repairs,
            ),
            disclaimer: sanitize::force_disclaimer(
                raw.disclaimer,
                HEALTH_ANALYSIS_DISCLAIMER,
                repairs,
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flows::parse_reply;
    use crate::flows::prompt::PromptRenderer;
    use crate::models::{Medication, VitalSigns};
    use serde_json::json;

    fn sanitize_json(value: serde_json::Value) -> HealthDataAnalysis {
        let raw: RawHealthDataAnalysis = parse_reply(Some(&value.to_string())).unwrap();
        AnalyzeHealthDataFlow::sanitize(
            &ExtractedHealthData::default(),
            raw,
            &mut Repairs::default(),
        )
    }

    #[test]
    fn disclaimer_is_always_canonical() {
        let output = sanitize_json(json!({
            "reportSummary": "Normal values.",
            "healthRecommendations": "Keep walking.",
            "disclaimer": "Consult your doctor."
        }));
        assert_eq!(output.disclaimer, HEALTH_ANALYSIS_DISCLAIMER);

        let missing = sanitize_json(json!({}));
        assert_eq!(missing.disclaimer, HEALTH_ANALYSIS_DISCLAIMER);
        assert_eq!(missing.report_summary, "");
        assert_eq!(missing.health_recommendations, "");
    }

    #[test]
    fn macro_split_is_checked() {
        let kept = sanitize_json(json!({
            "conceptualMacroBreakdown": { "carbs": 45, "protein": 30, "fats": 25 }
        }));
        assert!(kept.conceptual_macro_breakdown.is_some());

        let dropped = sanitize_json(json!({
            "conceptualMacroBreakdown": { "carbs": 45, "protein": 30 }
        }));
        assert!(dropped.conceptual_macro_breakdown.is_none());
    }

    #[test]
    fn prompt_lists_only_present_sections() {
        let renderer = PromptRenderer::new().unwrap();
        let input = ExtractedHealthData {
            vital_signs: Some(VitalSigns {
                heart_rate: Some("88".to_string()),
                ..Default::default()
            }),
            medications: vec![Medication {
                name: Some("Atorvastatin".to_string()),
                ..Default::default()
            }],
            ..Default::default()
        };

        let context = AnalyzeHealthDataFlow::prompt_context(&input).unwrap();
        let prompt = renderer.render(AnalyzeHealthDataFlow::NAME, &context).unwrap();

        assert!(prompt.contains("Heart rate: 88"));
        assert!(prompt.contains("Temperature: not recorded"));
        assert!(prompt.contains("Name: Atorvastatin, Dosage: not stated"));
        assert!(!prompt.contains("Habits:"));
        assert!(!prompt.contains("Notes:"));
        assert!(prompt.contains(HEALTH_ANALYSIS_DISCLAIMER));
    }
}
