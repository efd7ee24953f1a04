//! General, non-diagnostic observations on an X-ray image.

use super::data_uri::validate_data_uri;
use super::extract_health_data::document_media;
use super::sanitize::{self, Repairs, XRAY_DISCLAIMER};
use super::{schema, Flow, FlowError};
use crate::models::lenient;
use crate::services::providers::MediaPart;
use serde::{Deserialize, Serialize};
use tera::Context;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct XrayAnalysisInput {
    #[validate(custom(function = "validate_data_uri"))]
    pub xray_image_data_uri: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct XrayObservation {
    pub ai_observations: String,
    pub potential_discussion_points: String,
    pub disclaimer: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawXrayObservation {
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub ai_observations: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub potential_discussion_points: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub disclaimer: Option<String>,
}

pub struct XrayAnalysisFlow;

impl Flow for XrayAnalysisFlow {
    const NAME: &'static str = "xray_analysis";
    const FAILURE_MESSAGE: &'static str = "AI failed to generate observations for the X-ray image.";

    type Input = XrayAnalysisInput;
    type Raw = RawXrayObservation;
    type Output = XrayObservation;

    fn output_schema() -> serde_json::Value {
        schema::object(
            vec![
                (
                    "aiObservations",
                    schema::string("General visual observations. No diagnosis."),
                ),
                (
                    "potentialDiscussionPoints",
                    schema::string("Aspects to discuss with a doctor or radiologist"),
                ),
                ("disclaimer", schema::string("The exact disclaimer text")),
            ],
            &["aiObservations", "potentialDiscussionPoints", "disclaimer"],
            "X-ray observation",
        )
    }

    fn prompt_context(_input: &XrayAnalysisInput) -> Result<Context, tera::Error> {
        let mut context = Context::new();
        context.insert("disclaimer", XRAY_DISCLAIMER);
        Ok(context)
    }

    fn media(input: &XrayAnalysisInput) -> Result<Vec<MediaPart>, FlowError> {
        document_media(&input.xray_image_data_uri, "xrayImageDataUri")
    }

    fn sanitize(
        _input: &XrayAnalysisInput,
        raw: RawXrayObservation,
        repairs: &mut Repairs,
    ) -> XrayObservation {
        XrayObservation {
            ai_observations: sanitize::text_or(
                raw.ai_observations,
                "",
                "observations_default",
                repairs,
            ),
            potential_discussion_points: sanitize::text_or(
                raw.potential_discussion_points,
                "",
                "discussion_points_default",
                repairs,
            ),
            disclaimer: sanitize::force_disclaimer(raw.disclaimer, XRAY_DISCLAIMER, repairs),
        }
    }
}
