//! Structured data extraction from an uploaded report (PDF or image).

use super::data_uri::{validate_data_uri, DataUri};
use super::sanitize::{self, Repairs};
use super::{schema, Flow, FlowError};
use crate::models::lenient;
use crate::models::{Habits, Medication, VitalSigns};
use crate::services::providers::MediaPart;
use serde::{Deserialize, Serialize};
use service_core::error::FieldViolation;
use validator::Validate;

// Bounds shared with the `validate` attributes below and on the models.
const MAX_TEXT_CHARS: usize = 10_000;
const MAX_FIELD_CHARS: usize = 1_000;
const MAX_MEDICATIONS: usize = 100;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ExtractHealthDataInput {
    #[validate(custom(function = "validate_data_uri"))]
    pub document_data_uri: String,
}

/// Health data found in a report. Also the input of the analysis flow, so
/// every field is optional on the way in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedHealthData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(nested)]
    pub vital_signs: Option<VitalSigns>,

    #[serde(default, deserialize_with = "lenient::opt_string", skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 10000, message = "Symptoms text is too long"))]
    pub symptoms: Option<String>,

    #[serde(default)]
    #[validate(length(max = 100, message = "Too many medications"), nested)]
    pub medications: Vec<Medication>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(nested)]
    pub habits: Option<Habits>,

    #[serde(default, deserialize_with = "lenient::opt_string", skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 10000, message = "Notes are too long"))]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawExtractedHealthData {
    #[serde(default, deserialize_with = "lenient::opt_or_invalid")]
    pub vital_signs: Option<VitalSigns>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub symptoms: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_vec_skip_invalid")]
    pub medications: Option<Vec<Medication>>,
    #[serde(default, deserialize_with = "lenient::opt_or_invalid")]
    pub habits: Option<Habits>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub notes: Option<String>,
}

pub struct ExtractHealthDataFlow;

impl Flow for ExtractHealthDataFlow {
    const NAME: &'static str = "extract_health_data";
    const FAILURE_MESSAGE: &'static str = "AI failed to extract health data from the document.";

    type Input = ExtractHealthDataInput;
    type Raw = RawExtractedHealthData;
    type Output = ExtractedHealthData;

    fn output_schema() -> serde_json::Value {
        let text = schema::string;
        schema::object(
            vec![
                (
                    "vitalSigns",
                    schema::object(
                        vec![
                            ("heartRate", text("Heart rate as written")),
                            ("bloodPressureSystolic", text("Systolic blood pressure")),
                            ("bloodPressureDiastolic", text("Diastolic blood pressure")),
                            ("temperature", text("Body temperature")),
                            ("bloodSugar", text("Blood sugar level")),
                            ("oxygenSaturation", text("Oxygen saturation")),
                        ],
                        &[],
                        "Vital signs found in the document",
                    ),
                ),
                ("symptoms", text("Symptoms described in the document")),
                (
                    "medications",
                    schema::array(
                        schema::object(
                            vec![
                                ("name", text("Medication name")),
                                ("dosage", text("Dosage, e.g. 10mg")),
                                ("frequency", text("Frequency, e.g. once a day")),
                            ],
                            &[],
                            "One medication",
                        ),
                        None,
                        None,
                        "Medications mentioned in the document",
                    ),
                ),
                (
                    "habits",
                    schema::object(
                        vec![
                            ("sleep", text("Sleep duration or quality")),
                            ("exercise", text("Exercise routine")),
                            ("diet", text("Dietary notes")),
                            ("mood", text("Mood")),
                        ],
                        &[],
                        "Lifestyle habits",
                    ),
                ),
                ("notes", text("Other health observations")),
            ],
            &[],
            "Health data extracted from a document",
        )
    }

    fn media(input: &ExtractHealthDataInput) -> Result<Vec<MediaPart>, FlowError> {
        document_media(&input.document_data_uri, "documentDataUri")
    }

    fn sanitize(
        _input: &ExtractHealthDataInput,
        raw: RawExtractedHealthData,
        repairs: &mut Repairs,
    ) -> ExtractedHealthData {
        let medications = match raw.medications {
            Some(list) => list
                .into_iter()
                .filter_map(clean_medication)
                .take(MAX_MEDICATIONS)
                .collect(),
            None => {
                repairs.note("medications_default");
                Vec::new()
            }
        };

        ExtractedHealthData {
            vital_signs: raw.vital_signs.map(clean_vitals).filter(|v| !v.is_empty()),
            symptoms: sanitize::clip(sanitize::non_blank(raw.symptoms), MAX_TEXT_CHARS),
            medications,
            habits: raw.habits.map(clean_habits).filter(|h| !h.is_empty()),
            notes: sanitize::clip(sanitize::non_blank(raw.notes), MAX_TEXT_CHARS),
        }
    }
}

/// Inline media part for an already validated data-URI field.
pub(crate) fn document_media(uri: &str, field: &str) -> Result<Vec<MediaPart>, FlowError> {
    DataUri::parse(uri)
        .map(|parsed| vec![parsed.to_media_part()])
        .map_err(|e| FlowError::Validation(vec![FieldViolation::new(field, format!("File {}", e))]))
}

fn field(value: Option<String>) -> Option<String> {
    sanitize::clip(sanitize::non_blank(value), MAX_FIELD_CHARS)
}

fn clean_vitals(v: VitalSigns) -> VitalSigns {
    VitalSigns {
        heart_rate: field(v.heart_rate),
        blood_pressure_systolic: field(v.blood_pressure_systolic),
        blood_pressure_diastolic: field(v.blood_pressure_diastolic),
        temperature: field(v.temperature),
        blood_sugar: field(v.blood_sugar),
        oxygen_saturation: field(v.oxygen_saturation),
    }
}

fn clean_habits(h: Habits) -> Habits {
    Habits {
        sleep: field(h.sleep),
        exercise: field(h.exercise),
        diet: field(h.diet),
        mood: field(h.mood),
    }
}

/// Blank fields are dropped; a medication with nothing left is skipped.
fn clean_medication(m: Medication) -> Option<Medication> {
    let cleaned = Medication {
        name: field(m.name),
        dosage: field(m.dosage),
        frequency: field(m.frequency),
    };
    if cleaned.name.is_none() && cleaned.dosage.is_none() && cleaned.frequency.is_none() {
        None
    } else {
        Some(cleaned)
    }
}
