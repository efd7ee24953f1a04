//! Illustrative doctor profiles for a state and a symptom or specialty.
//!
//! Profiles are fictional. Every one carries the simulated booking number,
//! and an empty result is replaced by a single fallback profile so the
//! caller always has something to show.

use super::sanitize::{self, guess_specialty, Repairs, SIMULATED_DOCTOR_PHONE};
use super::{not_blank, schema, Flow, FlowError};
use crate::models::lenient;
use crate::models::{DoctorProfile, RawDoctorProfile};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tera::Context;
use validator::Validate;

/// Most profiles returned for one search.
pub const MAX_DOCTORS: usize = 3;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct FindDoctorsInput {
    #[validate(
        length(
            min = 3,
            max = 100,
            message = "Please enter a valid Indian state (3 to 100 characters)."
        ),
        custom(function = "not_blank")
    )]
    pub indian_state: String,

    #[validate(
        length(
            min = 3,
            max = 500,
            message = "Describe symptoms or specialty (3 to 500 characters)."
        ),
        custom(function = "not_blank")
    )]
    pub symptom_or_specialty: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DoctorSearch {
    pub doctors: Vec<DoctorProfile>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawDoctorSearch {
    #[serde(default, deserialize_with = "lenient::opt_vec_skip_invalid")]
    pub doctors: Option<Vec<RawDoctorProfile>>,
}

pub struct FindDoctorsFlow;

impl Flow for FindDoctorsFlow {
    const NAME: &'static str = "find_doctors";
    const FAILURE_MESSAGE: &'static str = "AI failed to find doctors.";

    type Input = FindDoctorsInput;
    type Raw = RawDoctorSearch;
    type Output = DoctorSearch;

    fn output_schema() -> serde_json::Value {
        let text = schema::string;
        let profile = schema::object(
            vec![
                ("id", text("Unique id such as doc-1")),
                ("name", text("Full name")),
                ("specialty", text("Medical specialty")),
                ("address", text("Clinic address within the state")),
                ("phoneNumber", text("Booking phone number")),
                ("availabilityNotes", text("Short availability notes")),
            ],
            &["id", "name", "specialty", "address", "phoneNumber"],
            "Fictional doctor profile",
        );

        schema::object(
            vec![(
                "doctors",
                schema::array(
                    profile,
                    Some(1),
                    Some(MAX_DOCTORS as u32),
                    "Doctor profiles",
                ),
            )],
            &["doctors"],
            "Doctor search results",
        )
    }

    fn prompt_context(input: &FindDoctorsInput) -> Result<Context, tera::Error> {
        let mut context = Context::from_serialize(input)?;
        context.insert("phoneNumber", SIMULATED_DOCTOR_PHONE);
        Ok(context)
    }

    fn sanitize(
        input: &FindDoctorsInput,
        raw: RawDoctorSearch,
        repairs: &mut Repairs,
    ) -> DoctorSearch {
        let mut candidates = raw.doctors.unwrap_or_default();
        if candidates.len() > MAX_DOCTORS {
            repairs.note("doctors_truncated");
            candidates.truncate(MAX_DOCTORS);
        }

        let mut seen_ids = HashSet::new();
        let mut doctors = Vec::with_capacity(candidates.len());

        for (index, candidate) in candidates.into_iter().enumerate() {
            let Some(name) = sanitize::non_blank(candidate.name) else {
                repairs.note("doctor_dropped");
                continue;
            };

            if candidate.phone_number.as_deref() != Some(SIMULATED_DOCTOR_PHONE) {
                repairs.note("phone_number");
            }

            let specialty = sanitize::non_blank(candidate.specialty).unwrap_or_else(|| {
                repairs.note("specialty_guessed");
                guess_specialty(&input.symptom_or_specialty).to_string()
            });

            let address = sanitize::non_blank(candidate.address).unwrap_or_else(|| {
                repairs.note("address_default");
                input.indian_state.trim().to_string()
            });

            doctors.push(DoctorProfile {
                id: unique_id(sanitize::non_blank(candidate.id), index, &mut seen_ids, repairs),
                name,
                specialty,
                address,
                phone_number: SIMULATED_DOCTOR_PHONE.to_string(),
                availability_notes: sanitize::non_blank(candidate.availability_notes),
            });
        }

        if doctors.is_empty() {
            repairs.note("doctor_fallback");
            doctors.push(fallback_profile(input));
        }

        DoctorSearch { doctors }
    }

    fn on_empty(
        input: &FindDoctorsInput,
        repairs: &mut Repairs,
    ) -> Result<DoctorSearch, FlowError> {
        repairs.note("doctor_fallback");
        Ok(DoctorSearch {
            doctors: vec![fallback_profile(input)],
        })
    }
}

/// The single profile shown when the model produced none.
pub fn fallback_profile(input: &FindDoctorsInput) -> DoctorProfile {
    DoctorProfile {
        id: "fallback-doc-1".to_string(),
        name: "Dr. Example (AI Fallback)".to_string(),
        specialty: guess_specialty(&input.symptom_or_specialty).to_string(),
        address: format!("Central Clinic, A City, {}", input.indian_state.trim()),
        phone_number: SIMULATED_DOCTOR_PHONE.to_string(),
        availability_notes: Some("Please verify details independently.".to_string()),
    }
}

/// Keep the model's id when present and unused, else the first free `doc-<n>`.
fn unique_id(
    preferred: Option<String>,
    index: usize,
    seen: &mut HashSet<String>,
    repairs: &mut Repairs,
) -> String {
    if let Some(id) = preferred {
        if seen.insert(id.clone()) {
            return id;
        }
    }

    repairs.note("doctor_id");
    let mut n = index + 1;
    loop {
        let candidate = format!("doc-{}", n);
        if seen.insert(candidate.clone()) {
            return candidate;
        }
        n += 1;
    }
}
