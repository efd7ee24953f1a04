use super::lenient;
use serde::{Deserialize, Serialize};

/// A doctor suggestion returned by the finder.
///
/// Profiles are model-generated and illustrative; the phone number is
/// always the simulated booking line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DoctorProfile {
    pub id: String,
    pub name: String,
    pub specialty: String,
    pub address: String,
    pub phone_number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub availability_notes: Option<String>,
}

/// Doctor profile as the model sent it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawDoctorProfile {
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub specialty: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub address: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub phone_number: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub availability_notes: Option<String>,
}

impl From<DoctorProfile> for RawDoctorProfile {
    fn from(profile: DoctorProfile) -> Self {
        Self {
            id: Some(profile.id),
            name: Some(profile.name),
            specialty: Some(profile.specialty),
            address: Some(profile.address),
            phone_number: Some(profile.phone_number),
            availability_notes: profile.availability_notes,
        }
    }
}
