use super::lenient;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Vital signs as written in a report. Values stay textual ("120", "98.6 F").
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct VitalSigns {
    #[serde(default, deserialize_with = "lenient::opt_string", skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 1000, message = "Heart rate is too long"))]
    pub heart_rate: Option<String>,

    #[serde(default, deserialize_with = "lenient::opt_string", skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 1000, message = "Systolic pressure is too long"))]
    pub blood_pressure_systolic: Option<String>,

    #[serde(default, deserialize_with = "lenient::opt_string", skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 1000, message = "Diastolic pressure is too long"))]
    pub blood_pressure_diastolic: Option<String>,

    #[serde(default, deserialize_with = "lenient::opt_string", skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 1000, message = "Temperature is too long"))]
    pub temperature: Option<String>,

    #[serde(default, deserialize_with = "lenient::opt_string", skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 1000, message = "Blood sugar is too long"))]
    pub blood_sugar: Option<String>,

    #[serde(default, deserialize_with = "lenient::opt_string", skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 1000, message = "Oxygen saturation is too long"))]
    pub oxygen_saturation: Option<String>,
}

impl VitalSigns {
    pub fn is_empty(&self) -> bool {
        self.heart_rate.is_none()
            && self.blood_pressure_systolic.is_none()
            && self.blood_pressure_diastolic.is_none()
            && self.temperature.is_none()
            && self.blood_sugar.is_none()
            && self.oxygen_saturation.is_none()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Medication {
    #[serde(default, deserialize_with = "lenient::opt_string", skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 1000, message = "Medication name is too long"))]
    pub name: Option<String>,

    #[serde(default, deserialize_with = "lenient::opt_string", skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 1000, message = "Dosage is too long"))]
    pub dosage: Option<String>,

    #[serde(default, deserialize_with = "lenient::opt_string", skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 1000, message = "Frequency is too long"))]
    pub frequency: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Habits {
    #[serde(default, deserialize_with = "lenient::opt_string", skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 1000, message = "Sleep notes are too long"))]
    pub sleep: Option<String>,

    #[serde(default, deserialize_with = "lenient::opt_string", skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 1000, message = "Exercise notes are too long"))]
    pub exercise: Option<String>,

    #[serde(default, deserialize_with = "lenient::opt_string", skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 1000, message = "Diet notes are too long"))]
    pub diet: Option<String>,

    #[serde(default, deserialize_with = "lenient::opt_string", skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 1000, message = "Mood notes are too long"))]
    pub mood: Option<String>,
}

impl Habits {
    pub fn is_empty(&self) -> bool {
        self.sleep.is_none() && self.exercise.is_none() && self.diet.is_none() && self.mood.is_none()
    }
}

/// Conceptual macronutrient split in percent.
///
/// Only constructed through [`MacroBreakdown::checked`], so every value
/// of this type sums (rounded) to 100 with each part in 0..=100.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MacroBreakdown {
    carbs: f64,
    protein: f64,
    fats: f64,
}

/// Macro split as the model sent it; any part may be missing or malformed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
pub struct RawMacroBreakdown {
    #[serde(default, deserialize_with = "lenient::opt_number")]
    pub carbs: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_number")]
    pub protein: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_number")]
    pub fats: Option<f64>,
}

impl MacroBreakdown {
    /// Accept a split only if all three parts are present, each in 0..=100,
    /// and they round to a total of exactly 100.
    pub fn checked(carbs: f64, protein: f64, fats: f64) -> Option<Self> {
        let parts = [carbs, protein, fats];
        if parts.iter().any(|p| !p.is_finite() || *p < 0.0 || *p > 100.0) {
            return None;
        }
        if (carbs + protein + fats).round() != 100.0 {
            return None;
        }
        Some(Self {
            carbs,
            protein,
            fats,
        })
    }

    pub fn from_raw(raw: RawMacroBreakdown) -> Option<Self> {
        Self::checked(raw.carbs?, raw.protein?, raw.fats?)
    }

    pub fn carbs(&self) -> f64 {
        self.carbs
    }

    pub fn protein(&self) -> f64 {
        self.protein
    }

    pub fn fats(&self) -> f64 {
        self.fats
    }
}

/// How urgently the user should seek care.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TriageLevel {
    #[serde(rename = "Urgent Care Recommended")]
    UrgentCare,
    #[serde(rename = "Schedule Appointment")]
    ScheduleAppointment,
    #[serde(rename = "Self-Care Possible")]
    SelfCare,
}

impl TriageLevel {
    pub const ALL: [TriageLevel; 3] = [
        TriageLevel::UrgentCare,
        TriageLevel::ScheduleAppointment,
        TriageLevel::SelfCare,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            TriageLevel::UrgentCare => "Urgent Care Recommended",
            TriageLevel::ScheduleAppointment => "Schedule Appointment",
            TriageLevel::SelfCare => "Self-Care Possible",
        }
    }

    /// Case- and whitespace-insensitive match on the display label.
    pub fn from_label(label: &str) -> Option<Self> {
        let wanted = label.trim();
        Self::ALL
            .into_iter()
            .find(|level| level.label().eq_ignore_ascii_case(wanted))
    }
}

impl Default for TriageLevel {
    fn default() -> Self {
        TriageLevel::ScheduleAppointment
    }
}

/// General risk read of the described symptoms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskScore {
    High,
    Medium,
    Low,
}

impl RiskScore {
    pub const ALL: [RiskScore; 3] = [RiskScore::High, RiskScore::Medium, RiskScore::Low];

    pub fn label(&self) -> &'static str {
        match self {
            RiskScore::High => "High",
            RiskScore::Medium => "Medium",
            RiskScore::Low => "Low",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        let wanted = label.trim();
        Self::ALL
            .into_iter()
            .find(|score| score.label().eq_ignore_ascii_case(wanted))
    }
}

impl Default for RiskScore {
    fn default() -> Self {
        RiskScore::Medium
    }
}
