//! Output repair shared by the flows.
//!
//! Model replies are untrusted. Each flow hands its raw record to these
//! helpers, which force canonical text, drop invalid structures and fill
//! defaults. Every repair is noted on a [`Repairs`] log so the runner can
//! count it.

use crate::models::lenient::StringOrList;
use crate::models::{MacroBreakdown, RawMacroBreakdown};

/// Disclaimer attached to every health-data analysis.
pub const HEALTH_ANALYSIS_DISCLAIMER: &str = "This analysis is AI-generated based on the information you provided. It is for informational purposes only and is NOT a substitute for professional medical advice, diagnosis, or treatment, including dietary planning. Always seek the advice of your physician or other qualified health provider with any questions you may have regarding a medical condition or dietary changes.";

/// Disclaimer attached to every X-ray observation.
pub const XRAY_DISCLAIMER: &str = "IMPORTANT: This AI-generated observation is for informational purposes only and is NOT a medical diagnosis or a substitute for professional medical advice. X-ray interpretation requires a trained radiologist or physician. Always consult a qualified healthcare professional for any health concerns or before making any decisions related to your health or treatment, including risk assessment.";

/// Phone number put on every doctor profile. Bookings are simulated.
pub const SIMULATED_DOCTOR_PHONE: &str = "8446204947";

pub const DEFAULT_SPECIALIST: &str = "General Practitioner";

pub const DEFAULT_POSSIBLE_CONDITIONS: &str =
    "Could not determine specific conditions based on input. Please consult a doctor.";

pub const DEFAULT_NEXT_STEPS: &str = "It is important to consult with a qualified healthcare professional for an accurate diagnosis and appropriate treatment plan. Please schedule an appointment with your doctor.";

pub const CHATBOT_APOLOGY: &str =
    "Sorry, I encountered an issue trying to understand that. Could you please rephrase?";

/// Repairs applied to one reply.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Repairs {
    applied: Vec<&'static str>,
}

impl Repairs {
    pub fn note(&mut self, repair: &'static str) {
        self.applied.push(repair);
    }

    pub fn applied(&self) -> &[&'static str] {
        &self.applied
    }

    pub fn is_empty(&self) -> bool {
        self.applied.is_empty()
    }
}

/// Replace `current` with the canonical disclaimer, noting it when the
/// model's text differed.
pub fn force_disclaimer(current: Option<String>, canonical: &str, repairs: &mut Repairs) -> String {
    if current.as_deref() != Some(canonical) {
        repairs.note("disclaimer");
    }
    canonical.to_string()
}

/// Keep a macro split only when it is complete and sums to 100.
pub fn checked_macros(
    raw: Option<RawMacroBreakdown>,
    repairs: &mut Repairs,
) -> Option<MacroBreakdown> {
    let raw = raw?;
    let checked = MacroBreakdown::from_raw(raw);
    if checked.is_none() {
        repairs.note("macro_breakdown");
    }
    checked
}

/// Normalize the specialists field into a non-empty list.
///
/// A joined string is split on commas; every entry is trimmed and blanks
/// are dropped. Nothing left falls back to a general practitioner.
pub fn specialists(raw: Option<StringOrList>, repairs: &mut Repairs) -> Vec<String> {
    let entries = match raw {
        Some(StringOrList::List(items)) => items,
        Some(StringOrList::Joined(joined)) => {
            repairs.note("specialists_split");
            joined.split(',').map(str::to_string).collect()
        }
        None => Vec::new(),
    };

    let cleaned: Vec<String> = entries
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();

    if cleaned.is_empty() {
        repairs.note("specialists_default");
        return vec![DEFAULT_SPECIALIST.to_string()];
    }
    cleaned
}

/// Trimmed text, or `None` when absent or blank.
pub fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Cut text to at most `max_chars` characters.
pub fn clip(value: Option<String>, max_chars: usize) -> Option<String> {
    value.map(|v| match v.char_indices().nth(max_chars) {
        Some((cut, _)) => v[..cut].trim_end().to_string(),
        None => v,
    })
}

/// Text field with a fixed fallback for absent or blank values.
pub fn text_or(
    value: Option<String>,
    fallback: &str,
    repair: &'static str,
    repairs: &mut Repairs,
) -> String {
    match non_blank(value) {
        Some(text) => text,
        None => {
            repairs.note(repair);
            fallback.to_string()
        }
    }
}

/// Guess a specialty from a free-text query when no profile came back.
pub fn guess_specialty(query: &str) -> &'static str {
    let query = query.to_lowercase();
    if query.contains("heart") || query.contains("cardio") {
        "Cardiologist"
    } else if query.contains("child") {
        "Pediatrician"
    } else {
        DEFAULT_SPECIALIST
    }
}
