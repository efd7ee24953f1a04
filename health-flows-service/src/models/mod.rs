//! Value records shared by the health flows.

pub mod doctor;
pub mod health;
pub mod lenient;

pub use doctor::{DoctorProfile, RawDoctorProfile};
pub use health::{
    Habits, MacroBreakdown, Medication, RawMacroBreakdown, RiskScore, TriageLevel, VitalSigns,
};
