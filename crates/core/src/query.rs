//! Query composition for the upstream assistant.
//!
//! Queries are built from typed text, dictated fragments and an optional vitals context. Only
//! the final, non-blank query is sent upstream.

use llamaid_types::{PromptText, TextError};
use serde::{Deserialize, Serialize};

/// Append a dictated text fragment to the current query.
///
/// A non-empty query gains a single separating space; an empty one is replaced.
pub fn append_fragment(previous: &str, fragment: &str) -> String {
    if previous.is_empty() {
        fragment.to_owned()
    } else {
        format!("{previous} {fragment}")
    }
}

/// Vital signs and patient details captured alongside a query.
///
/// Fields are free text, as entered by the crew. Blank fields are omitted from the context.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Vitals {
    pub hr: Option<String>,
    pub systolic: Option<String>,
    pub diastolic: Option<String>,
    pub rr: Option<String>,
    pub spo2: Option<String>,
    pub age: Option<String>,
    pub gender: Option<String>,
    pub allergies: Option<String>,
}

impl Vitals {
    pub fn is_empty(&self) -> bool {
        self.context_line().is_empty()
    }

    /// Compact context line, e.g.
    /// `Vitals: HR 70 bpm, BP 120/80 mmHg, RR 16/min, SpO2 98%. Patient: 52 y/o male. Allergies: penicillin.`
    ///
    /// Returns an empty string when nothing has been entered.
    pub fn context_line(&self) -> String {
        let mut vitals = Vec::new();
        if let Some(hr) = filled(&self.hr) {
            vitals.push(format!("HR {hr} bpm"));
        }
        match (filled(&self.systolic), filled(&self.diastolic)) {
            (Some(sys), Some(dia)) => vitals.push(format!("BP {sys}/{dia} mmHg")),
            (Some(sys), None) => vitals.push(format!("BP {sys} systolic")),
            (None, Some(dia)) => vitals.push(format!("BP {dia} diastolic")),
            (None, None) => {}
        }
        if let Some(rr) = filled(&self.rr) {
            vitals.push(format!("RR {rr}/min"));
        }
        if let Some(spo2) = filled(&self.spo2) {
            vitals.push(format!("SpO2 {spo2}%"));
        }

        let mut patient = Vec::new();
        if let Some(age) = filled(&self.age) {
            patient.push(format!("{age} y/o"));
        }
        if let Some(gender) = filled(&self.gender) {
            patient.push(gender.to_owned());
        }

        let mut parts = Vec::new();
        if !vitals.is_empty() {
            parts.push(format!("Vitals: {}.", vitals.join(", ")));
        }
        if !patient.is_empty() {
            parts.push(format!("Patient: {}.", patient.join(" ")));
        }
        if let Some(allergies) = filled(&self.allergies) {
            parts.push(format!("Allergies: {allergies}."));
        }

        parts.join(" ")
    }
}

fn filled(field: &Option<String>) -> Option<&str> {
    field.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Build the prompt to submit, prefixing the vitals context when any is present.
///
/// # Errors
///
/// Returns `TextError::Empty` when the query itself is blank; vitals alone are not a query.
pub fn compose_query(query: &str, vitals: Option<&Vitals>) -> Result<PromptText, TextError> {
    let query = PromptText::new(query)?;
    let context = vitals.map(Vitals::context_line).unwrap_or_default();
    if context.is_empty() {
        return Ok(query);
    }
    PromptText::new(format!("{context}\n{query}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_vitals() -> Vitals {
        Vitals {
            hr: Some("70".into()),
            systolic: Some("120".into()),
            diastolic: Some("80".into()),
            rr: Some("16".into()),
            spo2: Some("98".into()),
            age: Some("52".into()),
            gender: Some("male".into()),
            allergies: Some("penicillin".into()),
        }
    }

    #[test]
    fn fragment_becomes_query_when_empty() {
        assert_eq!(append_fragment("", "chest pain"), "chest pain");
    }

    #[test]
    fn fragment_is_appended_with_a_space() {
        assert_eq!(
            append_fragment("chest pain", "and dizziness"),
            "chest pain and dizziness"
        );
    }

    #[test]
    fn context_line_includes_every_field() {
        assert_eq!(
            full_vitals().context_line(),
            "Vitals: HR 70 bpm, BP 120/80 mmHg, RR 16/min, SpO2 98%. Patient: 52 y/o male. Allergies: penicillin."
        );
    }

    #[test]
    fn blank_fields_are_skipped() {
        let vitals = Vitals {
            hr: Some("  ".into()),
            systolic: Some("90".into()),
            spo2: Some("91".into()),
            ..Vitals::default()
        };
        assert_eq!(vitals.context_line(), "Vitals: BP 90 systolic, SpO2 91%.");
        assert!(Vitals::default().is_empty());
    }

    #[test]
    fn compose_prefixes_vitals() {
        let prompt = compose_query("Chest pain + dizziness", Some(&full_vitals())).unwrap();
        assert!(prompt.as_str().starts_with("Vitals: HR 70 bpm"));
        assert!(prompt.as_str().ends_with("\nChest pain + dizziness"));
    }

    #[test]
    fn compose_without_vitals_is_the_query() {
        let prompt = compose_query("  CPR steps for infant ", Some(&Vitals::default())).unwrap();
        assert_eq!(prompt.as_str(), "CPR steps for infant");
    }

    #[test]
    fn blank_query_is_rejected_even_with_vitals() {
        assert!(compose_query("   ", Some(&full_vitals())).is_err());
    }
}
