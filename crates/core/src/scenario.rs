//! Scenario classification and SBAR structuring.
//!
//! Signatures are evaluated in a fixed order and the first one whose required terms all occur
//! in the text wins. There is no scoring: a response mentioning both infant CPR and cardiac
//! causes is a resuscitation case because that signature is checked first. The last signature
//! has no required terms and always matches.

use crate::sbar::CaseSummary;
use serde::{Deserialize, Serialize};

/// Clinical scenario recognised in an assistant response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scenario {
    Resuscitation,
    DrugInteraction,
    Cardiac,
    Generic,
}

impl Scenario {
    pub fn as_str(self) -> &'static str {
        match self {
            Scenario::Resuscitation => "resuscitation",
            Scenario::DrugInteraction => "drug_interaction",
            Scenario::Cardiac => "cardiac",
            Scenario::Generic => "generic",
        }
    }
}

impl std::fmt::Display for Scenario {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a scenario's recommendation comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recommendation {
    /// Fixed text, independent of the response.
    Canned(&'static str),
    /// The response minus its first line, which is taken to be a headline.
    StepsAfterHeadline,
}

impl Recommendation {
    fn produce(self, text: &str) -> String {
        match self {
            Recommendation::Canned(s) => s.to_owned(),
            Recommendation::StepsAfterHeadline => text
                .split_once('\n')
                .map(|(_, rest)| rest.to_owned())
                .unwrap_or_default(),
        }
    }
}

/// A classification rule: required terms plus the summary template it produces.
#[derive(Debug, Clone, Copy)]
pub struct ScenarioSignature {
    pub scenario: Scenario,
    /// Lower-case terms that must all occur as substrings. Empty for the catch-all.
    pub required: &'static [&'static str],
    pub situation: &'static str,
    pub background: &'static str,
    pub assessment: &'static str,
    pub recommendation: Recommendation,
}

impl ScenarioSignature {
    /// `lowered` must already be ASCII lower-cased.
    fn matches(&self, lowered: &str) -> bool {
        self.required.iter().all(|term| lowered.contains(term))
    }

    fn summarise(&self, text: &str) -> CaseSummary {
        CaseSummary {
            situation: self.situation.to_owned(),
            background: self.background.to_owned(),
            assessment: self.assessment.to_owned(),
            recommendation: self.recommendation.produce(text),
        }
    }
}

/// Signatures in evaluation order. The final entry is the catch-all.
pub static SIGNATURES: [ScenarioSignature; 4] = [
    ScenarioSignature {
        scenario: Scenario::Resuscitation,
        required: &["cpr", "infant"],
        situation: "Infant requiring cardiopulmonary resuscitation (CPR).",
        background: "Patient is an infant who is unresponsive and not breathing normally.",
        assessment: "Critical condition requiring immediate CPR intervention.",
        recommendation: Recommendation::StepsAfterHeadline,
    },
    ScenarioSignature {
        scenario: Scenario::DrugInteraction,
        required: &["epinephrine", "beta blocker"],
        situation: "Potential drug interaction between epinephrine and beta blockers.",
        background:
            "Patient may be on beta blocker medication and requires epinephrine administration.",
        assessment: "Risk of severe hypertension and reflex bradycardia due to interaction.",
        recommendation: Recommendation::Canned(
            "Consider reduced initial doses of epinephrine and careful monitoring. Monitor vital signs closely during administration.",
        ),
    },
    ScenarioSignature {
        scenario: Scenario::Cardiac,
        required: &["cardiac"],
        situation:
            "Patient presenting with chest pain and dizziness, suggesting potential cardiac event.",
        background:
            "Symptoms indicate possible acute coronary syndrome or other cardiac emergency.",
        assessment: "Potential cardiac event requiring immediate assessment and intervention.",
        recommendation: Recommendation::Canned(
            "Check vital signs immediately. Monitor blood pressure and heart rate. Consider 12-lead ECG if available. Position patient comfortably and provide oxygen if needed. Be prepared to administer aspirin if no contraindications exist.",
        ),
    },
    ScenarioSignature {
        scenario: Scenario::Generic,
        required: &[],
        situation: "Patient presenting with unspecified symptoms requiring assessment.",
        background: "Limited information available about patient history and current condition.",
        assessment: "Multiple potential conditions that require further evaluation.",
        recommendation: Recommendation::Canned(
            "Monitor vital signs and assess for additional symptoms. Consider the patient's medical history and current medications. Provide supportive care while conducting further assessment.",
        ),
    },
];

/// Classify `text` and report which scenario fired alongside its summary.
pub fn classify_with_scenario(text: &str) -> (Scenario, CaseSummary) {
    let lowered = text.to_ascii_lowercase();
    let signature = SIGNATURES
        .iter()
        .find(|s| s.matches(&lowered))
        .unwrap_or(&SIGNATURES[SIGNATURES.len() - 1]);

    (signature.scenario, signature.summarise(text))
}

/// Structure `text` into an SBAR case summary.
pub fn classify(text: &str) -> CaseSummary {
    classify_with_scenario(text).1
}
