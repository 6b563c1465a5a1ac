//! Constants used throughout the LLaMAid core crate.
//!
//! Keyword literals, section headers and fixed texts live here so that the annotator,
//! classifier and export format stay consistent with each other.

/// Critical urgency keywords, rendered red.
pub const CRITICAL_KEYWORDS: &[&str] = &[
    "critical",
    "immediate",
    "emergency",
    "urgent",
    "severe",
    "life-threatening",
];

/// Caution keywords, rendered amber.
pub const CAUTION_KEYWORDS: &[&str] = &[
    "monitor", "check", "assess", "potential", "caution", "warning", "careful", "risk", "danger",
];

/// Important action keywords, rendered blue.
pub const ACTION_KEYWORDS: &[&str] = &[
    "consider",
    "provide",
    "administer",
    "position",
    "prepare",
    "continue",
    "ensure",
];

pub const SITUATION_HEADER: &str = "SITUATION:";
pub const BACKGROUND_HEADER: &str = "BACKGROUND:";
pub const ASSESSMENT_HEADER: &str = "ASSESSMENT:";
pub const RECOMMENDATION_HEADER: &str = "RECOMMENDATION:";

/// Text shown in place of an assistant response when the upstream call fails.
pub const FALLBACK_RESPONSE: &str = "⚠️ Error: Unable to connect to the backend.";

/// Canned queries offered to the crew as one-tap shortcuts.
pub const PRESET_QUERIES: &[&str] = &[
    "Chest pain + dizziness",
    "CPR steps for infant",
    "Drug interaction: Epi + beta blockers",
];

/// Environment variable naming the overlap policy.
pub const OVERLAP_POLICY_ENV: &str = "LLAMAID_OVERLAP_POLICY";

/// Environment variable naming a YAML keyword-table override.
pub const KEYWORDS_FILE_ENV: &str = "LLAMAID_KEYWORDS_FILE";
