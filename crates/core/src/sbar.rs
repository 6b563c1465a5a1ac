//! SBAR case summaries and their plain-text export format.
//!
//! The export format is consumed by clipboard and hand-off tooling and must not drift:
//!
//! ```text
//! SITUATION:
//! <situation>
//!
//! BACKGROUND:
//! <background>
//!
//! ASSESSMENT:
//! <assessment>
//!
//! RECOMMENDATION:
//! <recommendation>
//! ```

use crate::constants::{
    ASSESSMENT_HEADER, BACKGROUND_HEADER, RECOMMENDATION_HEADER, SITUATION_HEADER,
};
use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};

/// Structured Situation / Background / Assessment / Recommendation summary.
///
/// Every field is always present. An empty string is a valid, if degraded, value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseSummary {
    pub situation: String,
    pub background: String,
    pub assessment: String,
    pub recommendation: String,
}

impl CaseSummary {
    /// Render the summary as the plain-text export block.
    ///
    /// Sections are separated by a blank line and there is no trailing newline.
    pub fn export(&self) -> String {
        format!(
            "{SITUATION_HEADER}\n{}\n\n{BACKGROUND_HEADER}\n{}\n\n{ASSESSMENT_HEADER}\n{}\n\n{RECOMMENDATION_HEADER}\n{}",
            self.situation, self.background, self.assessment, self.recommendation
        )
    }

    /// Parse an export block produced by [`CaseSummary::export`].
    ///
    /// Headers must appear in order, each on its own line. Values run until the blank line
    /// preceding the next header, and the recommendation runs to the end of the input, so it
    /// may hold any text. Situation, background and assessment round-trip only when none of
    /// their lines equals a later header; such a line is read as that section's start.
    /// Leading text before the first header and `\r\n` line endings are tolerated.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::MalformedExport` naming the first header that is missing or out of
    /// order.
    pub fn parse_export(input: &str) -> CoreResult<Self> {
        let normalised = input.replace("\r\n", "\n");
        let lines: Vec<&str> = normalised.split('\n').collect();

        let headers = [
            SITUATION_HEADER,
            BACKGROUND_HEADER,
            ASSESSMENT_HEADER,
            RECOMMENDATION_HEADER,
        ];

        let mut positions = Vec::with_capacity(headers.len());
        let mut search_from = 0;
        for header in headers {
            let found = lines[search_from..]
                .iter()
                .position(|line| line.trim_end() == header)
                .map(|offset| search_from + offset)
                .ok_or_else(|| {
                    CoreError::MalformedExport(format!("missing or out-of-order {header}"))
                })?;
            positions.push(found);
            search_from = found + 1;
        }

        let section = |index: usize| -> String {
            let start = positions[index] + 1;
            let end = positions.get(index + 1).copied().unwrap_or(lines.len());
            let mut body = &lines[start..end];
            // The separator before the next header is a single blank line.
            if index + 1 < positions.len() {
                if let Some((last, rest)) = body.split_last() {
                    if last.is_empty() {
                        body = rest;
                    }
                }
            }
            body.join("\n")
        };

        Ok(Self {
            situation: section(0),
            background: section(1),
            assessment: section(2),
            recommendation: section(3),
        })
    }
}
