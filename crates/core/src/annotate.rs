//! Span annotation of assistant responses.
//!
//! Text is split on `'\n'` and every line is scanned for urgency keywords. The result is a
//! sequence of [`AnnotatedLine`]s whose [`Segment`]s concatenate back to the original line
//! byte-for-byte; tags only mark spans, they never alter text.
//!
//! Overlapping keyword matches are resolved by [`OverlapPolicy`]. Under the default policy
//! categories are processed in priority order and any later match that touches a claimed span
//! is dropped whole.

use crate::error::CoreResult;
use crate::keywords::{compile_rules, CategoryRule, KeywordTables, UrgencyCategory};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ops::Range;

static DEFAULT_ANNOTATOR: Lazy<Annotator> = Lazy::new(|| {
    Annotator::new(&KeywordTables::default(), OverlapPolicy::default())
        .expect("built-in keyword tables compile")
});

/// The atomic unit of an annotated line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Segment {
    Plain { text: String },
    Tagged { text: String, category: UrgencyCategory },
}

impl Segment {
    pub fn text(&self) -> &str {
        match self {
            Segment::Plain { text } | Segment::Tagged { text, .. } => text,
        }
    }

    /// Category of a tagged segment, `None` for plain text.
    pub fn category(&self) -> Option<UrgencyCategory> {
        match self {
            Segment::Plain { .. } => None,
            Segment::Tagged { category, .. } => Some(*category),
        }
    }
}

/// One source line as a run of segments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotatedLine {
    pub segments: Vec<Segment>,
    /// Whether a line break followed this line in the source. False on the last line.
    pub line_break: bool,
}

impl AnnotatedLine {
    /// Reconstruct the original line text.
    pub fn text(&self) -> String {
        self.segments.iter().map(Segment::text).collect()
    }

    pub fn tagged(&self) -> impl Iterator<Item = (&str, UrgencyCategory)> {
        self.segments
            .iter()
            .filter_map(|s| s.category().map(|c| (s.text(), c)))
    }
}

/// How to resolve keyword matches that overlap each other on the same line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OverlapPolicy {
    /// Categories claim spans in priority order; a later match intersecting any claimed span
    /// is dropped whole.
    #[default]
    DropIntersecting,
    /// Matches from all categories compete by start offset. Ties go to the higher-priority
    /// category, then to the longer match. A match intersecting an accepted one is dropped.
    LeftmostFirst,
}

impl OverlapPolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            OverlapPolicy::DropIntersecting => "drop-intersecting",
            OverlapPolicy::LeftmostFirst => "leftmost-first",
        }
    }
}

impl std::str::FromStr for OverlapPolicy {
    type Err = crate::CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "drop-intersecting" => Ok(OverlapPolicy::DropIntersecting),
            "leftmost-first" => Ok(OverlapPolicy::LeftmostFirst),
            other => Err(crate::CoreError::InvalidInput(format!(
                "unknown overlap policy: {other} (expected drop-intersecting or leftmost-first)"
            ))),
        }
    }
}

/// Keyword annotator over a fixed set of compiled category rules.
#[derive(Debug, Clone)]
pub struct Annotator {
    rules: Vec<CategoryRule>,
    policy: OverlapPolicy,
}

impl Default for Annotator {
    fn default() -> Self {
        DEFAULT_ANNOTATOR.clone()
    }
}

impl Annotator {
    /// Compile `tables` into an annotator using `policy`.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidPattern` if a keyword cannot be compiled.
    pub fn new(tables: &KeywordTables, policy: OverlapPolicy) -> CoreResult<Self> {
        Ok(Self {
            rules: compile_rules(tables)?,
            policy,
        })
    }

    /// Annotate every line of `text`.
    ///
    /// Always returns at least one line; the empty string yields one line holding a single
    /// empty plain segment.
    pub fn annotate(&self, text: &str) -> Vec<AnnotatedLine> {
        let mut lines = text.split('\n').peekable();
        let mut out = Vec::new();

        while let Some(line) = lines.next() {
            out.push(AnnotatedLine {
                segments: self.annotate_line(line),
                line_break: lines.peek().is_some(),
            });
        }

        out
    }

    /// Annotate a single line. `line` must not contain `'\n'`.
    pub fn annotate_line(&self, line: &str) -> Vec<Segment> {
        let claims = match self.policy {
            OverlapPolicy::DropIntersecting => self.claim_by_priority(line),
            OverlapPolicy::LeftmostFirst => self.claim_leftmost(line),
        };
        segments_from_claims(line, claims)
    }

    fn claim_by_priority(&self, line: &str) -> BTreeMap<usize, Claim> {
        let mut claimed: BTreeMap<usize, Claim> = BTreeMap::new();

        for rule in &self.rules {
            for span in rule.find_spans(line) {
                if intersects_claimed(&claimed, &span) {
                    continue;
                }
                claimed.insert(
                    span.start,
                    Claim {
                        end: span.end,
                        category: rule.category(),
                    },
                );
            }
        }

        claimed
    }

    fn claim_leftmost(&self, line: &str) -> BTreeMap<usize, Claim> {
        let mut candidates: Vec<(Range<usize>, UrgencyCategory)> = self
            .rules
            .iter()
            .flat_map(|rule| {
                rule.find_spans(line)
                    .into_iter()
                    .map(move |span| (span, rule.category()))
            })
            .collect();

        candidates.sort_by(|(a, ca), (b, cb)| {
            a.start
                .cmp(&b.start)
                .then(ca.priority().cmp(&cb.priority()))
                .then(b.len().cmp(&a.len()))
        });

        let mut claimed = BTreeMap::new();
        let mut last_end = 0;
        for (span, category) in candidates {
            if span.start < last_end {
                continue;
            }
            last_end = span.end;
            claimed.insert(
                span.start,
                Claim {
                    end: span.end,
                    category,
                },
            );
        }

        claimed
    }
}

/// Annotate `text` with the built-in keyword tables and the default overlap policy.
pub fn annotate(text: &str) -> Vec<AnnotatedLine> {
    DEFAULT_ANNOTATOR.annotate(text)
}

/// Reassemble the source text from annotated lines.
pub fn render_plain(lines: &[AnnotatedLine]) -> String {
    let mut out = String::new();
    for line in lines {
        out.push_str(&line.text());
        if line.line_break {
            out.push('\n');
        }
    }
    out
}

/// Render annotated lines with bracket markup, e.g. `[CRITICAL:urgent]`, for terminals and
/// plain-text logs.
pub fn render_marked(lines: &[AnnotatedLine]) -> String {
    let mut out = String::new();
    for line in lines {
        for segment in &line.segments {
            match segment {
                Segment::Plain { text } => out.push_str(text),
                Segment::Tagged { text, category } => {
                    out.push('[');
                    out.push_str(&category.as_str().to_ascii_uppercase());
                    out.push(':');
                    out.push_str(text);
                    out.push(']');
                }
            }
        }
        if line.line_break {
            out.push('\n');
        }
    }
    out
}

#[derive(Debug, Clone, Copy)]
struct Claim {
    end: usize,
    category: UrgencyCategory,
}

// Claimed spans never overlap, so only the nearest claim starting before `span.end` can
// intersect it.
fn intersects_claimed(claimed: &BTreeMap<usize, Claim>, span: &Range<usize>) -> bool {
    claimed
        .range(..span.end)
        .next_back()
        .is_some_and(|(_, claim)| claim.end > span.start)
}

fn segments_from_claims(line: &str, claims: BTreeMap<usize, Claim>) -> Vec<Segment> {
    let mut segments = Vec::with_capacity(claims.len() * 2 + 1);
    let mut cursor = 0;

    for (start, claim) in claims {
        if start > cursor {
            segments.push(Segment::Plain {
                text: line[cursor..start].to_owned(),
            });
        }
        segments.push(Segment::Tagged {
            text: line[start..claim.end].to_owned(),
            category: claim.category,
        });
        cursor = claim.end;
    }

    if cursor < line.len() || segments.is_empty() {
        segments.push(Segment::Plain {
            text: line[cursor..].to_owned(),
        });
    }

    segments
}
