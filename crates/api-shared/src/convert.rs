//! Conversions from core values into protobuf wire types.

use crate::pb;
use llamaid_core::{AnnotatedLine, CaseSummary, Scenario, Segment};

impl From<&Segment> for pb::Segment {
    fn from(segment: &Segment) -> Self {
        let category = segment.category();
        pb::Segment {
            text: segment.text().to_owned(),
            category: category.map(|c| c.as_str().to_owned()).unwrap_or_default(),
            style: category.map(|c| c.style_id().to_owned()).unwrap_or_default(),
        }
    }
}

impl From<&AnnotatedLine> for pb::AnnotatedLine {
    fn from(line: &AnnotatedLine) -> Self {
        pb::AnnotatedLine {
            segments: line.segments.iter().map(pb::Segment::from).collect(),
            line_break: line.line_break,
        }
    }
}

impl From<CaseSummary> for pb::CaseSummary {
    fn from(summary: CaseSummary) -> Self {
        pb::CaseSummary {
            situation: summary.situation,
            background: summary.background,
            assessment: summary.assessment,
            recommendation: summary.recommendation,
        }
    }
}

/// Build an `AnnotateRes` from annotated lines.
pub fn annotate_res(lines: &[AnnotatedLine]) -> pb::AnnotateRes {
    pb::AnnotateRes {
        lines: lines.iter().map(pb::AnnotatedLine::from).collect(),
    }
}

/// Build a `ClassifyRes` from a classification result.
pub fn classify_res(scenario: Scenario, summary: CaseSummary) -> pb::ClassifyRes {
    pb::ClassifyRes {
        scenario: scenario.as_str().to_owned(),
        summary: Some(summary.into()),
    }
}
