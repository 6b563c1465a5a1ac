//! Urgency categories and their keyword tables.
//!
//! Each [`UrgencyCategory`] owns an ordered list of keywords. Keywords match whole words only,
//! with ASCII case folding, so `caution` never matches inside `cautiously`.
//!
//! Tables can be overridden from YAML:
//!
//! ```yaml
//! critical: [critical, immediate]
//! caution: [monitor, check]
//! action: [provide]
//! ```

use crate::constants::{ACTION_KEYWORDS, CAUTION_KEYWORDS, CRITICAL_KEYWORDS};
use crate::error::{CoreError, CoreResult};
use regex::bytes::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

/// Category attached to a highlighted keyword.
///
/// Declaration order is priority order: a span claimed by `Critical` is never re-tagged by
/// `Caution` or `Action`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UrgencyCategory {
    Critical,
    Caution,
    Action,
}

impl UrgencyCategory {
    /// All categories in evaluation order.
    pub const ALL: [UrgencyCategory; 3] = [
        UrgencyCategory::Critical,
        UrgencyCategory::Caution,
        UrgencyCategory::Action,
    ];

    /// Stable identifier used on the wire.
    pub fn as_str(self) -> &'static str {
        match self {
            UrgencyCategory::Critical => "critical",
            UrgencyCategory::Caution => "caution",
            UrgencyCategory::Action => "action",
        }
    }

    /// Display style identifier for rendering surfaces.
    pub fn style_id(self) -> &'static str {
        match self {
            UrgencyCategory::Critical => "red",
            UrgencyCategory::Caution => "amber",
            UrgencyCategory::Action => "blue",
        }
    }

    /// Position in the priority order, 0 being the highest.
    pub fn priority(self) -> usize {
        self as usize
    }
}

impl std::fmt::Display for UrgencyCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for UrgencyCategory {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "critical" => Ok(UrgencyCategory::Critical),
            "caution" => Ok(UrgencyCategory::Caution),
            "action" => Ok(UrgencyCategory::Action),
            other => Err(CoreError::InvalidInput(format!(
                "unknown urgency category: {other}"
            ))),
        }
    }
}

/// Keyword lists for every urgency category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct KeywordTables {
    pub critical: Vec<String>,
    pub caution: Vec<String>,
    pub action: Vec<String>,
}

impl Default for KeywordTables {
    fn default() -> Self {
        fn owned(words: &[&str]) -> Vec<String> {
            words.iter().map(|w| (*w).to_owned()).collect()
        }

        Self {
            critical: owned(CRITICAL_KEYWORDS),
            caution: owned(CAUTION_KEYWORDS),
            action: owned(ACTION_KEYWORDS),
        }
    }
}

impl KeywordTables {
    /// Keywords configured for `category`, in declaration order.
    pub fn keywords(&self, category: UrgencyCategory) -> &[String] {
        match category {
            UrgencyCategory::Critical => &self.critical,
            UrgencyCategory::Caution => &self.caution,
            UrgencyCategory::Action => &self.action,
        }
    }

    /// Parse keyword tables from YAML.
    ///
    /// All three categories must be present. A category may have an empty list, in which case
    /// it never matches. Blank keywords are rejected.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::KeywordTable` with the failing path (e.g. `caution[2]`) when the YAML
    /// does not match the expected shape, or when a keyword is blank.
    pub fn from_yaml_str(yaml_text: &str) -> CoreResult<Self> {
        let deserializer = serde_yaml::Deserializer::from_str(yaml_text);

        let tables: KeywordTables = match serde_path_to_error::deserialize(deserializer) {
            Ok(parsed) => parsed,
            Err(err) => {
                let path = err.path().to_string();
                let source = err.into_inner();
                let path = if path.is_empty() {
                    "<root>"
                } else {
                    path.as_str()
                };
                return Err(CoreError::KeywordTable(format!(
                    "keyword table schema mismatch at {path}: {source}"
                )));
            }
        };

        tables.validate()?;
        Ok(tables)
    }

    fn validate(&self) -> CoreResult<()> {
        for category in UrgencyCategory::ALL {
            for (index, keyword) in self.keywords(category).iter().enumerate() {
                if keyword.trim().is_empty() {
                    return Err(CoreError::KeywordTable(format!(
                        "blank keyword at {}[{index}]",
                        category.as_str()
                    )));
                }
            }
        }
        Ok(())
    }
}

/// A category bound to its compiled whole-word pattern.
#[derive(Debug, Clone)]
pub struct CategoryRule {
    category: UrgencyCategory,
    pattern: Option<Regex>,
}

impl CategoryRule {
    /// Compile the keyword list for `category`.
    ///
    /// Keywords are matched literally, ASCII case-insensitively and bounded by ASCII word
    /// boundaries. Earlier keywords win when two alternatives start at the same offset.
    pub fn compile(category: UrgencyCategory, keywords: &[String]) -> CoreResult<Self> {
        let alternatives: Vec<String> = keywords
            .iter()
            .map(|k| k.trim())
            .filter(|k| !k.is_empty())
            .map(escape_ascii_literal)
            .collect();

        if alternatives.is_empty() {
            return Ok(Self {
                category,
                pattern: None,
            });
        }

        let source = format!(r"\b(?:{})\b", alternatives.join("|"));
        let pattern = RegexBuilder::new(&source)
            .case_insensitive(true)
            .unicode(false)
            .build()?;

        Ok(Self {
            category,
            pattern: Some(pattern),
        })
    }

    pub fn category(&self) -> UrgencyCategory {
        self.category
    }

    /// Byte ranges of every non-overlapping match in `line`, left to right.
    ///
    /// Ranges always fall on `char` boundaries: a match covers a complete keyword, and keyword
    /// bytes outside ASCII are matched verbatim.
    pub fn find_spans(&self, line: &str) -> Vec<std::ops::Range<usize>> {
        match &self.pattern {
            Some(pattern) => pattern
                .find_iter(line.as_bytes())
                .map(|m| m.range())
                .filter(|r| !r.is_empty())
                .collect(),
            None => Vec::new(),
        }
    }
}

/// Compile one rule per category, in priority order.
pub fn compile_rules(tables: &KeywordTables) -> CoreResult<Vec<CategoryRule>> {
    UrgencyCategory::ALL
        .iter()
        .map(|&category| CategoryRule::compile(category, tables.keywords(category)))
        .collect()
}

// Unicode mode is off, so anything outside [A-Za-z0-9 ] is written as a byte escape.
fn escape_ascii_literal(keyword: &str) -> String {
    let mut out = String::with_capacity(keyword.len());
    for byte in keyword.bytes() {
        if byte.is_ascii_alphanumeric() || byte == b' ' {
            out.push(byte as char);
        } else {
            let _ = write!(out, r"\x{byte:02X}");
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(category: UrgencyCategory, words: &[&str]) -> CategoryRule {
        let words: Vec<String> = words.iter().map(|w| w.to_string()).collect();
        CategoryRule::compile(category, &words).expect("compile")
    }

    #[test]
    fn default_tables_follow_priority_order() {
        let rules = compile_rules(&KeywordTables::default()).unwrap();
        let order: Vec<_> = rules.iter().map(|r| r.category()).collect();
        assert_eq!(order, UrgencyCategory::ALL.to_vec());
    }

    #[test]
    fn matches_whole_words_case_insensitively() {
        let caution = rule(UrgencyCategory::Caution, &["caution", "monitor"]);
        let line = "CAUTION: proceed cautiously and Monitor closely";
        let spans = caution.find_spans(line);
        let words: Vec<&str> = spans.iter().map(|r| &line[r.clone()]).collect();
        assert_eq!(words, vec!["CAUTION", "Monitor"]);
    }

    #[test]
    fn hyphenated_keywords_match_literally() {
        let critical = rule(UrgencyCategory::Critical, &["life-threatening"]);
        let line = "This is Life-Threatening. Not lifeXthreatening.";
        let spans = critical.find_spans(line);
        assert_eq!(spans.len(), 1);
        assert_eq!(&line[spans[0].clone()], "Life-Threatening");
    }

    #[test]
    fn regex_metacharacters_are_escaped() {
        let action = rule(UrgencyCategory::Action, &["o2 (high)"]);
        assert!(action.find_spans("give o2 high now").is_empty());
        assert_eq!(action.find_spans("give o2 (high) now").len(), 0);
        // Trailing ')' is not a word character, so no boundary follows it.
        let action = rule(UrgencyCategory::Action, &["o2 (high"]);
        assert_eq!(action.find_spans("give o2 (high) now").len(), 1);
    }

    #[test]
    fn non_ascii_neighbours_count_as_word_boundaries() {
        let critical = rule(UrgencyCategory::Critical, &["urgent"]);
        let line = "éurgent";
        let spans = critical.find_spans(line);
        assert_eq!(spans.len(), 1);
        assert_eq!(&line[spans[0].clone()], "urgent");
    }

    #[test]
    fn empty_keyword_list_never_matches() {
        let action = rule(UrgencyCategory::Action, &[]);
        assert!(action.find_spans("provide ensure consider").is_empty());
    }

    #[test]
    fn parses_yaml_tables() {
        let yaml = "critical: [stat]\ncaution: [watch, 'heart rate']\naction: []\n";
        let tables = KeywordTables::from_yaml_str(yaml).unwrap();
        assert_eq!(tables.critical, vec!["stat"]);
        assert_eq!(tables.caution, vec!["watch", "heart rate"]);
        assert!(tables.action.is_empty());
    }

    #[test]
    fn yaml_missing_category_is_rejected() {
        let err = KeywordTables::from_yaml_str("critical: [stat]\ncaution: []\n").unwrap_err();
        match err {
            CoreError::KeywordTable(msg) => assert!(msg.contains("action")),
            other => panic!("expected KeywordTable error, got {other:?}"),
        }
    }

    #[test]
    fn yaml_blank_keyword_is_rejected() {
        let err = KeywordTables::from_yaml_str("critical: []\ncaution: [watch, '  ']\naction: []\n")
            .unwrap_err();
        match err {
            CoreError::KeywordTable(msg) => assert!(msg.contains("caution[1]")),
            other => panic!("expected KeywordTable error, got {other:?}"),
        }
    }

    #[test]
    fn category_round_trips_through_str() {
        for category in UrgencyCategory::ALL {
            assert_eq!(category.as_str().parse::<UrgencyCategory>().unwrap(), category);
        }
        assert!("urgentish".parse::<UrgencyCategory>().is_err());
    }
}
