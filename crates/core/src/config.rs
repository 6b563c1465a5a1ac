//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into [`crate::TextEngine`].
//! Nothing here reads process-wide environment variables; binaries read them and hand the raw
//! values to the helpers below.

use crate::annotate::OverlapPolicy;
use crate::keywords::KeywordTables;
use crate::{CoreError, CoreResult};
use std::path::PathBuf;

/// Core configuration resolved at startup.
#[derive(Clone, Debug, Default)]
pub struct CoreConfig {
    overlap_policy: OverlapPolicy,
    keyword_tables: KeywordTables,
}

impl CoreConfig {
    pub fn new(overlap_policy: OverlapPolicy, keyword_tables: KeywordTables) -> Self {
        Self {
            overlap_policy,
            keyword_tables,
        }
    }

    pub fn overlap_policy(&self) -> OverlapPolicy {
        self.overlap_policy
    }

    pub fn keyword_tables(&self) -> &KeywordTables {
        &self.keyword_tables
    }
}

/// Parse the overlap policy from an optional string value.
///
/// If `value` is `None` or empty/whitespace, returns the default policy.
pub fn overlap_policy_from_env_value(value: Option<String>) -> CoreResult<OverlapPolicy> {
    let value = value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());
    let parsed = value.map(|v| v.parse::<OverlapPolicy>()).transpose()?;

    Ok(parsed.unwrap_or_default())
}

/// Load keyword tables from an optional YAML file, falling back to the built-in tables.
///
/// # Errors
///
/// Returns `CoreError::FileRead` if the file cannot be read, or `CoreError::KeywordTable` if
/// its contents are not a valid keyword table.
pub fn keyword_tables_from_path(path: Option<PathBuf>) -> CoreResult<KeywordTables> {
    let Some(path) = path else {
        return Ok(KeywordTables::default());
    };

    if !path.is_file() {
        return Err(CoreError::InvalidInput(format!(
            "keyword file is not a regular file: {}",
            path.display()
        )));
    }

    let contents = std::fs::read_to_string(&path).map_err(CoreError::FileRead)?;
    let tables = KeywordTables::from_yaml_str(&contents)?;
    tracing::debug!(
        "loaded keyword tables from {} ({} critical, {} caution, {} action)",
        path.display(),
        tables.critical.len(),
        tables.caution.len(),
        tables.action.len()
    );
    Ok(tables)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_policy_value_uses_default() {
        assert_eq!(
            overlap_policy_from_env_value(None).unwrap(),
            OverlapPolicy::DropIntersecting
        );
        assert_eq!(
            overlap_policy_from_env_value(Some("   ".into())).unwrap(),
            OverlapPolicy::DropIntersecting
        );
    }

    #[test]
    fn explicit_policy_value_is_parsed() {
        assert_eq!(
            overlap_policy_from_env_value(Some("leftmost-first".into())).unwrap(),
            OverlapPolicy::LeftmostFirst
        );
        assert!(matches!(
            overlap_policy_from_env_value(Some("sideways".into())),
            Err(CoreError::InvalidInput(_))
        ));
    }

    #[test]
    fn no_keyword_file_uses_builtin_tables() {
        assert_eq!(
            keyword_tables_from_path(None).unwrap(),
            KeywordTables::default()
        );
    }

    #[test]
    fn keyword_file_is_loaded() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "critical: [stat]\ncaution: [watch]\naction: [give]").unwrap();

        let tables = keyword_tables_from_path(Some(file.path().to_path_buf())).unwrap();
        assert_eq!(tables.critical, vec!["stat"]);
        assert_eq!(tables.action, vec!["give"]);
    }

    #[test]
    fn keyword_directory_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let err = keyword_tables_from_path(Some(dir.path().to_path_buf())).unwrap_err();
        assert!(matches!(err, CoreError::InvalidInput(_)));
    }
}
