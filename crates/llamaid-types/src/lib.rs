//! Shared value types for LLaMAid crates.

/// Errors that can occur when creating validated text types.
#[derive(Debug, thiserror::Error)]
pub enum TextError {
    /// The input text was empty or contained only whitespace
    #[error("Prompt cannot be empty")]
    Empty,
}

/// A query that is allowed to be sent to the upstream assistant.
///
/// Blank queries are never submitted, so this type guarantees at least one non-whitespace
/// character. The input is trimmed of leading and trailing whitespace during construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptText(String);

impl PromptText {
    /// Creates a new `PromptText` from the given input.
    ///
    /// # Errors
    ///
    /// Returns `TextError::Empty` if the input is empty or contains only whitespace.
    pub fn new(input: impl AsRef<str>) -> Result<Self, TextError> {
        let trimmed = input.as_ref().trim();
        if trimmed.is_empty() {
            return Err(TextError::Empty);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the inner string as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl std::fmt::Display for PromptText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for PromptText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::str::FromStr for PromptText {
    type Err = TextError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl serde::Serialize for PromptText {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for PromptText {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        PromptText::new(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_surrounding_whitespace() {
        let prompt = PromptText::new("  Chest pain + dizziness \n").unwrap();
        assert_eq!(prompt.as_str(), "Chest pain + dizziness");
    }

    #[test]
    fn rejects_blank_input() {
        assert!(matches!(PromptText::new(""), Err(TextError::Empty)));
        assert!(matches!(PromptText::new(" \t\n"), Err(TextError::Empty)));
    }

    #[test]
    fn parses_via_from_str() {
        let prompt: PromptText = "CPR steps for infant".parse().unwrap();
        assert_eq!(prompt.to_string(), "CPR steps for infant");
    }
}
