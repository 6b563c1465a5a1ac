#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("failed to read keyword file: {0}")]
    FileRead(std::io::Error),
    #[error("invalid keyword table: {0}")]
    KeywordTable(String),
    #[error("failed to compile keyword pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
    #[error("malformed SBAR export: {0}")]
    MalformedExport(String),
}

pub type CoreResult<T> = std::result::Result<T, CoreError>;
