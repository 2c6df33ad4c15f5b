use thiserror::Error;

#[derive(Error, Debug)]
pub enum CovsummaryError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error in {path}: {source}")]
    Json {
        path: String,
        source: serde_json::Error,
    },

    #[error("Invalid path pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    #[error("Unreadable path: {0}")]
    Glob(#[from] glob::GlobError),

    #[error("No coverage files found matching '{0}'")]
    NoCoverageFiles(String),

    #[error("Input required and not supplied: {0}")]
    MissingInput(String),

    #[error("Environment variable not set: {0}")]
    MissingEnv(String),

    #[error("Output '{0}' contains its heredoc delimiter")]
    OutputDelimiter(String),

    #[error("Input '{name}' must be {expected}, got '{value}'")]
    InvalidInput {
        name: String,
        value: String,
        expected: &'static str,
    },

    #[error("GitHub API error (HTTP {status}): {body}")]
    Api { status: u16, body: String },

    #[error("GitHub API request failed: {0}")]
    Transport(String),
}

pub type Result<T> = std::result::Result<T, CovsummaryError>;
