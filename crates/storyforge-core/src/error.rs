/// Core error types for the Storyforge engine.
use std::path::PathBuf;

/// A specialized Result type for Storyforge operations.
pub type StoryResult<T> = Result<T, StoryError>;

/// Top-level error type encompassing all Storyforge subsystems.
#[derive(Debug, thiserror::Error)]
pub enum StoryError {
    /// Misuse of the authoring API (nested scopes, duplicate video, ...).
    #[error("contract violation: {0}")]
    ContractViolation(String),

    #[error("script '{script}' failed: {message}")]
    Script { script: String, message: String },

    #[error("asset error: {message} ({path:?})")]
    Asset { message: String, path: PathBuf },

    #[error("encode error: {0}")]
    Encode(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("generation cancelled")]
    Cancelled,

    #[error("{0}")]
    Other(String),
}

impl StoryError {
    /// Create a contract violation error.
    pub fn contract(message: impl Into<String>) -> Self {
        StoryError::ContractViolation(message.into())
    }

    /// Create a script fault attributed to a named script.
    pub fn script(script: impl Into<String>, message: impl Into<String>) -> Self {
        StoryError::Script {
            script: script.into(),
            message: message.into(),
        }
    }

    /// Create an asset error.
    pub fn asset(message: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        StoryError::Asset {
            message: message.into(),
            path: path.into(),
        }
    }

    /// True for errors raised by misuse of the authoring API.
    pub fn is_contract_violation(&self) -> bool {
        matches!(self, StoryError::ContractViolation(_))
    }
}

impl From<toml::de::Error> for StoryError {
    fn from(err: toml::de::Error) -> Self {
        StoryError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for StoryError {
    fn from(err: toml::ser::Error) -> Self {
        StoryError::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_error_display() {
        let err = StoryError::script("intro", "division by zero");
        assert_eq!(err.to_string(), "script 'intro' failed: division by zero");
    }

    #[test]
    fn test_contract_violation() {
        let err = StoryError::contract("loop group already active");
        assert!(err.is_contract_violation());
        assert!(err.to_string().starts_with("contract violation"));
    }

    #[test]
    fn test_asset_error_display() {
        let err = StoryError::asset("file not found", "sb/glow.png");
        assert!(err.to_string().contains("file not found"));
        assert!(!err.is_contract_violation());
    }
}
