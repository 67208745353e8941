//! Error types for plurshare

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ShareError>;

#[derive(Error, Debug)]
pub enum ShareError {
    /// Reported to the host when the session finishes. The host API does not
    /// distinguish a completed share from a canceled one.
    #[error("Share session canceled")]
    Canceled,

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("Logging error: {0}")]
    Logging(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl ShareError {
    /// Returns the appropriate exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            ShareError::Canceled => 0,
            ShareError::InvalidInput(_) => 3,
            ShareError::Config(_) => 1,
            ShareError::Extraction(_) => 1,
            ShareError::Logging(_) => 1,
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },
}

/// Failure of a single typed extraction.
///
/// These never leave the ingestion pipeline: the extraction is skipped and
/// its siblings carry on.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractionError {
    #[error("Provider failed to load {type_id}: {message}")]
    Load { type_id: String, message: String },

    #[error("Unexpected item for {expected}: got {actual}")]
    UnexpectedType { expected: String, actual: String },

    #[error("Image reference is not a local file: {0}")]
    UnsupportedReference(String),

    #[error("Image too large: {size} bytes (limit {limit})")]
    TooLarge { size: u64, limit: u64 },

    #[error("Failed to read image data: {0}")]
    Read(String),

    #[error("Failed to decode image: {0}")]
    Decode(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_code_canceled_is_success() {
        assert_eq!(ShareError::Canceled.exit_code(), 0);
    }

    #[test]
    fn test_exit_code_invalid_input() {
        let error = ShareError::InvalidInput("Unknown scene".to_string());
        assert_eq!(error.exit_code(), 3);
    }

    #[test]
    fn test_exit_code_config_error() {
        let error = ShareError::Config(ConfigError::MissingField("config directory".to_string()));
        assert_eq!(error.exit_code(), 1);
    }

    #[test]
    fn test_error_message_formatting_extraction() {
        let error = ShareError::Extraction(ExtractionError::UnexpectedType {
            expected: "public.plain-text".to_string(),
            actual: "image".to_string(),
        });
        assert_eq!(
            error.to_string(),
            "Extraction error: Unexpected item for public.plain-text: got image"
        );
    }

    #[test]
    fn test_error_message_formatting_too_large() {
        let error = ExtractionError::TooLarge { size: 10, limit: 5 };
        assert_eq!(error.to_string(), "Image too large: 10 bytes (limit 5)");
    }
}
