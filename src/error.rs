//! Error types for rapidvoice.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum IntakeError {
    // Configuration errors
    #[error("Configuration file not found at {path}")]
    ConfigFileNotFound { path: String },

    #[error("Invalid configuration value for {key}: {message}")]
    ConfigInvalidValue { key: String, message: String },

    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    // Capture errors (microphone / recognition stream acquisition)
    #[error("Error accessing microphone: {message}")]
    Capture { message: String },

    // Input errors (caller handed the extractor nothing to work with)
    #[error("no speech text provided")]
    EmptySpeech,

    // Extraction service errors (transport or upstream failure)
    #[error("Gemini API error: {message}")]
    Service { message: String },

    // Format errors (reply did not contain a usable JSON object)
    #[error("{message}")]
    Format { message: String },

    // Submission gate
    #[error("required fields still missing: {}", missing.join(", "))]
    IncompleteRecord { missing: Vec<String> },

    #[error("invalid session state: {message}")]
    InvalidState { message: String },

    // General I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Generic error for cases not covered above
    #[error("{0}")]
    Other(String),
}

impl IntakeError {
    /// Format error for a reply with no JSON-object-shaped substring.
    pub fn no_json_object() -> Self {
        IntakeError::Format {
            message: "No JSON object found in response".to_string(),
        }
    }

    /// Format error for a reply whose JSON object carried no usable field.
    pub fn nothing_extracted() -> Self {
        IntakeError::Format {
            message: "No valid information extracted".to_string(),
        }
    }

    /// Format error for a JSON-shaped substring that failed to parse.
    pub fn parse_failed(detail: impl std::fmt::Display) -> Self {
        IntakeError::Format {
            message: format!("Failed to parse response: {}", detail),
        }
    }
}

// Type alias for convenience
pub type Result<T> = std::result::Result<T, IntakeError>;
