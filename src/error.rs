//! Error handling for the smart ATS pipeline

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SmartAtsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Document format error: {0}")]
    DocumentFormat(String),

    #[error("Template substitution error: {0}")]
    TemplateSubstitution(String),

    #[error("Generation service error: {0}")]
    TransientService(String),

    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Output formatting error: {0}")]
    OutputFormatting(String),
}

pub type Result<T> = std::result::Result<T, SmartAtsError>;

impl SmartAtsError {
    /// Message shown to the person at the keyboard, as opposed to the
    /// `Display` text which goes to the log.
    pub fn user_message(&self) -> String {
        match self {
            SmartAtsError::DocumentFormat(_) => {
                "Could not read the uploaded file. Please upload a valid PDF resume.".to_string()
            }
            SmartAtsError::TemplateSubstitution(detail) => {
                format!("Internal error while preparing the analysis prompt: {}", detail)
            }
            SmartAtsError::TransientService(detail) => format!(
                "The generation service is unavailable right now ({}). Please try again in a moment.",
                detail
            ),
            SmartAtsError::Authentication(detail) => format!(
                "The API key was rejected ({}). Check GOOGLE_API_KEY in your environment or .env file.",
                detail
            ),
            SmartAtsError::Configuration(detail) => format!("Configuration problem: {}", detail),
            SmartAtsError::InvalidInput(detail) => detail.clone(),
            other => other.to_string(),
        }
    }

    /// Process exit code for the CLI: 2 for configuration problems, 3 for
    /// unusable input, 4 for service failures, 1 otherwise.
    pub fn exit_code(&self) -> i32 {
        match self {
            SmartAtsError::Configuration(_) | SmartAtsError::Authentication(_) => 2,
            SmartAtsError::DocumentFormat(_) | SmartAtsError::InvalidInput(_) => 3,
            SmartAtsError::TransientService(_) => 4,
            _ => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_format_hides_parser_detail_from_user() {
        let err = SmartAtsError::DocumentFormat("invalid file header".into());
        assert!(err.user_message().contains("Could not read the uploaded file"));
        assert!(!err.user_message().contains("invalid file header"));
        assert!(err.to_string().contains("invalid file header"));
    }

    #[test]
    fn transient_error_suggests_retry() {
        let err = SmartAtsError::TransientService("HTTP 503".into());
        assert!(err.user_message().contains("try again"));
        assert_eq!(err.exit_code(), 4);
    }

    #[test]
    fn authentication_is_reported_as_configuration_problem() {
        let err = SmartAtsError::Authentication("HTTP 403".into());
        assert!(err.user_message().contains("GOOGLE_API_KEY"));
        assert_eq!(err.exit_code(), SmartAtsError::Configuration(String::new()).exit_code());
    }
}
