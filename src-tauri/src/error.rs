use serde::Serialize;
use thiserror::Error;

/// Fixed remediation hint shown under every pipeline failure.
pub const REMEDIATION_HINT: &str = "Please check your API key and try again.";

pub const MISSING_CREDENTIAL_MESSAGE: &str = "Please enter your OpenAI API key.";

#[derive(Debug, Error)]
pub enum WellbeingError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("OpenAI API error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("No response from OpenAI")]
    EmptyCompletion,

    #[error("Invalid configuration value for {key}: {value}")]
    Config { key: String, value: String },

    #[error("Group chat has no participants")]
    NoParticipants,
}

pub type Result<T> = std::result::Result<T, WellbeingError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    MissingCredential,
    Pipeline,
}

/// Error payload handed back across the Tauri boundary.
#[derive(Debug, Clone, Serialize)]
pub struct SubmissionFailure {
    pub kind: FailureKind,
    pub message: String,
    pub hint: Option<String>,
}

impl SubmissionFailure {
    pub fn missing_credential() -> Self {
        Self {
            kind: FailureKind::MissingCredential,
            message: MISSING_CREDENTIAL_MESSAGE.to_string(),
            hint: None,
        }
    }

    pub fn pipeline(err: &WellbeingError) -> Self {
        Self {
            kind: FailureKind::Pipeline,
            message: format!("An error occurred: {}", err),
            hint: Some(REMEDIATION_HINT.to_string()),
        }
    }
}

impl From<WellbeingError> for SubmissionFailure {
    fn from(err: WellbeingError) -> Self {
        Self::pipeline(&err)
    }
}
