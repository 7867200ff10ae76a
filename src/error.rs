// src/error.rs
//! Error kinds surfaced to the page, each with a stable code and user hints

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractionError {
    #[error("No text could be extracted from the PDF")]
    Empty,
    #[error("The PDF is password protected")]
    Encrypted,
    #[error("The PDF appears to be corrupted: {0}")]
    Corrupted(String),
    #[error("Failed to extract text from PDF: {0}")]
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MatchError {
    #[error("Please upload a CV before analyzing")]
    MissingCv,

    #[error("Please enter a job description before analyzing")]
    MissingJobDescription,

    #[error("Please provide an API key before analyzing")]
    MissingCredential,

    #[error("Please upload a PDF file only (received: {received})")]
    InvalidFileType { received: String },

    #[error("File size {size} bytes exceeds the {limit} bytes limit")]
    FileTooLarge { size: u64, limit: u64 },

    #[error("Another operation is still running for this session")]
    Busy,

    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error("{message}")]
    Remote { status: u16, message: String },

    #[error("Failed to reach the analysis service: {0}")]
    Transport(String),

    #[error("Failed to parse analysis results: {0}")]
    Parse(String),

    #[error("Analysis response is incomplete: {0}")]
    InvalidResponse(String),

    #[error("Cannot apply {event} while {from}")]
    InvalidTransition { from: String, event: String },

    #[error("Session not found")]
    SessionNotFound,

    #[error("No analysis result available yet")]
    NoResult,
}

impl MatchError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingCv => "MISSING_CV",
            Self::MissingJobDescription => "MISSING_JOB_DESCRIPTION",
            Self::MissingCredential => "MISSING_CREDENTIAL",
            Self::InvalidFileType { .. } => "INVALID_FILE_TYPE",
            Self::FileTooLarge { .. } => "FILE_TOO_LARGE",
            Self::Busy => "BUSY",
            Self::Extraction(_) => "EXTRACTION_FAILED",
            Self::Remote { .. } => "REMOTE_ERROR",
            Self::Transport(_) => "TRANSPORT_ERROR",
            Self::Parse(_) => "PARSE_FAILED",
            Self::InvalidResponse(_) => "INVALID_RESPONSE",
            Self::InvalidTransition { .. } => "INVALID_TRANSITION",
            Self::SessionNotFound => "SESSION_NOT_FOUND",
            Self::NoResult => "NO_RESULT",
        }
    }

    pub fn suggestions(&self) -> Vec<String> {
        let hints: &[&str] = match self {
            Self::MissingCv => &["Upload your CV as a PDF file"],
            Self::MissingJobDescription => &["Paste the job posting text"],
            Self::MissingCredential => &["Enter your API key for the analysis service"],
            Self::InvalidFileType { .. } => &["Upload a PDF file (.pdf)"],
            Self::FileTooLarge { .. } => &[
                "Compress your CV file",
                "Use a smaller file size (max 10MB)",
            ],
            Self::Busy => &["Wait for the current operation to finish"],
            Self::Extraction(ExtractionError::Encrypted) => {
                &["Remove the password protection and upload again"]
            }
            Self::Extraction(_) => &[
                "Ensure CV has readable text",
                "Check file is not corrupted",
            ],
            Self::Remote { .. } | Self::Transport(_) => &[
                "Check your API key",
                "Try again in a few moments",
            ],
            Self::Parse(_) | Self::InvalidResponse(_) => &["Try the analysis again"],
            Self::InvalidTransition { .. } => &["Reload the page and start again"],
            Self::SessionNotFound => &["Create a new session"],
            Self::NoResult => &["Run an analysis first"],
        };
        hints.iter().map(|h| h.to_string()).collect()
    }

    /// Validation errors are raised before any network call is attempted.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Self::MissingCv | Self::MissingJobDescription | Self::MissingCredential
        )
    }
}
