// src/intake/file.rs
//! Single-file CV intake state

use serde::Serialize;

use crate::error::{ExtractionError, MatchError};

pub const PDF_MIME: &str = "application/pdf";
pub const UPLOAD_SIZE_HINT: &str = "PDF files only, max 10MB";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadedFile {
    pub name: String,
    pub size_bytes: u64,
    #[serde(skip_serializing)]
    pub extracted_text: String,
}

impl UploadedFile {
    pub fn size_label(&self) -> String {
        format!("{:.2} MB", self.size_bytes as f64 / 1024.0 / 1024.0)
    }

    pub fn extracted_chars(&self) -> usize {
        self.extracted_text.chars().count()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum IntakeState {
    #[default]
    Empty,
    Processing { name: String, size_bytes: u64 },
    Uploaded(UploadedFile),
    Failed { message: String },
}

/// Holds at most one CV; only one file may be in flight at a time
#[derive(Debug, Clone, Default)]
pub struct FileIntake {
    state: IntakeState,
    max_bytes: Option<u64>,
}

impl FileIntake {
    pub fn new(max_bytes: Option<u64>) -> Self {
        Self {
            state: IntakeState::Empty,
            max_bytes,
        }
    }

    pub fn state(&self) -> &IntakeState {
        &self.state
    }

    pub fn is_processing(&self) -> bool {
        matches!(self.state, IntakeState::Processing { .. })
    }

    pub fn uploaded(&self) -> Option<&UploadedFile> {
        match &self.state {
            IntakeState::Uploaded(file) => Some(file),
            _ => None,
        }
    }

    pub fn extracted_text(&self) -> &str {
        self.uploaded().map_or("", |f| f.extracted_text.as_str())
    }

    pub fn error(&self) -> Option<&str> {
        match &self.state {
            IntakeState::Failed { message } => Some(message),
            _ => None,
        }
    }

    /// Validate a dropped file and enter `Processing`.
    ///
    /// Rejections leave the current state untouched.
    pub fn begin(&mut self, name: &str, mime: Option<&str>, size_bytes: u64) -> Result<(), MatchError> {
        if self.is_processing() {
            return Err(MatchError::Busy);
        }

        if !is_pdf_mime(mime) {
            return Err(MatchError::InvalidFileType {
                received: mime.unwrap_or("unknown").to_string(),
            });
        }

        if let Some(limit) = self.max_bytes {
            if size_bytes > limit {
                return Err(MatchError::FileTooLarge {
                    size: size_bytes,
                    limit,
                });
            }
        }

        self.state = IntakeState::Processing {
            name: name.to_string(),
            size_bytes,
        };
        Ok(())
    }

    /// Finish the in-flight file with the extraction outcome
    pub fn complete(&mut self, outcome: Result<String, ExtractionError>) -> Result<(), MatchError> {
        let (name, size_bytes) = match std::mem::take(&mut self.state) {
            IntakeState::Processing { name, size_bytes } => (name, size_bytes),
            other => {
                self.state = other;
                return Err(MatchError::InvalidTransition {
                    from: "no file processing".to_string(),
                    event: "extraction result".to_string(),
                });
            }
        };

        let text = outcome.and_then(|text| {
            if text.trim().is_empty() {
                Err(ExtractionError::Empty)
            } else {
                Ok(text)
            }
        });

        match text {
            Ok(extracted_text) => {
                self.state = IntakeState::Uploaded(UploadedFile {
                    name,
                    size_bytes,
                    extracted_text,
                });
                Ok(())
            }
            Err(e) => {
                self.state = IntakeState::Failed {
                    message: e.to_string(),
                };
                Err(MatchError::Extraction(e))
            }
        }
    }

    /// Drop the file, its text and any error
    pub fn remove(&mut self) {
        self.state = IntakeState::Empty;
    }
}

/// Compares the MIME essence, ignoring parameters such as charset
pub fn is_pdf_mime(mime: Option<&str>) -> bool {
    mime.and_then(|m| m.split(';').next())
        .map(|essence| essence.trim().eq_ignore_ascii_case(PDF_MIME))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uploaded_intake() -> FileIntake {
        let mut intake = FileIntake::default();
        intake.begin("cv.pdf", Some(PDF_MIME), 512_000).unwrap();
        intake.complete(Ok("React, CSS".to_string())).unwrap();
        intake
    }

    #[test]
    fn test_rejects_non_pdf_without_state_change() {
        let mut intake = uploaded_intake();
        let before = intake.state().clone();

        for mime in [Some("image/png"), Some("text/plain"), None] {
            let err = intake.begin("photo.png", mime, 10).unwrap_err();
            assert_eq!(err.code(), "INVALID_FILE_TYPE");
            assert_eq!(intake.state(), &before);
        }
    }

    #[test]
    fn test_accepts_pdf_mime_with_parameters() {
        let mut intake = FileIntake::default();
        assert!(intake.begin("cv.pdf", Some("Application/PDF; charset=binary"), 1).is_ok());
        assert!(intake.is_processing());
    }

    #[test]
    fn test_upload_then_remove_clears_everything() {
        let mut intake = uploaded_intake();
        let file = intake.uploaded().unwrap();
        assert_eq!(file.name, "cv.pdf");
        assert_eq!(file.size_label(), "0.49 MB");
        assert_eq!(file.extracted_chars(), 10);

        intake.remove();
        assert_eq!(intake.state(), &IntakeState::Empty);
        assert!(intake.uploaded().is_none());
        assert_eq!(intake.extracted_text(), "");
    }

    #[test]
    fn test_blank_text_fails_without_retaining_file() {
        let mut intake = FileIntake::default();
        intake.begin("scan.pdf", Some(PDF_MIME), 100).unwrap();
        let err = intake.complete(Ok("  \n ".to_string())).unwrap_err();
        assert_eq!(err, MatchError::Extraction(ExtractionError::Empty));
        assert!(intake.uploaded().is_none());
        assert!(intake.error().is_some());
    }

    #[test]
    fn test_extraction_error_surfaces_message() {
        let mut intake = FileIntake::default();
        intake.begin("locked.pdf", Some(PDF_MIME), 100).unwrap();
        intake.complete(Err(ExtractionError::Encrypted)).unwrap_err();
        assert_eq!(intake.error(), Some("The PDF is password protected"));
    }

    #[test]
    fn test_rejects_new_file_while_processing() {
        let mut intake = FileIntake::default();
        intake.begin("first.pdf", Some(PDF_MIME), 100).unwrap();
        assert_eq!(
            intake.begin("second.pdf", Some(PDF_MIME), 100),
            Err(MatchError::Busy)
        );
        intake.complete(Ok("text".to_string())).unwrap();
        assert_eq!(intake.uploaded().unwrap().name, "first.pdf");
    }

    #[test]
    fn test_size_cap_only_when_configured() {
        let mut unlimited = FileIntake::new(None);
        assert!(unlimited.begin("big.pdf", Some(PDF_MIME), 50 * 1024 * 1024).is_ok());

        let mut capped = FileIntake::new(Some(10 * 1024 * 1024));
        let err = capped
            .begin("big.pdf", Some(PDF_MIME), 10 * 1024 * 1024 + 1)
            .unwrap_err();
        assert_eq!(err.code(), "FILE_TOO_LARGE");
        assert_eq!(capped.state(), &IntakeState::Empty);
    }

    #[test]
    fn test_complete_without_begin_is_invalid() {
        let mut intake = FileIntake::default();
        let err = intake.complete(Ok("text".to_string())).unwrap_err();
        assert_eq!(err.code(), "INVALID_TRANSITION");
    }
}
