// src/intake/extractor.rs
//! PDF text extraction capability

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::error::ExtractionError;

const PDF_MAGIC: &[u8] = b"%PDF";

/// Turns raw document bytes into plain text
#[async_trait]
pub trait TextExtractor: Send + Sync {
    async fn extract(&self, bytes: Vec<u8>) -> Result<String, ExtractionError>;
}

/// Extractor backed by `pdf-extract`, run on the blocking pool
pub struct PdfTextExtractor;

#[async_trait]
impl TextExtractor for PdfTextExtractor {
    async fn extract(&self, bytes: Vec<u8>) -> Result<String, ExtractionError> {
        if !bytes.starts_with(PDF_MAGIC) {
            return Err(ExtractionError::Corrupted("missing PDF header".to_string()));
        }

        debug!("Extracting text from {} bytes of PDF", bytes.len());

        // pdf-extract panics on some malformed files; the join error catches it
        let outcome = tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&bytes))
            .await
            .map_err(|e| {
                warn!("PDF extraction task aborted: {}", e);
                ExtractionError::Corrupted("the PDF parser could not read this file".to_string())
            })?;

        let raw = outcome.map_err(|e| classify_pdf_error(&e.to_string()))?;
        let text = normalize_text(&raw);

        if text.is_empty() {
            return Err(ExtractionError::Empty);
        }
        Ok(text)
    }
}

fn classify_pdf_error(message: &str) -> ExtractionError {
    let lower = message.to_lowercase();
    if lower.contains("encrypt") || lower.contains("password") {
        ExtractionError::Encrypted
    } else {
        ExtractionError::Failed(message.to_string())
    }
}

/// Trim line ends and collapse runs of blank lines
pub fn normalize_text(raw: &str) -> String {
    let mut lines: Vec<&str> = Vec::new();
    let mut previous_blank = true;

    for line in raw.lines().map(str::trim_end) {
        let blank = line.trim().is_empty();
        if blank && previous_blank {
            continue;
        }
        lines.push(if blank { "" } else { line });
        previous_blank = blank;
    }

    while lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }
    lines.join("\n")
}
