// src/intake/mod.rs
//! CV file and job description intake

pub mod extractor;
pub mod file;
pub mod job_description;

pub use extractor::{PdfTextExtractor, TextExtractor};
pub use file::{is_pdf_mime, FileIntake, IntakeState, UploadedFile, PDF_MIME, UPLOAD_SIZE_HINT};
pub use job_description::JobDescription;
