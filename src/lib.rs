//! CV to job description matching backed by a chat-completion API.
//!
//! A [`session::Session`] holds the uploaded CV, the job description and the
//! last [`analysis::AnalysisResult`]; [`controller::MatchController`] drives
//! extraction and analysis for it. The HTTP API in [`web`] and the CLI in
//! [`cli`] are thin layers over the controller.

pub mod analysis;
pub mod cli;
pub mod config;
pub mod controller;
pub mod error;
pub mod intake;
pub mod presenter;
pub mod session;
pub mod web;

pub use analysis::{AnalysisMode, AnalysisResult, PipelineStage};
pub use config::AppConfig;
pub use controller::MatchController;
pub use error::{ExtractionError, MatchError};
pub use presenter::{suggestions_clipboard_text, MatchTier, ResultView};
pub use web::{build_rocket, start_web_server};
