// src/analysis/mod.rs
//! Prompt construction, remote scoring and response validation

pub mod llm_client;
pub mod orchestrator;
pub mod parser;
pub mod pipeline;
pub mod prompts;
pub mod types;

pub use llm_client::{ChatCompletionClient, CompletionService};
pub use orchestrator::{AnalysisOrchestrator, ProgressSink};
pub use parser::{parse_analysis_response, validate_analysis, ResponseValidation};
pub use pipeline::{PipelineStage, StageEvent};
pub use types::{AnalysisMode, AnalysisRequest, AnalysisResult};
