// src/analysis/pipeline.rs
//! Stage machine for extraction, summarization and scoring

use serde::Serialize;
use std::fmt;

use super::types::AnalysisMode;
use crate::error::MatchError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PipelineStage {
    #[default]
    Idle,
    Extracting,
    Summarizing,
    Scoring,
    Done,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageEvent {
    ExtractionStarted,
    ExtractionFinished,
    AnalysisStarted(AnalysisMode),
    SummaryReady,
    ScoreReady,
    StepFailed,
}

impl PipelineStage {
    /// Extracting, Summarizing and Scoring hold the session
    pub fn is_active(self) -> bool {
        matches!(self, Self::Extracting | Self::Summarizing | Self::Scoring)
    }

    pub fn on(self, event: StageEvent) -> Result<PipelineStage, MatchError> {
        use PipelineStage::*;
        use StageEvent::*;

        let next = match (self, event) {
            (Idle | Done | Failed, ExtractionStarted) => Extracting,
            (Extracting, ExtractionFinished) => Idle,
            (Idle | Done | Failed, AnalysisStarted(AnalysisMode::Direct)) => Scoring,
            (Idle | Done | Failed, AnalysisStarted(AnalysisMode::Summarized)) => Summarizing,
            (Summarizing, SummaryReady) => Scoring,
            (Scoring, ScoreReady) => Done,
            (Extracting | Summarizing | Scoring, StepFailed) => Failed,
            (Extracting | Summarizing | Scoring, ExtractionStarted | AnalysisStarted(_)) => {
                return Err(MatchError::Busy)
            }
            (from, event) => {
                return Err(MatchError::InvalidTransition {
                    from: from.to_string(),
                    event: format!("{:?}", event),
                })
            }
        };
        Ok(next)
    }

    /// Status line shown while the stage is running
    pub fn status_message(self) -> &'static str {
        match self {
            Self::Idle => "Ready",
            Self::Extracting => "Processing PDF...",
            Self::Summarizing => "Processing CV...",
            Self::Scoring => "Analyzing match...",
            Self::Done => "Analysis complete",
            Self::Failed => "Analysis failed",
        }
    }

    /// Status line once this stage has failed
    pub fn failure_message(self) -> &'static str {
        match self {
            Self::Extracting => "PDF processing failed",
            _ => "Analysis failed",
        }
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Extracting => "extracting",
            Self::Summarizing => "summarizing",
            Self::Scoring => "scoring",
            Self::Done => "done",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}
