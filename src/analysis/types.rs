// src/analysis/types.rs
use serde::{Deserialize, Serialize};

/// Inputs gathered from the session at trigger time
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    pub cv_text: String,
    pub job_description: String,
    pub credential: Option<String>,
}

/// Structured outcome produced by the remote service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub match_percentage: u8,
    pub matched_keywords: Vec<String>,
    pub missing_keywords: Vec<String>,
    pub suggestions: Vec<String>,
    pub strengths: Vec<String>,
    pub jd_keywords_count: u32,
}

/// Whether the raw CV or a condensed summary of it is sent for scoring
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisMode {
    Direct,
    #[default]
    Summarized,
}

impl AnalysisMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Direct => "direct",
            Self::Summarized => "summarized",
        }
    }
}

impl std::str::FromStr for AnalysisMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "direct" | "single" => Ok(Self::Direct),
            "summarized" | "summary" | "two-step" => Ok(Self::Summarized),
            other => Err(format!("Unknown analysis mode: {}. Use direct or summarized", other)),
        }
    }
}
