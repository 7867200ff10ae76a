// src/presenter.rs
//! Read-only projection of an analysis result for display

use serde::Serialize;
use std::fmt::Write as _;

use crate::analysis::AnalysisResult;

const CLIPBOARD_HEADER: &str = "CV Improvement Suggestions:";

/// Sectioned layout a client renders for one result
#[derive(Debug, Clone, Serialize)]
pub struct DisplayFormat {
    #[serde(rename = "type")]
    pub format_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sections: Option<Vec<DisplaySection>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DisplaySection {
    pub title: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub points: Option<Vec<String>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchTier {
    Good,
    Fair,
    Poor,
}

impl MatchTier {
    pub fn from_percentage(percentage: u8) -> Self {
        if percentage >= 80 {
            Self::Good
        } else if percentage >= 60 {
            Self::Fair
        } else {
            Self::Poor
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Good => "good",
            Self::Fair => "fair",
            Self::Poor => "poor",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultStats {
    pub matched_count: usize,
    pub missing_count: usize,
    pub jd_keywords_count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultView {
    pub match_percentage: u8,
    pub score_label: String,
    pub tier: MatchTier,
    pub matched_tags: Vec<String>,
    pub missing_tags: Vec<String>,
    pub strengths: Vec<String>,
    pub suggestions: Vec<String>,
    pub stats: ResultStats,
}

impl From<&AnalysisResult> for ResultView {
    fn from(result: &AnalysisResult) -> Self {
        Self {
            match_percentage: result.match_percentage,
            score_label: format!("{}%", result.match_percentage),
            tier: MatchTier::from_percentage(result.match_percentage),
            matched_tags: result.matched_keywords.clone(),
            missing_tags: result.missing_keywords.clone(),
            strengths: result.strengths.clone(),
            suggestions: result.suggestions.clone(),
            stats: ResultStats {
                matched_count: result.matched_keywords.len(),
                missing_count: result.missing_keywords.len(),
                jd_keywords_count: result.jd_keywords_count,
            },
        }
    }
}

impl ResultView {
    pub fn display_format(&self) -> DisplayFormat {
        let sections = vec![
            DisplaySection {
                title: "Match Score".to_string(),
                content: format!("{} CV-JD Match Score", self.score_label),
                score: Some(self.tier.as_str().to_string()),
                points: None,
            },
            DisplaySection {
                title: "Matched Keywords".to_string(),
                content: format!(
                    "{} of {} job description keywords",
                    self.stats.matched_count, self.stats.jd_keywords_count
                ),
                score: None,
                points: Some(self.matched_tags.clone()),
            },
            DisplaySection {
                title: "Missing Keywords".to_string(),
                content: format!("{} keywords missing", self.stats.missing_count),
                score: None,
                points: Some(self.missing_tags.clone()),
            },
            DisplaySection {
                title: "Your Strengths".to_string(),
                content: String::new(),
                score: None,
                points: Some(self.strengths.clone()),
            },
            DisplaySection {
                title: "Improvement Suggestions".to_string(),
                content: String::new(),
                score: None,
                points: Some(self.suggestions.clone()),
            },
        ];

        DisplayFormat {
            format_type: "analysis".to_string(),
            sections: Some(sections),
        }
    }

    pub fn clipboard_text(&self) -> String {
        suggestions_clipboard_text(&self.suggestions)
    }
}

/// Bulleted plain-text block of the suggestions, as copied to the clipboard
pub fn suggestions_clipboard_text(suggestions: &[String]) -> String {
    format!("{}\n• {}", CLIPBOARD_HEADER, suggestions.join("\n• "))
}

/// Plain-text report for terminals
pub fn render_text(view: &ResultView) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Match Analysis");
    let _ = writeln!(out, "==============");
    let _ = writeln!(
        out,
        "CV-JD Match Score: {} ({})",
        view.score_label,
        view.tier.as_str()
    );
    let _ = writeln!(
        out,
        "Matched keywords: {} | Total JD keywords: {} | Missing keywords: {}",
        view.stats.matched_count, view.stats.jd_keywords_count, view.stats.missing_count
    );

    let _ = writeln!(out, "\nMatched Keywords: {}", view.matched_tags.join(", "));
    let _ = writeln!(out, "Missing Keywords: {}", view.missing_tags.join(", "));

    let _ = writeln!(out, "\nYour Strengths:");
    for (i, strength) in view.strengths.iter().enumerate() {
        let _ = writeln!(out, "  {}. {}", i + 1, strength);
    }

    let _ = writeln!(out, "\nImprovement Suggestions:");
    for (i, suggestion) in view.suggestions.iter().enumerate() {
        let _ = writeln!(out, "  {}. {}", i + 1, suggestion);
    }
    out
}
