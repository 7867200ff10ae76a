// src/analysis/parser.rs
//! Locate the JSON object in free model text and check its shape

use regex::Regex;
use serde_json::{Map, Value};
use std::sync::OnceLock;

use super::types::AnalysisResult;
use crate::error::MatchError;

/// Outcome of checking a decoded object against the result schema
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseValidation {
    Valid(AnalysisResult),
    Invalid(String),
}

fn json_object_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    // Greedy: first '{' through last '}' across lines
    PATTERN.get_or_init(|| Regex::new(r"(?s)\{.*\}").expect("valid JSON object pattern"))
}

/// Extract, decode and validate an analysis from model output
pub fn parse_analysis_response(text: &str) -> Result<AnalysisResult, MatchError> {
    let candidate = json_object_pattern()
        .find(text)
        .ok_or_else(|| MatchError::Parse("No valid JSON found in response".to_string()))?;

    let value: Value = serde_json::from_str(candidate.as_str())
        .map_err(|e| MatchError::Parse(format!("invalid JSON: {}", e)))?;

    match validate_analysis(&value) {
        ResponseValidation::Valid(result) => Ok(result),
        ResponseValidation::Invalid(reason) => Err(MatchError::InvalidResponse(reason)),
    }
}

pub fn validate_analysis(value: &Value) -> ResponseValidation {
    let Some(object) = value.as_object() else {
        return ResponseValidation::Invalid("response is not a JSON object".to_string());
    };

    match build_result(object) {
        Ok(result) => ResponseValidation::Valid(result),
        Err(reason) => ResponseValidation::Invalid(reason),
    }
}

fn build_result(object: &Map<String, Value>) -> Result<AnalysisResult, String> {
    let match_percentage = whole_number(object, "match_percentage")?;
    if match_percentage > 100 {
        return Err(format!(
            "match_percentage must be between 0 and 100, got {}",
            match_percentage
        ));
    }

    let jd_keywords_count = whole_number(object, "jd_keywords_count")?;
    let jd_keywords_count = u32::try_from(jd_keywords_count)
        .map_err(|_| "jd_keywords_count is too large".to_string())?;

    Ok(AnalysisResult {
        match_percentage: match_percentage as u8,
        matched_keywords: string_list(object, "matched_keywords")?,
        missing_keywords: string_list(object, "missing_keywords")?,
        suggestions: string_list(object, "suggestions")?,
        strengths: string_list(object, "strengths")?,
        jd_keywords_count,
    })
}

fn field<'a>(object: &'a Map<String, Value>, name: &str) -> Result<&'a Value, String> {
    match object.get(name) {
        None | Some(Value::Null) => Err(format!("missing field `{}`", name)),
        Some(value) => Ok(value),
    }
}

/// Accepts integers and floats with no fractional part (`67.0`)
fn whole_number(object: &Map<String, Value>, name: &str) -> Result<u64, String> {
    let value = field(object, name)?;
    if let Some(n) = value.as_u64() {
        return Ok(n);
    }
    match value.as_f64() {
        Some(f) if f >= 0.0 && f.fract() == 0.0 && f <= u32::MAX as f64 => Ok(f as u64),
        _ => Err(format!("`{}` must be a non-negative integer", name)),
    }
}

fn string_list(object: &Map<String, Value>, name: &str) -> Result<Vec<String>, String> {
    let items = field(object, name)?
        .as_array()
        .ok_or_else(|| format!("`{}` must be a list of strings", name))?;

    items
        .iter()
        .map(|item| {
            item.as_str()
                .map(|s| s.trim().to_string())
                .ok_or_else(|| format!("`{}` must contain only strings", name))
        })
        .collect()
}
