// src/config.rs
//! Application configuration: optional YAML file plus environment overrides

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::analysis::AnalysisMode;

pub const DEFAULT_API_URL: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerSettings,
    pub llm: LlmSettings,
    pub analysis: AnalysisSettings,
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub address: String,
    pub port: u16,
    /// Transport limit for multipart uploads
    pub upload_limit_bytes: u64,
    pub session_ttl_minutes: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmSettings {
    pub api_url: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    /// No timeout when unset
    pub request_timeout_secs: Option<u64>,
    /// Server-side fallback credential
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisSettings {
    pub mode: AnalysisMode,
    /// Hard cap on uploaded CV size; the 10MB figure is only a label unless this is set.
    pub max_upload_bytes: Option<u64>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            address: "0.0.0.0".to_string(),
            port: 8000,
            upload_limit_bytes: 32 * 1024 * 1024,
            session_ttl_minutes: 60,
        }
    }
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.3,
            max_tokens: 2000,
            request_timeout_secs: None,
            api_key: None,
        }
    }
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            mode: AnalysisMode::Summarized,
            max_upload_bytes: None,
        }
    }
}

impl AppConfig {
    /// Load configuration from `CV_MATCHER_CONFIG` or `./config.yaml` when present,
    /// then apply environment overrides
    pub fn load() -> Result<Self> {
        let path = std::env::var("CV_MATCHER_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("config.yaml"));

        let mut config = if path.exists() {
            info!("Loading configuration from {}", path.display());
            Self::from_file(&path)?
        } else {
            info!("No configuration file found, using defaults");
            Self::default()
        };

        config.apply_env()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::from_yaml(&content).with_context(|| format!("Failed to parse {}", path.display()))
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).context("Invalid configuration YAML")
    }

    fn apply_env(&mut self) -> Result<()> {
        if let Ok(port) = std::env::var("CV_MATCHER_PORT").or_else(|_| std::env::var("ROCKET_PORT")) {
            self.server.port = port
                .parse::<u16>()
                .map_err(|_| anyhow::anyhow!("Port must be a valid port number, got {}", port))?;
        }
        if let Ok(url) = std::env::var("LLM_API_URL") {
            self.llm.api_url = url;
        }
        if let Ok(model) = std::env::var("LLM_MODEL") {
            self.llm.model = model;
        }
        if let Ok(key) = std::env::var("LLM_API_KEY") {
            if !key.trim().is_empty() {
                self.llm.api_key = Some(key);
            }
        }
        if let Ok(log_file) = std::env::var("CV_MATCHER_LOG_FILE") {
            self.log_file = Some(PathBuf::from(log_file));
        }
        Ok(())
    }

    /// Users must supply their own key unless the server holds one
    pub fn require_credential(&self) -> bool {
        self.llm
            .api_key
            .as_deref()
            .map_or(true, |key| key.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.llm.api_url, DEFAULT_API_URL);
        assert_eq!(config.llm.request_timeout_secs, None);
        assert_eq!(config.analysis.mode, AnalysisMode::Summarized);
        assert_eq!(config.analysis.max_upload_bytes, None);
        assert!(config.require_credential());
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let yaml = r#"
server:
  port: 9100
llm:
  model: gpt-4o
  request_timeout_secs: 45
analysis:
  mode: direct
  max_upload_bytes: 10485760
"#;
        let config = AppConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.server.port, 9100);
        assert_eq!(config.server.address, "0.0.0.0");
        assert_eq!(config.llm.model, "gpt-4o");
        assert_eq!(config.llm.temperature, 0.3);
        assert_eq!(config.llm.request_timeout_secs, Some(45));
        assert_eq!(config.analysis.mode, AnalysisMode::Direct);
        assert_eq!(config.analysis.max_upload_bytes, Some(10 * 1024 * 1024));
    }

    #[test]
    fn test_server_key_lifts_credential_requirement() {
        let config = AppConfig::from_yaml("llm:\n  api_key: sk-test\n").unwrap();
        assert!(!config.require_credential());

        let blank = AppConfig::from_yaml("llm:\n  api_key: \"  \"\n").unwrap();
        assert!(blank.require_credential());
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "log_file: /tmp/cv-matcher.log\n").unwrap();

        let config = AppConfig::from_file(&path).unwrap();
        assert_eq!(config.log_file, Some(PathBuf::from("/tmp/cv-matcher.log")));
        assert!(AppConfig::from_file(&dir.path().join("missing.yaml")).is_err());
    }
}
