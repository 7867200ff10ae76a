// src/cli.rs
use crate::analysis::AnalysisMode;
use crate::config::AppConfig;
use crate::controller::MatchController;
use crate::intake::PDF_MIME;
use crate::presenter::{render_text, ResultView};
use crate::web::start_web_server;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Parser)]
#[command(name = "cv-matcher")]
#[command(about = "Match a CV against a job description with a language model")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Start the HTTP API
    Serve {
        #[arg(long)]
        port: Option<u16>,
    },
    /// Run one analysis and print the report
    Analyze {
        /// CV as a PDF file
        #[arg(long)]
        cv: PathBuf,
        /// Plain-text job description file
        #[arg(long)]
        jd: PathBuf,
        /// Overrides LLM_API_KEY for this run
        #[arg(long)]
        api_key: Option<String>,
        #[arg(long)]
        mode: Option<AnalysisMode>,
        /// Print the result view as JSON
        #[arg(long)]
        json: bool,
    },
}

pub async fn handle_command(cli: Cli, mut config: AppConfig) -> Result<()> {
    match cli.command {
        Command::Serve { port } => {
            if let Some(port) = port {
                config.server.port = port;
            }
            start_web_server(config).await
        }
        Command::Analyze {
            cv,
            jd,
            api_key,
            mode,
            json,
        } => {
            let view = analyze_files(&config, &cv, &jd, api_key, mode).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&view)?);
            } else {
                print!("{}", render_text(&view));
            }
            Ok(())
        }
    }
}

/// Drive a single transient session through upload, analysis and projection
pub async fn analyze_files(
    config: &AppConfig,
    cv: &Path,
    jd: &Path,
    api_key: Option<String>,
    mode: Option<AnalysisMode>,
) -> Result<ResultView> {
    let controller = MatchController::from_config(config)?;

    let cv_bytes = tokio::fs::read(cv)
        .await
        .with_context(|| format!("Failed to read CV {}", cv.display()))?;
    let job_description = tokio::fs::read_to_string(jd)
        .await
        .with_context(|| format!("Failed to read job description {}", jd.display()))?;

    let name = cv
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "cv.pdf".to_string());
    let mime = cv
        .extension()
        .filter(|ext| ext.eq_ignore_ascii_case("pdf"))
        .map(|_| PDF_MIME);

    let session = controller.store.create().await;
    let id = session.lock().await.id();

    controller
        .upload_cv(id, &name, mime, cv_bytes)
        .await
        .with_context(|| format!("Could not process {}", name))?;

    {
        let mut guard = session.lock().await;
        guard.set_job_description(job_description);
        guard.set_credential(api_key);
    }

    let mode = mode.unwrap_or(controller.default_mode());
    info!("Analyzing {} in {} mode", name, mode.as_str());
    let result = controller
        .analyze(id, Some(mode))
        .await
        .context("Analysis failed")?;

    Ok(ResultView::from(&result))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_analyze_args() {
        let cli = Cli::try_parse_from([
            "cv-matcher",
            "analyze",
            "--cv",
            "resume.pdf",
            "--jd",
            "job.txt",
            "--mode",
            "direct",
            "--json",
        ])
        .unwrap();

        match cli.command {
            Command::Analyze {
                cv, mode, json, api_key, ..
            } => {
                assert_eq!(cv, PathBuf::from("resume.pdf"));
                assert_eq!(mode, Some(AnalysisMode::Direct));
                assert!(json);
                assert!(api_key.is_none());
            }
            _ => panic!("expected analyze"),
        }
    }

    #[test]
    fn test_parse_serve_port() {
        let cli = Cli::try_parse_from(["cv-matcher", "serve", "--port", "9000"]).unwrap();
        assert!(matches!(cli.command, Command::Serve { port: Some(9000) }));
    }

    #[test]
    fn test_rejects_unknown_mode() {
        assert!(Cli::try_parse_from([
            "cv-matcher", "analyze", "--cv", "a.pdf", "--jd", "b.txt", "--mode", "fast",
        ])
        .is_err());
    }

    #[tokio::test]
    async fn test_analyze_rejects_non_pdf_before_any_call() {
        let dir = tempfile::tempdir().unwrap();
        let cv = dir.path().join("resume.docx");
        let jd = dir.path().join("job.txt");
        std::fs::write(&cv, b"React").unwrap();
        std::fs::write(&jd, "React, CSS").unwrap();

        let err = analyze_files(&AppConfig::default(), &cv, &jd, Some("sk-test".into()), None)
            .await
            .unwrap_err();
        assert!(format!("{:#}", err).contains("resume.docx"));
    }
}
