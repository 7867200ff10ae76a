// src/controller.rs
//! Coordinates session state with extraction and analysis.
//!
//! The session lock is held only to validate and commit; extraction and
//! remote calls run with it released.

use anyhow::Result;
use std::sync::Arc;
use tracing::{info, info_span, Instrument};
use uuid::Uuid;

use crate::analysis::{AnalysisMode, AnalysisOrchestrator, AnalysisResult, ChatCompletionClient};
use crate::config::AppConfig;
use crate::error::MatchError;
use crate::intake::{PdfTextExtractor, TextExtractor};
use crate::session::{NotificationLevel, SessionProgress, SessionStore, SharedSession};

pub struct MatchController {
    pub store: SessionStore,
    extractor: Arc<dyn TextExtractor>,
    orchestrator: AnalysisOrchestrator,
    default_mode: AnalysisMode,
}

impl MatchController {
    pub fn new(
        store: SessionStore,
        extractor: Arc<dyn TextExtractor>,
        orchestrator: AnalysisOrchestrator,
        default_mode: AnalysisMode,
    ) -> Self {
        Self {
            store,
            extractor,
            orchestrator,
            default_mode,
        }
    }

    /// Wire the production extractor and completion client from configuration
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let client = ChatCompletionClient::new(&config.llm)?;
        let orchestrator = AnalysisOrchestrator::new(Arc::new(client), config.llm.api_key.clone());
        let store = SessionStore::new(
            config.server.session_ttl_minutes,
            config.analysis.max_upload_bytes,
            config.require_credential(),
        );

        Ok(Self::new(
            store,
            Arc::new(PdfTextExtractor),
            orchestrator,
            config.analysis.mode,
        ))
    }

    pub fn default_mode(&self) -> AnalysisMode {
        self.default_mode
    }

    pub async fn session(&self, id: Uuid) -> Result<SharedSession, MatchError> {
        self.store.get(id).await
    }

    /// Validate, extract and store an uploaded CV
    pub async fn upload_cv(
        &self,
        id: Uuid,
        name: &str,
        mime: Option<&str>,
        bytes: Vec<u8>,
    ) -> Result<(), MatchError> {
        let session = self.store.get(id).await?;
        session
            .lock()
            .await
            .begin_upload(name, mime, bytes.len() as u64)?;

        let span = info_span!("cv_extraction", session = %id, file = %name);
        let outcome = self.extractor.extract(bytes).instrument(span).await;

        let mut guard = session.lock().await;
        guard.finish_upload(outcome)?;
        if let Some(file) = guard.file().uploaded() {
            info!(
                "Extracted {} characters from {} for session {}",
                file.extracted_chars(),
                file.name,
                id
            );
        }
        Ok(())
    }

    /// Run one analysis for the session; earlier results survive failures
    pub async fn analyze(&self, id: Uuid, mode: Option<AnalysisMode>) -> Result<AnalysisResult, MatchError> {
        let mode = mode.unwrap_or(self.default_mode);
        let session = self.store.get(id).await?;

        let request = {
            let mut guard = session.lock().await;
            let request = guard.analysis_request();
            if let Err(e) = self
                .orchestrator
                .check_request(&request)
                .and_then(|_| guard.begin_analysis(mode))
            {
                // missing input is user feedback; a busy session already reports its own state
                if e.is_input_error() {
                    guard.notify(NotificationLevel::Error, e.to_string());
                }
                return Err(e);
            }
            request
        };

        let mut progress = SessionProgress::new(session.clone());
        let outcome = self.orchestrator.run(&request, mode, &mut progress).await;

        session.lock().await.finish_analysis(&outcome);
        outcome
    }
}
