// src/session.rs
//! Per-page state container and the in-memory store holding it

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info};
use uuid::Uuid;

use crate::analysis::{
    AnalysisMode, AnalysisRequest, AnalysisResult, PipelineStage, ProgressSink, StageEvent,
};
use crate::error::{ExtractionError, MatchError};
use crate::intake::{FileIntake, JobDescription, UPLOAD_SIZE_HINT};
use crate::presenter::ResultView;

const MAX_NOTIFICATIONS: usize = 50;

pub type SharedSession = Arc<Mutex<Session>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    Info,
    Success,
    Error,
}

/// Transient feedback for the page; never read back by the pipeline
#[derive(Debug, Clone, Serialize)]
pub struct Notification {
    pub at: DateTime<Utc>,
    pub level: NotificationLevel,
    pub message: String,
}

#[derive(Debug)]
pub struct Session {
    id: Uuid,
    created_at: DateTime<Utc>,
    last_activity: DateTime<Utc>,
    file: FileIntake,
    job_description: JobDescription,
    credential: Option<String>,
    credential_required: bool,
    stage: PipelineStage,
    failed_during: Option<PipelineStage>,
    result: Option<AnalysisResult>,
    last_error: Option<String>,
    notifications: Vec<Notification>,
}

impl Session {
    pub fn new(max_upload_bytes: Option<u64>, credential_required: bool) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            created_at: now,
            last_activity: now,
            file: FileIntake::new(max_upload_bytes),
            job_description: JobDescription::default(),
            credential: None,
            credential_required,
            stage: PipelineStage::Idle,
            failed_during: None,
            result: None,
            last_error: None,
            notifications: Vec::new(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn stage(&self) -> PipelineStage {
        self.stage
    }

    pub fn file(&self) -> &FileIntake {
        &self.file
    }

    pub fn result(&self) -> Option<&AnalysisResult> {
        self.result.as_ref()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }

    pub fn last_activity(&self) -> DateTime<Utc> {
        self.last_activity
    }

    /// Status line for the page; failures name the step that failed
    pub fn status_message(&self) -> &'static str {
        match (self.stage, self.failed_during) {
            (PipelineStage::Failed, Some(step)) => step.failure_message(),
            (stage, _) => stage.status_message(),
        }
    }

    fn move_to(&mut self, next: PipelineStage) {
        if next == PipelineStage::Failed && self.stage != PipelineStage::Failed {
            self.failed_during = Some(self.stage);
        }
        self.stage = next;
    }

    fn touch(&mut self) {
        self.last_activity = Utc::now();
    }

    pub fn notify(&mut self, level: NotificationLevel, message: impl Into<String>) {
        self.notifications.push(Notification {
            at: Utc::now(),
            level,
            message: message.into(),
        });
        if self.notifications.len() > MAX_NOTIFICATIONS {
            let excess = self.notifications.len() - MAX_NOTIFICATIONS;
            self.notifications.drain(..excess);
        }
    }

    /// Accept a dropped file; rejections leave the session unchanged
    pub fn begin_upload(&mut self, name: &str, mime: Option<&str>, size_bytes: u64) -> Result<(), MatchError> {
        self.touch();
        let next = self.stage.on(StageEvent::ExtractionStarted)?;
        self.file.begin(name, mime, size_bytes)?;
        self.move_to(next);
        self.notify(NotificationLevel::Info, self.status_message());
        Ok(())
    }

    pub fn finish_upload(&mut self, outcome: Result<String, ExtractionError>) -> Result<(), MatchError> {
        self.touch();
        let completed = self.file.complete(outcome);
        let event = if completed.is_ok() {
            StageEvent::ExtractionFinished
        } else {
            StageEvent::StepFailed
        };
        let next = self.stage.on(event)?;
        self.move_to(next);

        match (&completed, self.file.uploaded()) {
            (Ok(()), Some(file)) => {
                let message = format!(
                    "{} uploaded successfully ({} characters extracted)",
                    file.name,
                    file.extracted_chars()
                );
                self.notify(NotificationLevel::Success, message);
            }
            (Err(e), _) => {
                let message = e.to_string();
                self.notify(NotificationLevel::Error, message);
            }
            _ => {}
        }
        completed
    }

    pub fn remove_file(&mut self) -> Result<(), MatchError> {
        self.touch();
        if self.file.is_processing() {
            return Err(MatchError::Busy);
        }
        self.file.remove();
        if self.stage == PipelineStage::Failed {
            self.move_to(PipelineStage::Idle);
        }
        Ok(())
    }

    pub fn set_job_description(&mut self, text: impl Into<String>) {
        self.touch();
        self.job_description.set(text);
    }

    pub fn clear_job_description(&mut self) {
        self.touch();
        self.job_description.clear();
    }

    /// Held in memory for the session only
    pub fn set_credential(&mut self, credential: Option<String>) {
        self.touch();
        self.credential = credential.filter(|key| !key.trim().is_empty());
    }

    pub fn has_credential(&self) -> bool {
        self.credential.is_some()
    }

    pub fn analysis_request(&self) -> AnalysisRequest {
        AnalysisRequest {
            cv_text: self.file.extracted_text().to_string(),
            job_description: self.job_description.text().to_string(),
            credential: self.credential.clone(),
        }
    }

    pub fn can_analyze(&self) -> bool {
        self.file.uploaded().is_some()
            && self.job_description.is_ready()
            && (self.has_credential() || !self.credential_required)
            && !self.stage.is_active()
    }

    /// Claim the session for an analysis run
    pub fn begin_analysis(&mut self, mode: AnalysisMode) -> Result<(), MatchError> {
        self.touch();
        let next = self.stage.on(StageEvent::AnalysisStarted(mode))?;
        self.move_to(next);
        Ok(())
    }

    /// Store a successful result; failures keep the previous one
    pub fn finish_analysis(&mut self, outcome: &Result<AnalysisResult, MatchError>) {
        self.touch();
        match outcome {
            Ok(result) => {
                self.result = Some(result.clone());
                self.last_error = None;
                self.move_to(PipelineStage::Done);
            }
            Err(e) => {
                self.last_error = Some(e.to_string());
                self.move_to(PipelineStage::Failed);
                self.notify(NotificationLevel::Error, e.to_string());
            }
        }
    }

    pub fn view(&self) -> SessionView {
        SessionView {
            id: self.id.to_string(),
            created_at: self.created_at,
            stage: self.stage,
            status: self.status_message().to_string(),
            processing: self.file.is_processing(),
            file: self.file.uploaded().map(|file| FileView {
                name: file.name.clone(),
                size_bytes: file.size_bytes,
                size_label: file.size_label(),
                extracted_chars: file.extracted_chars(),
            }),
            file_error: self.file.error().map(str::to_string),
            upload_hint: UPLOAD_SIZE_HINT.to_string(),
            job_description_chars: self.job_description.char_count(),
            job_description_ready: self.job_description.is_ready(),
            has_credential: self.has_credential(),
            credential_required: self.credential_required,
            can_analyze: self.can_analyze(),
            result: self.result.as_ref().map(ResultView::from),
            last_error: self.last_error.clone(),
            notifications: self.notifications.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FileView {
    pub name: String,
    pub size_bytes: u64,
    pub size_label: String,
    pub extracted_chars: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub stage: PipelineStage,
    pub status: String,
    pub processing: bool,
    pub file: Option<FileView>,
    pub file_error: Option<String>,
    pub upload_hint: String,
    pub job_description_chars: usize,
    pub job_description_ready: bool,
    pub has_credential: bool,
    pub credential_required: bool,
    pub can_analyze: bool,
    pub result: Option<ResultView>,
    pub last_error: Option<String>,
    pub notifications: Vec<Notification>,
}

/// Mirrors pipeline progress into the session while the lock is otherwise released
pub struct SessionProgress {
    session: SharedSession,
}

impl SessionProgress {
    pub fn new(session: SharedSession) -> Self {
        Self { session }
    }
}

#[async_trait]
impl ProgressSink for SessionProgress {
    async fn stage_changed(&mut self, stage: PipelineStage) {
        let mut session = self.session.lock().await;
        session.move_to(stage);
        let level = match stage {
            PipelineStage::Done => NotificationLevel::Success,
            PipelineStage::Failed => NotificationLevel::Error,
            _ => NotificationLevel::Info,
        };
        let message = session.status_message();
        session.notify(level, message);
    }
}

pub struct SessionStore {
    sessions: RwLock<HashMap<Uuid, SharedSession>>,
    ttl: Duration,
    max_upload_bytes: Option<u64>,
    credential_required: bool,
}

impl SessionStore {
    pub fn new(ttl_minutes: i64, max_upload_bytes: Option<u64>, credential_required: bool) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            ttl: Duration::minutes(ttl_minutes),
            max_upload_bytes,
            credential_required,
        }
    }

    pub async fn create(&self) -> SharedSession {
        self.prune_idle().await;

        let session = Session::new(self.max_upload_bytes, self.credential_required);
        let id = session.id();
        let shared = Arc::new(Mutex::new(session));
        self.sessions.write().await.insert(id, shared.clone());
        info!("Created session {}", id);
        shared
    }

    pub async fn get(&self, id: Uuid) -> Result<SharedSession, MatchError> {
        self.sessions
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(MatchError::SessionNotFound)
    }

    pub async fn remove(&self, id: Uuid) -> bool {
        let removed = self.sessions.write().await.remove(&id).is_some();
        if removed {
            info!("Discarded session {}", id);
        }
        removed
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Drop sessions idle past the TTL; sessions busy under a lock are kept
    pub async fn prune_idle(&self) -> usize {
        let cutoff = Utc::now() - self.ttl;
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, session| match session.try_lock() {
            Ok(guard) => guard.last_activity() >= cutoff,
            Err(_) => true,
        });
        let pruned = before - sessions.len();
        if pruned > 0 {
            debug!("Pruned {} idle sessions", pruned);
        }
        pruned
    }
}
