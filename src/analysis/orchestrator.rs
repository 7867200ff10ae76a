// src/analysis/orchestrator.rs
//! Runs the summarize/score calls in sequence and validates the outcome

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{error, info, info_span, Instrument};

use super::llm_client::CompletionService;
use super::parser::parse_analysis_response;
use super::pipeline::{PipelineStage, StageEvent};
use super::prompts::{cv_summary_prompt, scoring_prompt};
use super::types::{AnalysisMode, AnalysisRequest, AnalysisResult};
use crate::error::MatchError;

/// Receives stage changes as feedback; never consulted for control flow
#[async_trait]
pub trait ProgressSink: Send {
    async fn stage_changed(&mut self, stage: PipelineStage);
}

pub struct AnalysisOrchestrator {
    service: Arc<dyn CompletionService>,
    fallback_credential: Option<String>,
}

impl AnalysisOrchestrator {
    pub fn new(service: Arc<dyn CompletionService>, fallback_credential: Option<String>) -> Self {
        let fallback_credential = fallback_credential.filter(|key| !key.trim().is_empty());
        Self {
            service,
            fallback_credential,
        }
    }

    /// Input checks done before any network call; yields the credential to use
    pub fn check_request(&self, request: &AnalysisRequest) -> Result<String, MatchError> {
        if request.cv_text.trim().is_empty() {
            return Err(MatchError::MissingCv);
        }
        if request.job_description.trim().is_empty() {
            return Err(MatchError::MissingJobDescription);
        }

        request
            .credential
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .map(str::to_string)
            .or_else(|| self.fallback_credential.clone())
            .ok_or(MatchError::MissingCredential)
    }

    pub async fn run(
        &self,
        request: &AnalysisRequest,
        mode: AnalysisMode,
        progress: &mut dyn ProgressSink,
    ) -> Result<AnalysisResult, MatchError> {
        let credential = self.check_request(request)?;

        let mut stage = PipelineStage::Idle.on(StageEvent::AnalysisStarted(mode))?;
        progress.stage_changed(stage).await;

        let span = info_span!("analysis", mode = mode.as_str());
        let outcome = self
            .execute(request, &credential, mode, &mut stage, progress)
            .instrument(span)
            .await;

        match outcome {
            Ok(result) => {
                stage = stage.on(StageEvent::ScoreReady)?;
                progress.stage_changed(stage).await;
                info!("Analysis complete: {}% match", result.match_percentage);
                Ok(result)
            }
            Err(e) => {
                error!("Analysis failed during {}: {}", stage, e);
                stage = stage.on(StageEvent::StepFailed)?;
                progress.stage_changed(stage).await;
                Err(e)
            }
        }
    }

    async fn execute(
        &self,
        request: &AnalysisRequest,
        credential: &str,
        mode: AnalysisMode,
        stage: &mut PipelineStage,
        progress: &mut dyn ProgressSink,
    ) -> Result<AnalysisResult, MatchError> {
        let cv_content = match mode {
            AnalysisMode::Direct => request.cv_text.clone(),
            AnalysisMode::Summarized => {
                let summary = self
                    .service
                    .complete(&cv_summary_prompt(&request.cv_text), credential)
                    .await?;
                info!(
                    "CV condensed from {} to {} characters",
                    request.cv_text.chars().count(),
                    summary.chars().count()
                );
                *stage = stage.on(StageEvent::SummaryReady)?;
                progress.stage_changed(*stage).await;
                summary
            }
        };

        let response = self
            .service
            .complete(&scoring_prompt(&cv_content, &request.job_description), credential)
            .await?;

        parse_analysis_response(&response)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Replays canned completions and records the prompts it saw
    pub(crate) struct ScriptedService {
        replies: Mutex<VecDeque<Result<String, MatchError>>>,
        pub prompts: Mutex<Vec<String>>,
    }

    impl ScriptedService {
        pub(crate) fn new(replies: Vec<Result<String, MatchError>>) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies.into()),
                prompts: Mutex::new(Vec::new()),
            })
        }

        pub(crate) fn calls(&self) -> usize {
            self.prompts.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl CompletionService for ScriptedService {
        async fn complete(&self, prompt: &str, _credential: &str) -> Result<String, MatchError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(MatchError::Transport("no scripted reply".to_string())))
        }
    }

    #[derive(Default)]
    struct RecordingSink(Vec<PipelineStage>);

    #[async_trait]
    impl ProgressSink for RecordingSink {
        async fn stage_changed(&mut self, stage: PipelineStage) {
            self.0.push(stage);
        }
    }

    pub(crate) const STUB: &str = r#"{"match_percentage":67,"matched_keywords":["React","CSS"],"missing_keywords":["Node.js"],"suggestions":["Add Node.js"],"strengths":["Strong CSS"],"jd_keywords_count":3}"#;

    fn request(credential: Option<&str>) -> AnalysisRequest {
        AnalysisRequest {
            cv_text: "React, CSS".to_string(),
            job_description: "React, Node.js, CSS".to_string(),
            credential: credential.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn test_direct_mode_makes_one_call_with_raw_cv() {
        let service = ScriptedService::new(vec![Ok(STUB.to_string())]);
        let orchestrator = AnalysisOrchestrator::new(service.clone(), None);
        let mut sink = RecordingSink::default();

        let result = orchestrator
            .run(&request(Some("sk-user")), AnalysisMode::Direct, &mut sink)
            .await
            .unwrap();

        assert_eq!(result.match_percentage, 67);
        assert_eq!(service.calls(), 1);
        assert!(service.prompts.lock().unwrap()[0].contains("CV:\nReact, CSS\n"));
        assert_eq!(sink.0, vec![PipelineStage::Scoring, PipelineStage::Done]);
    }

    #[tokio::test]
    async fn test_summarized_mode_scores_the_summary() {
        let service = ScriptedService::new(vec![
            Ok("SKILLS: React, CSS".to_string()),
            Ok(format!("Sure!\n{}", STUB)),
        ]);
        let orchestrator = AnalysisOrchestrator::new(service.clone(), None);
        let mut sink = RecordingSink::default();

        orchestrator
            .run(&request(Some("sk-user")), AnalysisMode::Summarized, &mut sink)
            .await
            .unwrap();

        let prompts = service.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 2);
        assert!(prompts[0].contains("CV TEXT:\nReact, CSS"));
        assert!(prompts[1].contains("CV:\nSKILLS: React, CSS\n"));
        assert_eq!(
            sink.0,
            vec![
                PipelineStage::Summarizing,
                PipelineStage::Scoring,
                PipelineStage::Done
            ]
        );
    }

    #[tokio::test]
    async fn test_missing_inputs_never_reach_the_network() {
        let service = ScriptedService::new(vec![]);
        let orchestrator = AnalysisOrchestrator::new(service.clone(), None);
        let mut sink = RecordingSink::default();

        let mut no_cv = request(Some("sk"));
        no_cv.cv_text.clear();
        let mut blank_jd = request(Some("sk"));
        blank_jd.job_description = "   ".to_string();

        for (req, expected) in [
            (no_cv, MatchError::MissingCv),
            (blank_jd, MatchError::MissingJobDescription),
            (request(Some("  ")), MatchError::MissingCredential),
            (request(None), MatchError::MissingCredential),
        ] {
            let err = orchestrator
                .run(&req, AnalysisMode::Direct, &mut sink)
                .await
                .unwrap_err();
            assert_eq!(err, expected);
        }
        assert_eq!(service.calls(), 0);
        assert!(sink.0.is_empty());
    }

    #[tokio::test]
    async fn test_server_key_used_when_user_gives_none() {
        let service = ScriptedService::new(vec![Ok(STUB.to_string())]);
        let orchestrator = AnalysisOrchestrator::new(service, Some("sk-server".to_string()));
        assert_eq!(orchestrator.check_request(&request(None)).unwrap(), "sk-server");
        assert_eq!(
            orchestrator.check_request(&request(Some(" sk-user "))).unwrap(),
            "sk-user"
        );
    }

    #[tokio::test]
    async fn test_summary_failure_stops_before_scoring() {
        let service = ScriptedService::new(vec![Err(MatchError::Remote {
            status: 429,
            message: "Rate limit reached".to_string(),
        })]);
        let orchestrator = AnalysisOrchestrator::new(service.clone(), None);
        let mut sink = RecordingSink::default();

        let err = orchestrator
            .run(&request(Some("sk")), AnalysisMode::Summarized, &mut sink)
            .await
            .unwrap_err();

        assert_eq!(err.code(), "REMOTE_ERROR");
        assert_eq!(service.calls(), 1);
        assert_eq!(sink.0, vec![PipelineStage::Summarizing, PipelineStage::Failed]);
    }

    #[tokio::test]
    async fn test_unparseable_scoring_reply_fails() {
        let service = ScriptedService::new(vec![Ok("The CV matches well.".to_string())]);
        let orchestrator = AnalysisOrchestrator::new(service, None);
        let mut sink = RecordingSink::default();

        let err = orchestrator
            .run(&request(Some("sk")), AnalysisMode::Direct, &mut sink)
            .await
            .unwrap_err();

        assert_eq!(err.code(), "PARSE_FAILED");
        assert_eq!(sink.0.last(), Some(&PipelineStage::Failed));
    }
}
