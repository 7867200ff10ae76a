// src/web/handlers/analysis_handlers.rs
//! Analysis trigger and result retrieval

use rocket::serde::json::Json;
use rocket::State;
use tracing::{error, info};

use super::session_handlers::parse_session_id;
use crate::controller::MatchController;
use crate::error::MatchError;
use crate::presenter::ResultView;
use crate::web::types::{
    api_error, AnalyzeRequest, ApiError, DataResponse, StandardRequest, WithConversationId,
};

pub async fn analyze_handler(
    id: &str,
    request: Option<Json<StandardRequest<AnalyzeRequest>>>,
    controller: &State<MatchController>,
) -> Result<Json<DataResponse<ResultView>>, ApiError> {
    let conversation_id = request.as_ref().and_then(|r| r.conversation_id());
    let mode = request.and_then(|r| r.into_inner().data.mode);
    let id = parse_session_id(id)?;

    info!(
        "Analysis requested for session {} ({})",
        id,
        mode.unwrap_or(controller.default_mode()).as_str()
    );

    let result = controller.analyze(id, mode).await.map_err(|e| {
        error!("Analysis failed for session {}: {}", id, e);
        api_error(&e, conversation_id.clone())
    })?;

    let view = ResultView::from(&result);
    let display_format = view.display_format();
    Ok(Json(
        DataResponse::success(
            format!("{} CV-JD Match Score", view.score_label),
            view,
            conversation_id,
        )
        .with_display_format(display_format),
    ))
}

async fn current_result(controller: &MatchController, id: &str) -> Result<ResultView, ApiError> {
    let id = parse_session_id(id)?;
    let session = controller
        .session(id)
        .await
        .map_err(|e| api_error(&e, None))?;
    let view = session.lock().await.result().map(ResultView::from);
    view.ok_or_else(|| api_error(&MatchError::NoResult, None))
}

pub async fn get_result_handler(
    id: &str,
    controller: &State<MatchController>,
) -> Result<Json<DataResponse<ResultView>>, ApiError> {
    let view = current_result(controller, id).await?;
    let display_format = view.display_format();
    Ok(Json(
        DataResponse::success(format!("{} CV-JD Match Score", view.score_label), view, None)
            .with_display_format(display_format),
    ))
}

/// Suggestions as the plain-text block users paste elsewhere
pub async fn suggestions_text_handler(
    id: &str,
    controller: &State<MatchController>,
) -> Result<String, ApiError> {
    let view = current_result(controller, id).await?;
    Ok(view.clipboard_text())
}
