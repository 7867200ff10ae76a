// src/web/handlers/job_description_handlers.rs
use rocket::serde::json::Json;
use rocket::State;
use tracing::info;

use super::session_handlers::parse_session_id;
use crate::controller::MatchController;
use crate::session::SessionView;
use crate::web::types::{
    api_error, ApiError, DataResponse, JobDescriptionRequest, StandardRequest, WithConversationId,
};

pub async fn set_job_description_handler(
    id: &str,
    request: Json<StandardRequest<JobDescriptionRequest>>,
    controller: &State<MatchController>,
) -> Result<Json<DataResponse<SessionView>>, ApiError> {
    let conversation_id = request.conversation_id();
    let id = parse_session_id(id)?;
    let session = controller
        .session(id)
        .await
        .map_err(|e| api_error(&e, conversation_id.clone()))?;

    let request = request.into_inner();
    let mut guard = session.lock().await;
    guard.set_job_description(request.data.text);
    let view = guard.view();
    drop(guard);

    info!(
        "Session {} job description updated ({} characters)",
        id, view.job_description_chars
    );

    Ok(Json(DataResponse::success(
        format!("{} characters", view.job_description_chars),
        view,
        conversation_id,
    )))
}

pub async fn clear_job_description_handler(
    id: &str,
    controller: &State<MatchController>,
) -> Result<Json<DataResponse<SessionView>>, ApiError> {
    let id = parse_session_id(id)?;
    let session = controller
        .session(id)
        .await
        .map_err(|e| api_error(&e, None))?;

    let mut guard = session.lock().await;
    guard.clear_job_description();

    Ok(Json(DataResponse::success(
        "Job description cleared".to_string(),
        guard.view(),
        None,
    )))
}
