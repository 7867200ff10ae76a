// src/web/handlers/session_handlers.rs
use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::State;
use tracing::info;
use uuid::Uuid;

use crate::controller::MatchController;
use crate::error::MatchError;
use crate::session::SessionView;
use crate::web::types::{
    api_error, ActionResponse, ApiError, CredentialRequest, DataResponse, StandardRequest,
    WithConversationId,
};

pub fn parse_session_id(id: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(id).map_err(|_| api_error(&MatchError::SessionNotFound, None))
}

pub async fn session_view(controller: &MatchController, id: Uuid) -> Result<SessionView, MatchError> {
    let session = controller.session(id).await?;
    let view = session.lock().await.view();
    Ok(view)
}

pub async fn create_session_handler(
    controller: &State<MatchController>,
) -> (Status, Json<DataResponse<SessionView>>) {
    let session = controller.store.create().await;
    let view = session.lock().await.view();

    (
        Status::Created,
        Json(DataResponse::success(
            "Session created".to_string(),
            view,
            None,
        )),
    )
}

pub async fn get_session_handler(
    id: &str,
    controller: &State<MatchController>,
) -> Result<Json<DataResponse<SessionView>>, ApiError> {
    let id = parse_session_id(id)?;
    let view = session_view(controller, id)
        .await
        .map_err(|e| api_error(&e, None))?;

    Ok(Json(DataResponse::success(
        view.status.clone(),
        view,
        None,
    )))
}

pub async fn delete_session_handler(
    id: &str,
    controller: &State<MatchController>,
) -> Result<Json<ActionResponse>, ApiError> {
    let id = parse_session_id(id)?;
    if !controller.store.remove(id).await {
        return Err(api_error(&MatchError::SessionNotFound, None));
    }

    Ok(Json(ActionResponse::success(
        "Session discarded".to_string(),
        "deleted".to_string(),
        None,
    )))
}

pub async fn set_credential_handler(
    id: &str,
    request: Json<StandardRequest<CredentialRequest>>,
    controller: &State<MatchController>,
) -> Result<Json<ActionResponse>, ApiError> {
    let conversation_id = request.conversation_id();
    let id = parse_session_id(id)?;
    let session = controller
        .session(id)
        .await
        .map_err(|e| api_error(&e, conversation_id.clone()))?;

    let request = request.into_inner();
    let mut guard = session.lock().await;
    guard.set_credential(request.data.api_key);
    let stored = guard.has_credential();
    drop(guard);

    // never log the key itself
    info!("Session {} credential {}", id, if stored { "set" } else { "cleared" });

    let (message, action) = if stored {
        ("API key stored for this session", "stored")
    } else {
        ("API key cleared", "cleared")
    };
    Ok(Json(ActionResponse::success(
        message.to_string(),
        action.to_string(),
        conversation_id,
    )))
}
