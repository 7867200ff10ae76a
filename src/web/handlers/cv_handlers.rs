// src/web/handlers/cv_handlers.rs
//! CV upload and removal handlers

use rocket::form::Form;
use rocket::serde::json::Json;
use rocket::State;
use tracing::{error, info, warn};

use super::session_handlers::{parse_session_id, session_view};
use crate::controller::MatchController;
use crate::error::{ExtractionError, MatchError};
use crate::intake::is_pdf_mime;
use crate::session::SessionView;
use crate::web::types::{api_error, ApiError, CvUploadForm, DataResponse};

pub async fn upload_cv_handler(
    id: &str,
    mut upload: Form<CvUploadForm<'_>>,
    controller: &State<MatchController>,
) -> Result<Json<DataResponse<SessionView>>, ApiError> {
    let id = parse_session_id(id)?;

    let content_type = upload.cv_file.content_type().cloned();
    let mime = content_type.as_ref().map(|ct| ct.to_string());

    // Display only, never used as a path
    let filename = upload
        .cv_file
        .raw_name()
        .map(|n| n.dangerous_unsafe_unsanitized_raw().as_str().trim())
        .filter(|n| !n.is_empty())
        .unwrap_or("uploaded_cv.pdf")
        .to_string();

    if !is_pdf_mime(mime.as_deref()) {
        let err = MatchError::InvalidFileType {
            received: mime.unwrap_or_else(|| "unknown".to_string()),
        };
        info!("Session {} rejected {}: {}", id, filename, err);
        return Err(api_error(&err, None));
    }

    info!(
        "Session {} upload of {} ({} bytes, {})",
        id,
        filename,
        upload.cv_file.len(),
        mime.as_deref().unwrap_or("unknown type")
    );

    let temp_path = std::env::temp_dir().join(format!("cv_upload_{}", uuid::Uuid::new_v4()));

    if let Err(e) = upload.cv_file.persist_to(&temp_path).await {
        error!("Failed to save uploaded file: {}", e);
        let err = MatchError::Extraction(ExtractionError::Failed(
            "the uploaded file could not be read".to_string(),
        ));
        return Err(api_error(&err, None));
    }

    let bytes = tokio::fs::read(&temp_path).await;
    if let Err(e) = tokio::fs::remove_file(&temp_path).await {
        warn!("Failed to remove temporary upload {}: {}", temp_path.display(), e);
    }
    let bytes = bytes.map_err(|e| {
        error!("Failed to read uploaded file: {}", e);
        api_error(
            &MatchError::Extraction(ExtractionError::Failed(e.to_string())),
            None,
        )
    })?;

    controller
        .upload_cv(id, &filename, mime.as_deref(), bytes)
        .await
        .map_err(|e| api_error(&e, None))?;

    let view = session_view(controller, id)
        .await
        .map_err(|e| api_error(&e, None))?;
    let message = match &view.file {
        Some(file) => format!(
            "{} uploaded successfully, {} characters extracted",
            file.name, file.extracted_chars
        ),
        None => "CV uploaded".to_string(),
    };

    Ok(Json(DataResponse::success(message, view, None)))
}

pub async fn remove_cv_handler(
    id: &str,
    controller: &State<MatchController>,
) -> Result<Json<DataResponse<SessionView>>, ApiError> {
    let id = parse_session_id(id)?;
    let session = controller
        .session(id)
        .await
        .map_err(|e| api_error(&e, None))?;

    let mut guard = session.lock().await;
    guard.remove_file().map_err(|e| api_error(&e, None))?;
    let view = guard.view();

    Ok(Json(DataResponse::success(
        "CV removed".to_string(),
        view,
        None,
    )))
}
