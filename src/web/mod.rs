// src/web/mod.rs

pub mod handlers;
pub mod types;

pub use handlers::*;
pub use types::*;

use crate::config::AppConfig;
use crate::controller::MatchController;
use crate::presenter::ResultView;
use crate::session::SessionView;
use anyhow::Result;
use rocket::data::{Limits, ToByteUnit};
use rocket::fairing::{Fairing, Info, Kind};
use rocket::form::Form;
use rocket::http::{Header, Status};
use rocket::serde::json::Json;
use rocket::{
    catchers, delete, get, options, post, put, routes, Build, Request, Response, Rocket, State,
};
use tracing::{error, info};

// CORS Fairing
pub struct Cors;

#[rocket::async_trait]
impl Fairing for Cors {
    fn info(&self) -> Info {
        Info {
            name: "Add CORS headers to responses",
            kind: Kind::Response,
        }
    }

    async fn on_response<'r>(&self, _request: &'r Request<'_>, response: &mut Response<'r>) {
        response.set_header(Header::new("Access-Control-Allow-Origin", "*"));
        response.set_header(Header::new(
            "Access-Control-Allow-Methods",
            "POST, GET, PUT, DELETE, OPTIONS",
        ));
        response.set_header(Header::new("Access-Control-Allow-Headers", "*"));
        response.set_header(Header::new("Access-Control-Allow-Credentials", "true"));
    }
}

#[get("/health")]
pub async fn health(controller: &State<MatchController>) -> Json<TextResponse> {
    handlers::health_handler(controller).await
}

#[post("/sessions")]
pub async fn create_session(
    controller: &State<MatchController>,
) -> (Status, Json<DataResponse<SessionView>>) {
    handlers::create_session_handler(controller).await
}

#[get("/sessions/<id>")]
pub async fn get_session(
    id: &str,
    controller: &State<MatchController>,
) -> Result<Json<DataResponse<SessionView>>, ApiError> {
    handlers::get_session_handler(id, controller).await
}

#[delete("/sessions/<id>")]
pub async fn delete_session(
    id: &str,
    controller: &State<MatchController>,
) -> Result<Json<ActionResponse>, ApiError> {
    handlers::delete_session_handler(id, controller).await
}

#[post("/sessions/<id>/cv", data = "<upload>")]
pub async fn upload_cv(
    id: &str,
    upload: Form<CvUploadForm<'_>>,
    controller: &State<MatchController>,
) -> Result<Json<DataResponse<SessionView>>, ApiError> {
    handlers::upload_cv_handler(id, upload, controller).await
}

#[delete("/sessions/<id>/cv")]
pub async fn remove_cv(
    id: &str,
    controller: &State<MatchController>,
) -> Result<Json<DataResponse<SessionView>>, ApiError> {
    handlers::remove_cv_handler(id, controller).await
}

#[put("/sessions/<id>/job-description", data = "<request>")]
pub async fn set_job_description(
    id: &str,
    request: Json<StandardRequest<JobDescriptionRequest>>,
    controller: &State<MatchController>,
) -> Result<Json<DataResponse<SessionView>>, ApiError> {
    handlers::set_job_description_handler(id, request, controller).await
}

#[delete("/sessions/<id>/job-description")]
pub async fn clear_job_description(
    id: &str,
    controller: &State<MatchController>,
) -> Result<Json<DataResponse<SessionView>>, ApiError> {
    handlers::clear_job_description_handler(id, controller).await
}

#[put("/sessions/<id>/credential", data = "<request>")]
pub async fn set_credential(
    id: &str,
    request: Json<StandardRequest<CredentialRequest>>,
    controller: &State<MatchController>,
) -> Result<Json<ActionResponse>, ApiError> {
    handlers::set_credential_handler(id, request, controller).await
}

#[post("/sessions/<id>/analyze", data = "<request>")]
pub async fn analyze(
    id: &str,
    request: Option<Json<StandardRequest<AnalyzeRequest>>>,
    controller: &State<MatchController>,
) -> Result<Json<DataResponse<ResultView>>, ApiError> {
    handlers::analyze_handler(id, request, controller).await
}

#[get("/sessions/<id>/result")]
pub async fn get_result(
    id: &str,
    controller: &State<MatchController>,
) -> Result<Json<DataResponse<ResultView>>, ApiError> {
    handlers::get_result_handler(id, controller).await
}

#[get("/sessions/<id>/result/suggestions")]
pub async fn get_suggestions_text(
    id: &str,
    controller: &State<MatchController>,
) -> Result<String, ApiError> {
    handlers::suggestions_text_handler(id, controller).await
}

#[options("/<_..>")]
pub async fn options() -> Status {
    Status::Ok
}

// Error catchers
#[rocket::catch(400)]
pub fn bad_request() -> Json<StandardErrorResponse> {
    Json(StandardErrorResponse::new(
        "Invalid request format".to_string(),
        "BAD_REQUEST".to_string(),
        vec![
            "Check your request JSON format".to_string(),
            "Verify all required fields are present".to_string(),
        ],
        None,
    ))
}

#[rocket::catch(404)]
pub fn not_found() -> Json<StandardErrorResponse> {
    Json(StandardErrorResponse::new(
        "Resource not found".to_string(),
        "NOT_FOUND".to_string(),
        vec!["Check the request path".to_string()],
        None,
    ))
}

#[rocket::catch(413)]
pub fn payload_too_large() -> Json<StandardErrorResponse> {
    Json(StandardErrorResponse::new(
        "Uploaded file exceeds the server limit".to_string(),
        "FILE_TOO_LARGE".to_string(),
        vec!["Upload a smaller PDF".to_string()],
        None,
    ))
}

#[rocket::catch(422)]
pub fn unprocessable() -> Json<StandardErrorResponse> {
    Json(StandardErrorResponse::new(
        "Request body could not be parsed".to_string(),
        "UNPROCESSABLE_REQUEST".to_string(),
        vec![
            "Check your request JSON format".to_string(),
            "Send the CV as a multipart field named cv_file".to_string(),
        ],
        None,
    ))
}

#[rocket::catch(500)]
pub fn internal_error() -> Json<StandardErrorResponse> {
    Json(StandardErrorResponse::new(
        "Internal server error".to_string(),
        "INTERNAL_ERROR".to_string(),
        vec![
            "Try again in a few moments".to_string(),
            "Contact support if the problem persists".to_string(),
        ],
        None,
    ))
}

/// Assemble the Rocket instance around an already wired controller
pub fn build_rocket(controller: MatchController, config: &AppConfig) -> Rocket<Build> {
    let upload_limit = config.server.upload_limit_bytes.bytes();
    let limits = Limits::default()
        .limit("file", upload_limit)
        .limit("data-form", upload_limit);

    let figment = rocket::Config::figment()
        .merge(("address", config.server.address.clone()))
        .merge(("port", config.server.port))
        .merge(("limits", limits));

    rocket::custom(figment)
        .attach(Cors)
        .manage(controller)
        .register(
            "/api",
            catchers![
                bad_request,
                not_found,
                payload_too_large,
                unprocessable,
                internal_error
            ],
        )
        .mount(
            "/api",
            routes![
                health,
                create_session,
                get_session,
                delete_session,
                upload_cv,
                remove_cv,
                set_job_description,
                clear_job_description,
                set_credential,
                analyze,
                get_result,
                get_suggestions_text,
                options,
            ],
        )
}

// Main server start function
pub async fn start_web_server(config: AppConfig) -> Result<()> {
    let controller = MatchController::from_config(&config)?;

    info!("Starting CV matcher API server");
    info!(
        "Listening on {}:{}, model {} at {}",
        config.server.address, config.server.port, config.llm.model, config.llm.api_url
    );
    if config.require_credential() {
        info!("No server API key configured, sessions must supply their own");
    }

    if let Err(e) = build_rocket(controller, &config).launch().await {
        error!("Server stopped with error: {}", e);
        return Err(anyhow::anyhow!("Rocket failed: {}", e));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::orchestrator::tests::{ScriptedService, STUB};
    use crate::analysis::{AnalysisMode, AnalysisOrchestrator};
    use crate::controller::tests::PlainExtractor;
    use crate::session::SessionStore;
    use rocket::http::ContentType;
    use rocket::local::asynchronous::Client;
    use serde_json::Value;
    use std::sync::Arc;

    const BOUNDARY: &str = "X-CV-MATCHER-BOUNDARY";

    async fn client(service: Arc<ScriptedService>) -> Client {
        let controller = MatchController::new(
            SessionStore::new(60, None, true),
            Arc::new(PlainExtractor),
            AnalysisOrchestrator::new(service, None),
            AnalysisMode::Direct,
        );
        Client::tracked(build_rocket(controller, &AppConfig::default()))
            .await
            .unwrap()
    }

    fn multipart(filename: &str, content_type: &str, body: &str) -> String {
        format!(
            "--{b}\r\nContent-Disposition: form-data; name=\"cv_file\"; filename=\"{f}\"\r\nContent-Type: {c}\r\n\r\n{body}\r\n--{b}--\r\n",
            b = BOUNDARY,
            f = filename,
            c = content_type,
            body = body
        )
    }

    fn form_type() -> ContentType {
        ContentType::new("multipart", "form-data").with_params(("boundary", BOUNDARY))
    }

    async fn new_session(client: &Client) -> String {
        let response = client.post("/api/sessions").dispatch().await;
        assert_eq!(response.status(), Status::Created);
        let body: Value = response.into_json().await.unwrap();
        body["data"]["id"].as_str().unwrap().to_string()
    }

    #[rocket::async_test]
    async fn test_health() {
        let client = client(ScriptedService::new(vec![])).await;
        let response = client.get("/api/health").dispatch().await;
        assert_eq!(response.status(), Status::Ok);
        assert!(response
            .headers()
            .get_one("Access-Control-Allow-Origin")
            .is_some());
        let body: Value = response.into_json().await.unwrap();
        assert_eq!(body["message"], "OK");
    }

    #[rocket::async_test]
    async fn test_full_flow_over_http() {
        let client = client(ScriptedService::new(vec![Ok(STUB.to_string())])).await;
        let id = new_session(&client).await;

        let response = client
            .post(format!("/api/sessions/{}/cv", id))
            .header(form_type())
            .body(multipart("resume.pdf", "application/pdf", "React, CSS"))
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Ok);
        let body: Value = response.into_json().await.unwrap();
        assert_eq!(body["data"]["file"]["name"], "resume.pdf");
        assert_eq!(body["data"]["file"]["extracted_chars"], 10);

        let response = client
            .put(format!("/api/sessions/{}/job-description", id))
            .header(ContentType::JSON)
            .body(r#"{"text": "React, Node.js, CSS"}"#)
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Ok);

        let response = client
            .put(format!("/api/sessions/{}/credential", id))
            .header(ContentType::JSON)
            .body(r#"{"api_key": "sk-user"}"#)
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Ok);

        let response = client
            .post(format!("/api/sessions/{}/analyze", id))
            .header(ContentType::JSON)
            .body(r#"{"mode": "direct"}"#)
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Ok);
        let body: Value = response.into_json().await.unwrap();
        assert_eq!(body["data"]["score_label"], "67%");
        assert_eq!(body["data"]["tier"], "fair");
        assert_eq!(body["display_format"]["sections"].as_array().unwrap().len(), 5);

        let response = client
            .get(format!("/api/sessions/{}/result/suggestions", id))
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Ok);
        assert_eq!(
            response.into_string().await.unwrap(),
            "CV Improvement Suggestions:\n• Add Node.js"
        );
    }

    #[rocket::async_test]
    async fn test_upload_keeps_the_dropped_file_name() {
        let client = client(ScriptedService::new(vec![])).await;
        let id = new_session(&client).await;

        for name in ["John.Doe_CV.pdf", "CV (2024).pdf", "résumé-final.v2.pdf"] {
            let response = client
                .post(format!("/api/sessions/{}/cv", id))
                .header(form_type())
                .body(multipart(name, "application/pdf", "React, CSS"))
                .dispatch()
                .await;
            assert_eq!(response.status(), Status::Ok);
            let body: Value = response.into_json().await.unwrap();
            assert_eq!(body["data"]["file"]["name"], name);
            assert_eq!(
                body["message"],
                format!("{} uploaded successfully, 10 characters extracted", name)
            );
        }
    }

    #[rocket::async_test]
    async fn test_non_pdf_upload_is_unsupported_media_type() {
        let client = client(ScriptedService::new(vec![])).await;
        let id = new_session(&client).await;

        let response = client
            .post(format!("/api/sessions/{}/cv", id))
            .header(form_type())
            .body(multipart("photo.png", "image/png", "not a pdf"))
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::UnsupportedMediaType);
        let body: Value = response.into_json().await.unwrap();
        assert_eq!(body["error_code"], "INVALID_FILE_TYPE");
        assert_eq!(
            body["error"],
            "Please upload a PDF file only (received: image/png)"
        );

        let response = client
            .get(format!("/api/sessions/{}", id))
            .dispatch()
            .await;
        let body: Value = response.into_json().await.unwrap();
        assert!(body["data"]["file"].is_null());
        assert_eq!(body["data"]["stage"], "idle");
    }

    #[rocket::async_test]
    async fn test_analyze_without_inputs_is_bad_request() {
        let service = ScriptedService::new(vec![]);
        let client = client(service.clone()).await;
        let id = new_session(&client).await;

        let response = client
            .post(format!("/api/sessions/{}/analyze", id))
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::BadRequest);
        let body: Value = response.into_json().await.unwrap();
        assert_eq!(body["error_code"], "MISSING_CV");
        assert_eq!(service.calls(), 0);
    }

    #[rocket::async_test]
    async fn test_result_before_analysis_is_not_found() {
        let client = client(ScriptedService::new(vec![])).await;
        let id = new_session(&client).await;

        let response = client
            .get(format!("/api/sessions/{}/result", id))
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::NotFound);
    }

    #[rocket::async_test]
    async fn test_unknown_and_deleted_sessions() {
        let client = client(ScriptedService::new(vec![])).await;

        let response = client.get("/api/sessions/not-a-uuid").dispatch().await;
        assert_eq!(response.status(), Status::NotFound);

        let id = new_session(&client).await;
        let response = client
            .delete(format!("/api/sessions/{}", id))
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Ok);

        let response = client
            .get(format!("/api/sessions/{}", id))
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::NotFound);
    }

    #[rocket::async_test]
    async fn test_preflight() {
        let client = client(ScriptedService::new(vec![])).await;
        let response = client.options("/api/sessions").dispatch().await;
        assert_eq!(response.status(), Status::Ok);
    }
}
