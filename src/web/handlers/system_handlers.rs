// src/web/handlers/system_handlers.rs
use rocket::serde::json::Json;
use rocket::State;
use tracing::info;

use crate::controller::MatchController;
use crate::web::types::TextResponse;

pub async fn health_handler(controller: &State<MatchController>) -> Json<TextResponse> {
    let pruned = controller.store.prune_idle().await;
    if pruned > 0 {
        info!("Pruned {} idle sessions", pruned);
    }
    info!("Health check ({} active sessions)", controller.store.len().await);
    Json(TextResponse::success("OK".to_string(), None))
}
