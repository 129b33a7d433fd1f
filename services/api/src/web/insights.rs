//! services/api/src/web/insights.rs
//!
//! The insight chat endpoint. One conversation runs for the signed-in user
//! and is dropped on login and logout.
//!
//! The chat lock is never held while the collaborator is answering, so a slow
//! answer cannot hold up sign-in or the history view.

use axum::{extract::State, Extension, Json};
use fleet_core::{domain::User, ChatMessage, ChatSession, InsightMode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use utoipa::ToSchema;

use crate::error::ApiError;
use crate::web::state::AppState;

#[derive(Deserialize, ToSchema)]
pub struct InsightPrompt {
    pub prompt: String,
    #[serde(default)]
    #[schema(value_type = String, example = "standard")]
    pub mode: InsightMode,
}

#[derive(Serialize)]
pub struct InsightResponse {
    /// The model's answer, absent when the prompt was blank.
    pub reply: Option<ChatMessage>,
    pub messages: Vec<ChatMessage>,
}

/// GET /insights - The running conversation
#[utoipa::path(
    get,
    path = "/insights",
    responses(
        (status = 200, description = "Conversation so far"),
        (status = 401, description = "Nobody is signed in")
    )
)]
pub async fn history_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
) -> Json<InsightResponse> {
    let mut chat = state.chat.lock().await;
    let session = chat.get_or_insert_with(|| ChatSession::new(&user));
    Json(InsightResponse {
        reply: None,
        messages: session.messages().to_vec(),
    })
}

/// POST /insights - Sends one prompt
#[utoipa::path(
    post,
    path = "/insights",
    request_body = InsightPrompt,
    responses(
        (status = 200, description = "Answer or fallback message, with the conversation"),
        (status = 401, description = "Nobody is signed in")
    )
)]
pub async fn ask_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Json(req): Json<InsightPrompt>,
) -> Result<Json<InsightResponse>, ApiError> {
    let (session_id, request) = {
        let mut chat = state.chat.lock().await;
        let session = chat.get_or_insert_with(|| ChatSession::new(&user));
        let Some(request) = session.begin(&req.prompt, req.mode) else {
            return Ok(Json(InsightResponse {
                reply: None,
                messages: session.messages().to_vec(),
            }));
        };
        (session.id().to_string(), request)
    };

    let answer = state.insight.ask(request).await;
    let reply = ChatSession::reply(req.mode, answer);

    let mut chat = state.chat.lock().await;
    let messages = match chat.as_mut().filter(|s| s.id() == session_id) {
        Some(session) => {
            session.push(reply.clone());
            session.messages().to_vec()
        }
        None => {
            info!("Conversation was reset while an answer was pending; answer not kept.");
            Vec::new()
        }
    };

    Ok(Json(InsightResponse {
        reply: Some(reply),
        messages,
    }))
}
