use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;

use super::AppState;
use crate::models::ChatView;
use crate::services::chat::{self, ChatError};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatQuery {
    pub chat_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatActionRequest {
    pub action: Option<String>,
    pub message: Option<String>,
    pub chat_id: Option<String>,
    pub system: Option<String>,
}

/// `GET /api/v0-chat?chatId=<id>`
pub async fn get_chat(
    State(state): State<AppState>,
    query: Result<Query<ChatQuery>, QueryRejection>,
) -> Result<Json<ChatView>, ChatError> {
    let Query(query) = query.map_err(|e| ChatError::InvalidQuery(e.body_text()))?;
    let chat_id = query.chat_id.ok_or(ChatError::MissingChatId)?;
    let view = chat::load_chat(state.provider.as_ref(), &chat_id).await?;
    Ok(Json(view))
}

/// `POST /api/v0-chat` with `{action, message, chatId, system}`
pub async fn post_chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatActionRequest>, JsonRejection>,
) -> Result<Json<ChatView>, ChatError> {
    let Json(body) = payload.map_err(|e| ChatError::InvalidBody(e.body_text()))?;
    let provider = state.provider.as_ref();

    let view = match body.action.as_deref() {
        Some("create") => {
            tracing::info!("Creating v0 chat");
            chat::create_chat(provider, body.message.as_deref(), body.system.as_deref()).await?
        }
        Some("send") => {
            tracing::info!("Sending message to v0 chat {:?}", body.chat_id);
            chat::send_message(provider, body.chat_id.as_deref(), body.message.as_deref()).await?
        }
        _ => return Err(ChatError::InvalidAction),
    };

    Ok(Json(view))
}

pub async fn health() -> &'static str {
    "OK"
}
