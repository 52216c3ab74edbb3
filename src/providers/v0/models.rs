use serde::{Deserialize, Serialize};

use crate::models::ChatMessage;

pub const RESPONSE_MODE_SYNC: &str = "sync";

// --- Request types ---

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct V0CreateChatRequest {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    pub response_mode: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct V0SendMessageRequest {
    pub message: String,
    pub response_mode: &'static str,
}

// --- Response types ---

#[derive(Debug, Deserialize)]
pub struct V0MessageList {
    #[serde(default)]
    pub data: Vec<ChatMessage>,
}

// --- Error types ---

#[derive(Debug, Deserialize)]
pub struct V0ErrorResponse {
    pub error: V0ErrorDetail,
}

#[derive(Debug, Deserialize)]
pub struct V0ErrorDetail {
    pub message: String,
}
