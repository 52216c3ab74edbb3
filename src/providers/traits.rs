use async_trait::async_trait;

use super::types::{ChatResult, CreateChatRequest, ProviderError};
use crate::models::{ChatDetail, ChatMessage};

#[async_trait]
pub trait ChatProvider: Send + Sync {
    async fn get_chat(&self, chat_id: &str) -> Result<ChatDetail, ProviderError>;

    async fn find_messages(
        &self,
        chat_id: &str,
        limit: usize,
    ) -> Result<Vec<ChatMessage>, ProviderError>;

    async fn create_chat(&self, request: CreateChatRequest) -> Result<ChatResult, ProviderError>;

    async fn send_message(&self, chat_id: &str, message: &str)
        -> Result<ChatResult, ProviderError>;
}
