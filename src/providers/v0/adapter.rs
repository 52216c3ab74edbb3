use async_trait::async_trait;
use reqwest::{header, Client, Response, StatusCode};
use url::Url;

use super::models::*;
use crate::config::DEFAULT_V0_API_URL;
use crate::models::{ChatDetail, ChatMessage};
use crate::providers::traits::ChatProvider;
use crate::providers::types::*;

const EVENT_STREAM: &str = "text/event-stream";

pub struct V0Provider {
    client: Client,
    base_url: Url,
    api_key: Option<String>,
}

impl V0Provider {
    pub fn new(api_key: Option<String>, base_url: Option<&str>) -> Result<Self, ProviderError> {
        let raw = base_url.unwrap_or(DEFAULT_V0_API_URL);
        let base_url = Url::parse(raw)
            .map_err(|e| ProviderError::RequestFailed(format!("Invalid v0 API URL {}: {}", raw, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(ProviderError::RequestFailed(format!(
                "Invalid v0 API URL {}: not a base URL",
                raw
            )));
        }

        Ok(Self {
            client: Client::new(),
            base_url,
            api_key,
        })
    }

    fn api_key(&self) -> Result<&str, ProviderError> {
        self.api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or(ProviderError::MissingApiKey)
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn parse_error_message(status: StatusCode, body: &str) -> String {
        if let Ok(parsed) = serde_json::from_str::<V0ErrorResponse>(body) {
            return format!("HTTP {}: {}", status.as_u16(), parsed.error.message);
        }
        format!("HTTP {}: Request failed", status.as_u16())
    }

    async fn check_status(response: Response, chat_id: Option<&str>) -> Result<Response, ProviderError> {
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(ProviderError::AuthError("Invalid API key".to_string()));
        }

        if status == StatusCode::NOT_FOUND {
            if let Some(id) = chat_id {
                return Err(ProviderError::NotFound(id.to_string()));
            }
        }

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = response
                .headers()
                .get(header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse().ok());
            return Err(ProviderError::RateLimited { retry_after_secs });
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::RequestFailed(Self::parse_error_message(
                status, &body,
            )));
        }

        Ok(response)
    }

    fn is_event_stream(response: &Response) -> bool {
        response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.starts_with(EVENT_STREAM))
            .unwrap_or(false)
    }

    async fn read_chat_result(response: Response) -> Result<ChatResult, ProviderError> {
        // The body of a streamed answer is left unread
        if Self::is_event_stream(&response) {
            return Ok(ChatResult::Stream);
        }

        let detail: ChatDetail = response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;
        Ok(ChatResult::Detail(detail))
    }
}

#[async_trait]
impl ChatProvider for V0Provider {
    async fn get_chat(&self, chat_id: &str) -> Result<ChatDetail, ProviderError> {
        let api_key = self.api_key()?;
        let url = self.endpoint(&["chats", chat_id]);
        tracing::debug!("Fetching v0 chat {}", chat_id);

        let response = self
            .client
            .get(url)
            .bearer_auth(api_key)
            .send()
            .await
            .map_err(|e| ProviderError::NetworkError(e.to_string()))?;

        Self::check_status(response, Some(chat_id))
            .await?
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))
    }

    async fn find_messages(
        &self,
        chat_id: &str,
        limit: usize,
    ) -> Result<Vec<ChatMessage>, ProviderError> {
        let api_key = self.api_key()?;
        let mut url = self.endpoint(&["chats", chat_id, "messages"]);
        url.query_pairs_mut()
            .append_pair("limit", &limit.to_string());

        let response = self
            .client
            .get(url)
            .bearer_auth(api_key)
            .send()
            .await
            .map_err(|e| ProviderError::NetworkError(e.to_string()))?;

        let list: V0MessageList = Self::check_status(response, Some(chat_id))
            .await?
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;

        Ok(list.data)
    }

    async fn create_chat(&self, request: CreateChatRequest) -> Result<ChatResult, ProviderError> {
        let api_key = self.api_key()?;
        let url = self.endpoint(&["chats"]);

        let body = V0CreateChatRequest {
            message: request.message,
            system: request.system,
            response_mode: RESPONSE_MODE_SYNC,
        };

        let response = self
            .client
            .post(url)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::NetworkError(e.to_string()))?;

        let response = Self::check_status(response, None).await?;
        Self::read_chat_result(response).await
    }

    async fn send_message(
        &self,
        chat_id: &str,
        message: &str,
    ) -> Result<ChatResult, ProviderError> {
        let api_key = self.api_key()?;
        let url = self.endpoint(&["chats", chat_id, "messages"]);

        let body = V0SendMessageRequest {
            message: message.to_string(),
            response_mode: RESPONSE_MODE_SYNC,
        };

        let response = self
            .client
            .post(url)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::NetworkError(e.to_string()))?;

        let response = Self::check_status(response, Some(chat_id)).await?;
        Self::read_chat_result(response).await
    }
}
