use thiserror::Error;

use crate::models::{ChatDetail, ChatView, MessageView};
use crate::providers::{ChatProvider, ChatResult, CreateChatRequest, ProviderError};

/// Number of most recent messages returned alongside a chat.
pub const MESSAGE_LIMIT: usize = 50;

pub const DEFAULT_MESSAGE: &str =
    "Create a Shopify product data generator that outputs realistic products, variants, and inventory as CSV and JSON.";

pub const DEFAULT_SYSTEM_PROMPT: &str = "You are an expert Shopify and e-commerce developer. \
Generate clean, typed Next.js and TypeScript code for commerce data tooling, \
and keep generated sample data consistent with the Shopify product import format.";

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("chatId is required")]
    MissingChatId,

    #[error("chatId and message are required for send action")]
    MissingSendFields,

    #[error("Invalid action. Use \"create\" or \"send\"")]
    InvalidAction,

    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    #[error("Invalid query string: {0}")]
    InvalidQuery(String),

    #[error("Streaming responses are not supported. Use sync mode.")]
    StreamingUnsupported,

    #[error(transparent)]
    Provider(#[from] ProviderError),
}

impl ChatError {
    /// Configuration failures are server faults; everything else is reported
    /// as a bad request.
    pub fn is_configuration_error(&self) -> bool {
        matches!(self, ChatError::Provider(ProviderError::MissingApiKey))
    }
}

/// Load a chat with its most recent messages, flattened for the browser.
pub async fn load_chat(provider: &dyn ChatProvider, chat_id: &str) -> Result<ChatView, ChatError> {
    let chat_id = required(Some(chat_id)).ok_or(ChatError::MissingChatId)?;

    let detail = provider.get_chat(chat_id).await?;
    let messages = provider.find_messages(chat_id, MESSAGE_LIMIT).await?;

    Ok(ChatView {
        chat_id: detail.id,
        web_url: detail.web_url,
        api_url: detail.api_url,
        shareable: detail.shareable,
        privacy: detail.privacy,
        latest_version: None,
        messages: messages.into_iter().map(MessageView::from).collect(),
    })
}

/// Start a new chat. Blank or missing message and system text fall back to
/// the commerce generator defaults.
pub async fn create_chat(
    provider: &dyn ChatProvider,
    message: Option<&str>,
    system: Option<&str>,
) -> Result<ChatView, ChatError> {
    let request = CreateChatRequest {
        message: required(message).unwrap_or(DEFAULT_MESSAGE).to_string(),
        system: Some(required(system).unwrap_or(DEFAULT_SYSTEM_PROMPT).to_string()),
    };

    let result = provider.create_chat(request).await?;
    into_view(result)
}

/// Append a message to an existing chat.
pub async fn send_message(
    provider: &dyn ChatProvider,
    chat_id: Option<&str>,
    message: Option<&str>,
) -> Result<ChatView, ChatError> {
    let (chat_id, message) = match (required(chat_id), required(message)) {
        (Some(chat_id), Some(message)) => (chat_id, message),
        _ => return Err(ChatError::MissingSendFields),
    };

    let result = provider.send_message(chat_id, message).await?;
    into_view(result)
}

fn into_view(result: ChatResult) -> Result<ChatView, ChatError> {
    match result {
        ChatResult::Detail(detail) => Ok(detail_view(detail)),
        ChatResult::Stream => Err(ChatError::StreamingUnsupported),
    }
}

fn detail_view(detail: ChatDetail) -> ChatView {
    ChatView {
        chat_id: detail.id,
        web_url: detail.web_url,
        api_url: detail.api_url,
        shareable: detail.shareable,
        privacy: detail.privacy,
        latest_version: detail.latest_version.map(Into::into),
        messages: detail
            .messages
            .unwrap_or_default()
            .into_iter()
            .map(MessageView::from)
            .collect(),
    }
}

fn required(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::models::{ChatMessage, LatestVersion, Role, VersionFile};
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// In-memory provider recording every call it receives.
    #[derive(Default)]
    pub(crate) struct FakeProvider {
        pub missing_key: bool,
        pub stream: bool,
        pub calls: Mutex<Vec<String>>,
        pub last_create: Mutex<Option<CreateChatRequest>>,
    }

    impl FakeProvider {
        fn check(&self, call: String) -> Result<(), ProviderError> {
            self.calls.lock().unwrap().push(call);
            if self.missing_key {
                return Err(ProviderError::MissingApiKey);
            }
            Ok(())
        }

        pub fn detail(id: &str) -> ChatDetail {
            ChatDetail {
                id: id.to_string(),
                web_url: format!("https://v0.dev/chat/{}", id),
                api_url: format!("https://api.v0.dev/v1/chats/{}", id),
                shareable: true,
                privacy: "private".to_string(),
                latest_version: Some(LatestVersion {
                    files: vec![VersionFile {
                        name: "app/page.tsx".to_string(),
                        content: "export default function Page() {}".to_string(),
                    }],
                    ..LatestVersion::default()
                }),
                messages: Some(vec![message("m1", Role::User, "hello")]),
            }
        }

        fn result(&self, id: &str) -> ChatResult {
            if self.stream {
                ChatResult::Stream
            } else {
                ChatResult::Detail(Self::detail(id))
            }
        }
    }

    pub(crate) fn message(id: &str, role: Role, content: &str) -> ChatMessage {
        ChatMessage {
            id: id.to_string(),
            role,
            content: content.to_string(),
            created_at: None,
        }
    }

    #[async_trait]
    impl ChatProvider for FakeProvider {
        async fn get_chat(&self, chat_id: &str) -> Result<ChatDetail, ProviderError> {
            self.check(format!("get:{}", chat_id))?;
            if chat_id == "unknown" {
                return Err(ProviderError::NotFound(chat_id.to_string()));
            }
            Ok(Self::detail(chat_id))
        }

        async fn find_messages(
            &self,
            chat_id: &str,
            limit: usize,
        ) -> Result<Vec<ChatMessage>, ProviderError> {
            self.check(format!("messages:{}:{}", chat_id, limit))?;
            Ok(vec![
                message("m1", Role::User, "make products"),
                message("m2", Role::Assistant, "here you go"),
            ])
        }

        async fn create_chat(&self, request: CreateChatRequest) -> Result<ChatResult, ProviderError> {
            self.check("create".to_string())?;
            *self.last_create.lock().unwrap() = Some(request);
            Ok(self.result("created"))
        }

        async fn send_message(
            &self,
            chat_id: &str,
            message: &str,
        ) -> Result<ChatResult, ProviderError> {
            self.check(format!("send:{}:{}", chat_id, message))?;
            Ok(self.result(chat_id))
        }
    }

    #[tokio::test]
    async fn test_load_chat_fetches_detail_then_fifty_messages() {
        let provider = FakeProvider::default();
        let view = load_chat(&provider, "chat_1").await.unwrap();

        assert_eq!(view.chat_id, "chat_1");
        assert_eq!(view.messages.len(), 2);
        assert_eq!(view.messages[1].role, Role::Assistant);
        assert!(view.latest_version.is_none());
        assert_eq!(
            *provider.calls.lock().unwrap(),
            vec!["get:chat_1".to_string(), "messages:chat_1:50".to_string()]
        );
    }

    #[tokio::test]
    async fn test_load_chat_rejects_blank_id() {
        let provider = FakeProvider::default();
        let err = load_chat(&provider, "  ").await.unwrap_err();
        assert!(matches!(err, ChatError::MissingChatId));
        assert!(provider.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_chat_applies_defaults() {
        let provider = FakeProvider::default();
        let view = create_chat(&provider, None, Some("")).await.unwrap();

        let request = provider.last_create.lock().unwrap().clone().unwrap();
        assert_eq!(request.message, DEFAULT_MESSAGE);
        assert_eq!(request.system.as_deref(), Some(DEFAULT_SYSTEM_PROMPT));

        assert_eq!(view.chat_id, "created");
        let version = view.latest_version.unwrap();
        assert_eq!(version.files[0].name, "app/page.tsx");
        assert_eq!(view.messages.len(), 1);
    }

    #[tokio::test]
    async fn test_create_chat_keeps_caller_text() {
        let provider = FakeProvider::default();
        create_chat(&provider, Some("seed 20 products"), Some("json only"))
            .await
            .unwrap();

        let request = provider.last_create.lock().unwrap().clone().unwrap();
        assert_eq!(request.message, "seed 20 products");
        assert_eq!(request.system.as_deref(), Some("json only"));
    }

    #[tokio::test]
    async fn test_send_requires_chat_id_and_message() {
        let provider = FakeProvider::default();
        for (chat_id, message) in [(None, Some("hi")), (Some("chat_1"), None), (Some(""), Some("hi"))] {
            let err = send_message(&provider, chat_id, message).await.unwrap_err();
            assert!(matches!(err, ChatError::MissingSendFields));
        }
        assert!(provider.calls.lock().unwrap().is_empty());

        let view = send_message(&provider, Some("chat_1"), Some("add SKUs")).await.unwrap();
        assert_eq!(view.chat_id, "chat_1");
        assert_eq!(
            provider.calls.lock().unwrap().last().unwrap(),
            "send:chat_1:add SKUs"
        );
    }

    #[tokio::test]
    async fn test_stream_result_is_rejected() {
        let provider = FakeProvider {
            stream: true,
            ..FakeProvider::default()
        };
        let err = create_chat(&provider, None, None).await.unwrap_err();
        assert!(matches!(err, ChatError::StreamingUnsupported));
        assert!(!err.is_configuration_error());

        let err = send_message(&provider, Some("c"), Some("m")).await.unwrap_err();
        assert!(matches!(err, ChatError::StreamingUnsupported));
    }

    #[tokio::test]
    async fn test_missing_key_is_a_configuration_error() {
        let provider = FakeProvider {
            missing_key: true,
            ..FakeProvider::default()
        };
        let err = load_chat(&provider, "chat_1").await.unwrap_err();
        assert!(err.is_configuration_error());
        assert_eq!(err.to_string(), "V0_API_KEY is not configured");
    }
}
