use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use thiserror::Error;
use url::Url;

use crate::models::{AuthProvider, GitHubConnection, PushRequest, PushResponse, SessionInfo};

const AUTH_INFO_PATH: &str = "/api/auth/info";
const GITHUB_STATUS_PATH: &str = "/api/auth/github/status";
const SIGN_OUT_PATH: &str = "/api/auth/signout";
const GITHUB_PUSH_PATH: &str = "/api/github/push";

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("{message}")]
    RequestFailed { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// The app's own auth and GitHub endpoints, as seen from the header.
#[async_trait]
pub trait AppApi: Send + Sync {
    async fn session_info(&self) -> Result<SessionInfo, ClientError>;

    async fn github_status(&self) -> Result<GitHubConnection, ClientError>;

    async fn sign_out(&self) -> Result<(), ClientError>;

    async fn push(&self, request: PushRequest) -> Result<PushResponse, ClientError>;

    /// Browser redirect target that starts the OAuth flow for `provider`.
    fn signin_url(&self, provider: AuthProvider, next: Option<&str>) -> String;
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

pub struct HttpAppApi {
    client: Client,
    base_url: Url,
}

impl HttpAppApi {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let base_url =
            Url::parse(base_url).map_err(|e| ClientError::InvalidUrl(format!("{}: {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::InvalidUrl(base_url.to_string()));
        }
        Ok(Self {
            client: Client::new(),
            base_url,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, ClientError> {
        self.base_url
            .join(path)
            .map_err(|e| ClientError::InvalidUrl(format!("{}: {}", path, e)))
    }

    async fn check_status(response: Response) -> Result<Response, ClientError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&body)
            .map(|b| b.error)
            .unwrap_or_else(|_| format!("HTTP {}", status.as_u16()));
        Err(ClientError::RequestFailed {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl AppApi for HttpAppApi {
    async fn session_info(&self) -> Result<SessionInfo, ClientError> {
        let response = self
            .client
            .get(self.endpoint(AUTH_INFO_PATH)?)
            .send()
            .await
            .map_err(|e| ClientError::NetworkError(e.to_string()))?;

        // Signed-out visitors may get a 401 instead of an empty session
        if response.status() == StatusCode::UNAUTHORIZED {
            return Ok(SessionInfo::default());
        }

        Self::check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| ClientError::InvalidResponse(e.to_string()))
    }

    async fn github_status(&self) -> Result<GitHubConnection, ClientError> {
        let response = self
            .client
            .get(self.endpoint(GITHUB_STATUS_PATH)?)
            .send()
            .await
            .map_err(|e| ClientError::NetworkError(e.to_string()))?;

        Self::check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| ClientError::InvalidResponse(e.to_string()))
    }

    async fn sign_out(&self) -> Result<(), ClientError> {
        let response = self
            .client
            .post(self.endpoint(SIGN_OUT_PATH)?)
            .send()
            .await
            .map_err(|e| ClientError::NetworkError(e.to_string()))?;

        Self::check_status(response).await?;
        Ok(())
    }

    async fn push(&self, request: PushRequest) -> Result<PushResponse, ClientError> {
        let response = self
            .client
            .post(self.endpoint(GITHUB_PUSH_PATH)?)
            .json(&request)
            .send()
            .await
            .map_err(|e| ClientError::NetworkError(e.to_string()))?;

        Self::check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| ClientError::InvalidResponse(e.to_string()))
    }

    fn signin_url(&self, provider: AuthProvider, next: Option<&str>) -> String {
        let mut url = self.base_url.clone();
        url.set_path(&format!("/api/auth/signin/{}", provider.as_str()));
        url.set_query(None);
        if let Some(next) = next.filter(|n| !n.is_empty()) {
            url.query_pairs_mut().append_pair("next", next);
        }
        url.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode as AxumStatus;
    use axum::response::IntoResponse;
    use axum::routing::{get, post};
    use axum::{Json, Router};

    async fn spawn_app(signed_in: bool) -> String {
        let app = Router::new()
            .route(
                AUTH_INFO_PATH,
                get(move || async move {
                    if signed_in {
                        Json(serde_json::json!({
                            "user": { "id": "u1", "username": "merchant", "name": "Mia Merchant" },
                            "authProvider": "vercel"
                        }))
                        .into_response()
                    } else {
                        AxumStatus::UNAUTHORIZED.into_response()
                    }
                }),
            )
            .route(
                GITHUB_STATUS_PATH,
                get(|| async {
                    Json(serde_json::json!({
                        "connected": true,
                        "username": "octocat",
                        "connectedAt": "2025-04-02T10:00:00Z"
                    }))
                }),
            )
            .route(SIGN_OUT_PATH, post(|| async { Json(serde_json::json!({ "success": true })) }))
            .route(
                GITHUB_PUSH_PATH,
                post(|Json(body): Json<serde_json::Value>| async move {
                    if body["repo"] == "locked" {
                        return (
                            AxumStatus::FORBIDDEN,
                            Json(serde_json::json!({ "error": "No write access to acme/locked" })),
                        )
                            .into_response();
                    }
                    Json(serde_json::json!({
                        "success": true,
                        "commitUrl": format!(
                            "https://github.com/{}/{}/commit/abc123",
                            body["owner"].as_str().unwrap_or_default(),
                            body["repo"].as_str().unwrap_or_default()
                        ),
                        "commitSha": body["branch"]
                    }))
                    .into_response()
                }),
            );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn push_request(repo: &str) -> PushRequest {
        PushRequest {
            owner: "acme".to_string(),
            repo: repo.to_string(),
            branch: "main".to_string(),
            chat_id: Some("chat_1".to_string()),
            commit_message: None,
        }
    }

    #[test]
    fn test_signin_url_carries_next() {
        let api = HttpAppApi::new("https://shop.example.com/dashboard?tab=1").unwrap();
        assert_eq!(
            api.signin_url(AuthProvider::Github, Some("/generator")),
            "https://shop.example.com/api/auth/signin/github?next=%2Fgenerator"
        );
        assert_eq!(
            api.signin_url(AuthProvider::Vercel, None),
            "https://shop.example.com/api/auth/signin/vercel"
        );
    }

    #[tokio::test]
    async fn test_session_and_status() {
        let api = HttpAppApi::new(&spawn_app(true).await).unwrap();

        let session = api.session_info().await.unwrap();
        let user = session.user.unwrap();
        assert_eq!(user.display_name(), "Mia Merchant");
        assert_eq!(session.auth_provider, Some(AuthProvider::Vercel));

        let status = api.github_status().await.unwrap();
        assert!(status.connected);
        assert_eq!(status.username.as_deref(), Some("octocat"));

        api.sign_out().await.unwrap();
    }

    #[tokio::test]
    async fn test_unauthorized_session_is_anonymous() {
        let api = HttpAppApi::new(&spawn_app(false).await).unwrap();
        let session = api.session_info().await.unwrap();
        assert_eq!(session, SessionInfo::default());
    }

    #[tokio::test]
    async fn test_push_success_and_error_message() {
        let api = HttpAppApi::new(&spawn_app(true).await).unwrap();

        let response = api.push(push_request("store")).await.unwrap();
        assert!(response.success);
        assert_eq!(
            response.commit_url.as_deref(),
            Some("https://github.com/acme/store/commit/abc123")
        );

        let err = api.push(push_request("locked")).await.unwrap_err();
        assert!(matches!(err, ClientError::RequestFailed { status: 403, .. }));
        assert_eq!(err.to_string(), "No write access to acme/locked");
    }
}
