use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_BRANCH: &str = "main";

/// GitHub connection as reported by `/api/auth/github/status`, and the value
/// held by the shared connection atom.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GitHubConnection {
    pub connected: bool,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub connected_at: Option<DateTime<Utc>>,
}

/// Push target chosen by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoSelection {
    pub owner: String,
    pub repo: String,
    pub branch: String,
}

impl RepoSelection {
    pub fn is_empty(&self) -> bool {
        self.owner.is_empty() && self.repo.is_empty() && self.branch.is_empty()
    }

    pub fn effective_branch(&self) -> &str {
        let branch = self.branch.trim();
        if branch.is_empty() {
            DEFAULT_BRANCH
        } else {
            branch
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PushRequest {
    pub owner: String,
    pub repo: String,
    pub branch: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chat_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commit_message: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PushResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub commit_url: Option<String>,
    #[serde(default)]
    pub commit_sha: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_branch_falls_back_to_main() {
        let selection = RepoSelection {
            owner: "acme".to_string(),
            repo: "store".to_string(),
            branch: "  ".to_string(),
        };
        assert_eq!(selection.effective_branch(), "main");
        assert!(!selection.is_empty());
        assert!(RepoSelection::default().is_empty());
    }

    #[test]
    fn test_status_parses_connected_at() {
        let status: GitHubConnection = serde_json::from_value(serde_json::json!({
            "connected": true,
            "username": "octocat",
            "connectedAt": "2025-05-01T08:30:00Z"
        }))
        .unwrap();
        assert!(status.connected);
        assert_eq!(status.username.as_deref(), Some("octocat"));
        assert!(status.connected_at.is_some());

        let disconnected: GitHubConnection =
            serde_json::from_value(serde_json::json!({ "connected": false })).unwrap();
        assert_eq!(disconnected, GitHubConnection::default());
    }
}
