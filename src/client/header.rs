use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::task::JoinHandle;

use super::api::{AppApi, ClientError};
use super::atoms::AppAtoms;
use crate::models::{AuthProvider, GitHubConnection, PushRequest, RepoSelection, SessionUser};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Loading,
    Authenticated {
        user: SessionUser,
        provider: Option<AuthProvider>,
    },
    Anonymous,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GitHubState {
    Loading,
    Connected {
        username: Option<String>,
        connected_at: Option<DateTime<Utc>>,
    },
    Disconnected,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushState {
    Idle,
    Loading,
    Success { commit_url: Option<String> },
    Error(String),
}

/// Session, GitHub connection, and push-target controller behind the app header.
///
/// Session and push state are local to one controller. The GitHub connection
/// and the repository selection live in [`AppAtoms`] and are shared.
pub struct HeaderController {
    api: Arc<dyn AppApi>,
    atoms: AppAtoms,
    session: SessionState,
    push: PushState,
    mounted: Arc<AtomicBool>,
    /// Status requests in flight.
    status_loading: Arc<AtomicUsize>,
}

impl HeaderController {
    pub fn new(api: Arc<dyn AppApi>, atoms: AppAtoms) -> Self {
        Self {
            api,
            atoms,
            session: SessionState::Loading,
            push: PushState::Idle,
            mounted: Arc::new(AtomicBool::new(false)),
            status_loading: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn push_state(&self) -> &PushState {
        &self.push
    }

    pub fn selection(&self) -> RepoSelection {
        self.atoms.selection.get()
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self.session, SessionState::Authenticated { .. })
    }

    pub fn github(&self) -> GitHubState {
        if self.status_loading.load(Ordering::SeqCst) > 0 {
            return GitHubState::Loading;
        }
        let connection = self.atoms.github_connection.get();
        if connection.connected {
            GitHubState::Connected {
                username: connection.username,
                connected_at: connection.connected_at,
            }
        } else {
            GitHubState::Disconnected
        }
    }

    /// Load the session and, once signed in, the GitHub connection.
    pub async fn mount(&mut self) {
        self.mounted.store(true, Ordering::SeqCst);
        self.load_session().await;
        if self.is_authenticated() {
            self.refresh_github_status().await;
        }
    }

    pub fn unmount(&self) {
        self.mounted.store(false, Ordering::SeqCst);
    }

    pub async fn load_session(&mut self) {
        self.session = SessionState::Loading;

        self.session = match self.api.session_info().await {
            Ok(info) => match info.user {
                Some(user) => SessionState::Authenticated {
                    user,
                    provider: info.auth_provider,
                },
                None => SessionState::Anonymous,
            },
            Err(e) => {
                tracing::error!("Failed to load session: {}", e);
                SessionState::Anonymous
            }
        };

        if !self.is_authenticated() {
            self.push = PushState::Idle;
            self.clear_github();
        }
    }

    pub async fn refresh_github_status(&self) {
        if !self.is_authenticated() {
            return;
        }
        Self::run_status_refresh(
            Arc::clone(&self.api),
            self.atoms.clone(),
            Arc::clone(&self.mounted),
            Arc::clone(&self.status_loading),
        )
        .await;
    }

    /// Refresh the GitHub connection in the background. The result is dropped
    /// if the controller is unmounted before the response arrives.
    pub fn spawn_status_refresh(&self) -> Option<JoinHandle<()>> {
        if !self.is_authenticated() {
            return None;
        }
        Some(tokio::spawn(Self::run_status_refresh(
            Arc::clone(&self.api),
            self.atoms.clone(),
            Arc::clone(&self.mounted),
            Arc::clone(&self.status_loading),
        )))
    }

    async fn run_status_refresh(
        api: Arc<dyn AppApi>,
        atoms: AppAtoms,
        mounted: Arc<AtomicBool>,
        loading: Arc<AtomicUsize>,
    ) {
        loading.fetch_add(1, Ordering::SeqCst);
        let result = api.github_status().await;
        loading.fetch_sub(1, Ordering::SeqCst);

        if !mounted.load(Ordering::SeqCst) {
            tracing::debug!("Discarding GitHub status received after unmount");
            return;
        }

        let connection = match result {
            Ok(connection) => connection,
            Err(e) => {
                tracing::error!("Failed to load GitHub status: {}", e);
                GitHubConnection::default()
            }
        };

        if !connection.connected {
            atoms.selection.reset();
        }
        atoms.github_connection.set(connection);
    }

    pub fn sign_in_url(&self, provider: AuthProvider, next: Option<&str>) -> String {
        self.api.signin_url(provider, next)
    }

    /// Sign out. Local state is cleared even when the request fails.
    pub async fn sign_out(&mut self) -> Result<(), ClientError> {
        let result = self.api.sign_out().await;
        if let Err(e) = &result {
            tracing::error!("Failed to sign out: {}", e);
        }

        self.session = SessionState::Anonymous;
        self.push = PushState::Idle;
        self.clear_github();
        result
    }

    pub fn set_owner(&mut self, owner: &str) {
        let owner = owner.trim().to_string();
        self.atoms.selection.update(|s| {
            if s.owner != owner {
                s.owner = owner;
                s.repo.clear();
            }
        });
        self.push = PushState::Idle;
    }

    pub fn set_repo(&mut self, repo: &str) {
        let repo = repo.trim().to_string();
        self.atoms.selection.update(|s| s.repo = repo);
        self.push = PushState::Idle;
    }

    pub fn set_branch(&mut self, branch: &str) {
        let branch = branch.trim().to_string();
        self.atoms.selection.update(|s| s.branch = branch);
        self.push = PushState::Idle;
    }

    /// Push the generated files of `chat_id` to the selected repository.
    pub async fn push(&mut self, chat_id: Option<&str>, commit_message: Option<&str>) -> &PushState {
        let selection = self.atoms.selection.get();

        if let Some(problem) = self.push_blocker(&selection) {
            self.push = PushState::Error(problem.to_string());
            return &self.push;
        }

        self.push = PushState::Loading;

        let request = PushRequest {
            owner: selection.owner.clone(),
            repo: selection.repo.clone(),
            branch: selection.effective_branch().to_string(),
            chat_id: chat_id.filter(|c| !c.is_empty()).map(str::to_string),
            commit_message: commit_message.filter(|m| !m.is_empty()).map(str::to_string),
        };

        self.push = match self.api.push(request).await {
            Ok(response) if response.success => {
                tracing::info!(
                    "Pushed to {}/{}@{}",
                    selection.owner,
                    selection.repo,
                    selection.effective_branch()
                );
                PushState::Success {
                    commit_url: response.commit_url,
                }
            }
            Ok(response) => {
                PushState::Error(response.error.unwrap_or_else(|| "Push failed".to_string()))
            }
            Err(e) => {
                tracing::error!("Failed to push to GitHub: {}", e);
                PushState::Error(e.to_string())
            }
        };

        &self.push
    }

    fn push_blocker(&self, selection: &RepoSelection) -> Option<&'static str> {
        if !self.is_authenticated() {
            return Some("Sign in to push to GitHub");
        }
        if !self.atoms.github_connection.get().connected {
            return Some("Connect your GitHub account first");
        }
        if selection.owner.is_empty() {
            return Some("Repository owner is required");
        }
        if selection.repo.is_empty() {
            return Some("Repository name is required");
        }
        None
    }

    fn clear_github(&self) {
        if !self.atoms.selection.get().is_empty() {
            tracing::debug!("Clearing repository selection");
        }
        self.atoms.github_connection.reset();
        self.atoms.selection.reset();
    }
}
