pub mod chat;
pub mod github;
pub mod session;

pub use chat::{ChatDetail, ChatMessage, ChatView, LatestVersion, MessageView, Role, VersionFile};
pub use github::{GitHubConnection, PushRequest, PushResponse, RepoSelection};
pub use session::{AuthProvider, SessionInfo, SessionUser};
