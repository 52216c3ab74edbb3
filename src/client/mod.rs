pub mod api;
pub mod atoms;
pub mod header;

pub use api::{AppApi, ClientError, HttpAppApi};
pub use atoms::{AppAtoms, Atom};
pub use header::{GitHubState, HeaderController, PushState, SessionState};
