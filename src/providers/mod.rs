pub mod traits;
pub mod types;
pub mod v0;

pub use traits::ChatProvider;
pub use types::{ChatResult, CreateChatRequest, ProviderError};
pub use v0::V0Provider;
