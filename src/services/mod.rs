pub mod chat;

pub use chat::ChatError;
