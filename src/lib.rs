// Public modules
pub mod chat;
pub mod client;
pub mod error;
pub mod gateway;
pub mod observability;
pub mod types;

// Re-exports
pub use client::{API_KEY_ENV, Gemini};
pub use error::{Error, Result};
pub use gateway::{CompletionGateway, GeminiGateway, RetryPolicy};
pub use observability::register_biometrics;
pub use types::*;
