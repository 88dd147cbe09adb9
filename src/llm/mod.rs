pub mod client;
pub mod prompt;
pub mod response;
pub mod secrets;

pub use client::{GeminiClient, LlmError, ModelClient, ModelReply, require_api_key, test_configured_api_key};
pub use prompt::build_prompt;
pub use secrets::{clear_api_key, prompt_for_api_key, store_api_key};
