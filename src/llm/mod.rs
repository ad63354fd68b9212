pub mod client;
pub mod prompt;
pub mod response;
pub mod secrets;

pub use client::{ModelClient, OpenAiModelClient, QUIZ_MODEL, check_credential_shape, test_credential};
pub use secrets::{ApiKeySource, clear_api_key, resolve_credential, store_api_key};
