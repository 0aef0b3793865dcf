//! Remote model integration: prompt composition, credential handling and evaluation

pub mod analyzer;
pub mod client;
pub mod inference;
pub mod prompts;

pub use analyzer::{preview_prompt, Evaluator};
pub use client::{validate_credential, ApiKey, ClientSettings, ReadyClient};
pub use inference::{GeminiModel, GenerativeModel};
pub use prompts::compose_prompt;
