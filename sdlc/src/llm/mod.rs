//! Capability provider seam.
//!
//! Every stage talks to the model through [`LlmClient`]: given messages, return
//! assistant text. [`invoke_structured`] layers JSON parsing on top and yields
//! [`ProviderOutput`] so a stage can fall back to raw text when the model does
//! not return the requested shape.
//!
//! Implementations: [`MockLlm`] (scripted, records prompts) and [`ChatOpenAI`]
//! (OpenAI-compatible Chat Completions via `async-openai`).

mod mock;
mod openai;
mod settings;
mod structured;

pub use mock::MockLlm;
pub use openai::ChatOpenAI;
pub use settings::{ProviderSettings, SettingsError, DEFAULT_MODEL, DEFAULT_SYSTEM_PROMPT};
pub use structured::{invoke_structured, parse_structured, strip_json_fence, ProviderOutput};

use async_trait::async_trait;

use crate::error::AgentError;
use crate::message::Message;

/// Token usage for one call, when the provider reports it.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct LlmUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// Response from one completion.
#[derive(Clone, Debug, Default)]
pub struct LlmResponse {
    /// Assistant message content (plain text).
    pub content: String,
    pub usage: Option<LlmUsage>,
}

impl LlmResponse {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            usage: None,
        }
    }
}

/// LLM client: given messages, returns assistant text.
///
/// Failures (transport, auth, rate limit) are `AgentError::Provider`.
///
/// **Interaction**: Held as `Arc<dyn LlmClient>` by every provider-backed stage node.
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn invoke(&self, messages: &[Message]) -> Result<LlmResponse, AgentError>;
}
