//! OpenAI Chat Completions client (`async-openai`).
//!
//! Works against any OpenAI-compatible endpoint (`OPENAI_BASE_URL`). Sampling
//! follows [`ProviderSettings`]: greedy when temperature is zero or unset,
//! otherwise temperature plus optional top_p.

use async_trait::async_trait;
use tracing::{debug, trace};

use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessage,
        ChatCompletionRequestUserMessage, CreateChatCompletionRequestArgs,
    },
    Client,
};

use crate::error::AgentError;
use crate::llm::{LlmClient, LlmResponse, LlmUsage, ProviderSettings};
use crate::message::Message;

/// OpenAI Chat Completions client implementing `LlmClient`.
///
/// **Interaction**: Built by the CLI from `ProviderSettings::from_env()`; shared
/// by every provider-backed stage.
pub struct ChatOpenAI {
    client: Client<OpenAIConfig>,
    model: String,
    temperature: Option<f32>,
    top_p: Option<f32>,
    max_tokens: Option<u32>,
    system_prompt: Option<String>,
}

impl ChatOpenAI {
    /// Build client with default config (API key from `OPENAI_API_KEY` env).
    pub fn new(model: impl Into<String>) -> Self {
        Self::with_config(OpenAIConfig::new(), model)
    }

    /// Build client with custom config (e.g. custom API key or base URL).
    pub fn with_config(config: OpenAIConfig, model: impl Into<String>) -> Self {
        Self {
            client: Client::with_config(config),
            model: model.into(),
            temperature: None,
            top_p: None,
            max_tokens: None,
            system_prompt: None,
        }
    }

    /// Build client from settings: key, base URL, model, sampling, system prompt.
    pub fn from_settings(settings: &ProviderSettings) -> Self {
        let mut config = OpenAIConfig::new();
        if let Some(ref key) = settings.api_key {
            config = config.with_api_key(key.clone());
        }
        if let Some(ref base) = settings.api_base {
            config = config.with_api_base(base.clone());
        }
        let mut client = Self::with_config(config, settings.model.clone());
        if settings.is_greedy() {
            client.temperature = Some(0.0);
        } else {
            client.temperature = settings.temperature;
            client.top_p = settings.top_p;
        }
        client.max_tokens = settings.max_tokens;
        if !settings.system_prompt.trim().is_empty() {
            client.system_prompt = Some(settings.system_prompt.clone());
        }
        client
    }

    /// Set temperature (0–2). Lower values are more deterministic.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set the system prompt prepended to every request.
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    /// Convert our `Message` list to OpenAI request messages, system prompt first.
    fn messages_to_request(&self, messages: &[Message]) -> Vec<ChatCompletionRequestMessage> {
        let preamble = self.system_prompt.iter().map(|s| {
            ChatCompletionRequestMessage::System(ChatCompletionRequestSystemMessage::from(
                s.as_str(),
            ))
        });
        let body = messages.iter().map(|m| match m {
            Message::System(s) => ChatCompletionRequestMessage::System(
                ChatCompletionRequestSystemMessage::from(s.as_str()),
            ),
            Message::User(s) => {
                ChatCompletionRequestMessage::User(ChatCompletionRequestUserMessage::from(s.as_str()))
            }
            Message::Assistant(s) => ChatCompletionRequestMessage::Assistant((s.as_str()).into()),
        });
        preamble.chain(body).collect()
    }
}

#[async_trait]
impl LlmClient for ChatOpenAI {
    async fn invoke(&self, messages: &[Message]) -> Result<LlmResponse, AgentError> {
        let mut args = CreateChatCompletionRequestArgs::default();
        args.model(self.model.clone());
        args.messages(self.messages_to_request(messages));
        if let Some(t) = self.temperature {
            args.temperature(t);
        }
        if let Some(p) = self.top_p {
            args.top_p(p);
        }
        if let Some(n) = self.max_tokens {
            args.max_completion_tokens(n);
        }
        let request = args
            .build()
            .map_err(|e| AgentError::Provider(format!("OpenAI request build failed: {}", e)))?;

        debug!(
            model = %self.model,
            message_count = messages.len(),
            temperature = ?self.temperature,
            top_p = ?self.top_p,
            max_tokens = ?self.max_tokens,
            "OpenAI chat create"
        );
        trace!(request = ?request, "OpenAI request body");

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| AgentError::Provider(format!("OpenAI API error: {}", e)))?;

        let usage = response.usage.as_ref().map(|u| LlmUsage {
            prompt_tokens: u.prompt_tokens,
            completion_tokens: u.completion_tokens,
            total_tokens: u.total_tokens,
        });
        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| AgentError::Provider("OpenAI returned no choices".to_string()))?;
        let content = choice.message.content.unwrap_or_default();
        debug!(content_len = content.len(), usage = ?usage, "OpenAI chat response");
        Ok(LlmResponse { content, usage })
    }
}
