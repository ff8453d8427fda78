//! Mock LLM for tests.
//!
//! Replies from a script (one entry per call, in order), then a fixed default.
//! Every request is recorded so tests can assert on the prompt a stage built.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::AgentError;
use crate::llm::{LlmClient, LlmResponse};
use crate::message::Message;

/// Scripted reply: text, or a provider failure.
#[derive(Debug, Clone)]
enum Scripted {
    Reply(String),
    Fail(String),
}

/// Mock LLM: scripted replies plus a recording of every prompt.
///
/// **Interaction**: Implements `LlmClient`; injected into the stage nodes by tests.
pub struct MockLlm {
    default_reply: String,
    script: Mutex<VecDeque<Scripted>>,
    prompts: Mutex<Vec<Vec<Message>>>,
}

impl MockLlm {
    /// A mock that answers every call with `default_reply`.
    pub fn new(default_reply: impl Into<String>) -> Self {
        Self {
            default_reply: default_reply.into(),
            script: Mutex::new(VecDeque::new()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Queues replies returned in order before falling back to the default.
    pub fn with_replies<I, T>(self, replies: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        if let Ok(mut script) = self.script.lock() {
            script.extend(replies.into_iter().map(|r| Scripted::Reply(r.into())));
        }
        self
    }

    /// Queues one provider failure after the replies queued so far.
    pub fn with_failure(self, message: impl Into<String>) -> Self {
        if let Ok(mut script) = self.script.lock() {
            script.push_back(Scripted::Fail(message.into()));
        }
        self
    }

    /// Queues a reply on an already shared mock.
    pub fn push_reply(&self, reply: impl Into<String>) {
        if let Ok(mut script) = self.script.lock() {
            script.push_back(Scripted::Reply(reply.into()));
        }
    }

    /// Every request seen so far, oldest first.
    pub fn prompts(&self) -> Vec<Vec<Message>> {
        self.prompts.lock().map(|p| p.clone()).unwrap_or_default()
    }

    /// The last request, joined into one string (all roles).
    pub fn last_prompt_text(&self) -> Option<String> {
        self.prompts().last().map(|messages| {
            messages
                .iter()
                .map(Message::content)
                .collect::<Vec<_>>()
                .join("\n")
        })
    }

    pub fn call_count(&self) -> usize {
        self.prompts.lock().map(|p| p.len()).unwrap_or_default()
    }
}

#[async_trait]
impl LlmClient for MockLlm {
    async fn invoke(&self, messages: &[Message]) -> Result<LlmResponse, AgentError> {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(messages.to_vec());
        }
        let next = self.script.lock().ok().and_then(|mut s| s.pop_front());
        match next {
            Some(Scripted::Reply(text)) => Ok(LlmResponse::text(text)),
            Some(Scripted::Fail(message)) => Err(AgentError::Provider(message)),
            None => Ok(LlmResponse::text(self.default_reply.clone())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// **Scenario**: scripted replies come first, in order, then the default; prompts are recorded.
    #[tokio::test]
    async fn mock_replies_in_order_then_default() {
        let llm = MockLlm::new("default").with_replies(["one", "two"]);
        let prompt = [Message::system("sys"), Message::user("hello")];
        assert_eq!(llm.invoke(&prompt).await.unwrap().content, "one");
        assert_eq!(llm.invoke(&prompt).await.unwrap().content, "two");
        assert_eq!(llm.invoke(&prompt).await.unwrap().content, "default");
        assert_eq!(llm.call_count(), 3);
        assert_eq!(llm.last_prompt_text().unwrap(), "sys\nhello");
    }

    /// **Scenario**: a queued failure surfaces as a Provider error once.
    #[tokio::test]
    async fn mock_failure_is_provider_error() {
        let llm = MockLlm::new("ok").with_failure("rate limited");
        let err = llm.invoke(&[Message::user("x")]).await.unwrap_err();
        assert!(matches!(err, AgentError::Provider(ref m) if m == "rate limited"));
        assert_eq!(llm.invoke(&[Message::user("x")]).await.unwrap().content, "ok");
    }
}
