//! Structured provider output: JSON when the model complied, raw text otherwise.

use serde::de::DeserializeOwned;

use crate::error::AgentError;
use crate::llm::LlmClient;
use crate::message::Message;

/// What a stage got back from the provider.
///
/// Stages match on this explicitly: `Structured` carries the requested shape,
/// `RawText` the unparsed reply used by the stage's fallback.
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderOutput<T> {
    Structured(T),
    RawText(String),
}

impl<T> ProviderOutput<T> {
    pub fn is_structured(&self) -> bool {
        matches!(self, ProviderOutput::Structured(_))
    }
}

/// Removes a surrounding ```` ```json ```` (or bare ```` ``` ````) fence, if any.
pub fn strip_json_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let body = match rest.find('\n') {
        Some(pos) => &rest[pos + 1..],
        None => rest,
    };
    body.trim_end()
        .strip_suffix("```")
        .unwrap_or(body)
        .trim()
}

/// Parses `text` as `T`: first the fence-stripped text, then the outermost
/// `{ .. }` span. Anything else is `RawText` (logged at debug).
pub fn parse_structured<T: DeserializeOwned>(text: &str) -> ProviderOutput<T> {
    let stripped = strip_json_fence(text);
    if let Ok(value) = serde_json::from_str::<T>(stripped) {
        return ProviderOutput::Structured(value);
    }
    if let (Some(start), Some(end)) = (stripped.find('{'), stripped.rfind('}')) {
        if start < end {
            if let Ok(value) = serde_json::from_str::<T>(&stripped[start..=end]) {
                return ProviderOutput::Structured(value);
            }
        }
    }
    tracing::debug!(len = text.len(), "structured parse fell back to raw text");
    ProviderOutput::RawText(text.to_string())
}

/// Invokes the provider and parses the reply with [`parse_structured`].
///
/// Provider errors propagate; parse failures do not.
pub async fn invoke_structured<T: DeserializeOwned>(
    llm: &dyn LlmClient,
    messages: &[Message],
) -> Result<ProviderOutput<T>, AgentError> {
    let response = llm.invoke(messages).await?;
    Ok(parse_structured(&response.content))
}
