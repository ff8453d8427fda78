//! Chat message types sent to the capability provider.
//!
//! Every stage builds a short conversation: a system message carrying the stage
//! instructions followed by one user message with the state excerpt it works on.

/// A single message in a provider request.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Message {
    /// Stage instructions; placed first in the list.
    System(String),
    /// Stage input (requirements, design, code, feedback...).
    User(String),
    /// Provider reply.
    Assistant(String),
}

impl Message {
    /// Creates a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self::System(content.into())
    }

    /// Creates a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self::User(content.into())
    }

    /// Creates an assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::Assistant(content.into())
    }

    /// Text content regardless of role.
    pub fn content(&self) -> &str {
        match self {
            Message::System(s) | Message::User(s) | Message::Assistant(s) => s,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// **Scenario**: constructors produce the matching variant and `content` reads it back.
    #[test]
    fn constructors_and_content() {
        assert!(matches!(Message::system("s"), Message::System(ref c) if c == "s"));
        assert!(matches!(Message::user("u"), Message::User(ref c) if c == "u"));
        assert_eq!(Message::assistant("a").content(), "a");
    }
}
