use std::fmt;

use serde::{Deserialize, Serialize};

/// Who produced a chat turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Text the user submitted.
    User,
    /// Text the model replied with.
    Assistant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::User => f.write_str("user"),
            Role::Assistant => f.write_str("assistant"),
        }
    }
}

/// One message in the chat history. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    role: Role,
    #[serde(rename = "content")]
    text: String,
}

impl ChatTurn {
    /// Creates a turn.
    pub fn new(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            text: text.into(),
        }
    }

    /// Creates a user turn.
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Role::User, text)
    }

    /// Creates an assistant turn.
    pub fn assistant(text: impl Into<String>) -> Self {
        Self::new(Role::Assistant, text)
    }

    /// The producer of this turn.
    pub fn role(&self) -> Role {
        self.role
    }

    /// The text of this turn.
    pub fn text(&self) -> &str {
        &self.text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, to_value};

    #[test]
    fn serializes_as_role_and_content() {
        assert_eq!(
            to_value(ChatTurn::user("Hello")).unwrap(),
            json!({"role": "user", "content": "Hello"})
        );
        assert_eq!(
            to_value(ChatTurn::assistant("Hi there")).unwrap(),
            json!({"role": "assistant", "content": "Hi there"})
        );
    }

    #[test]
    fn accessors() {
        let turn = ChatTurn::new(Role::Assistant, "ok");
        assert_eq!(turn.role(), Role::Assistant);
        assert_eq!(turn.text(), "ok");
        assert_eq!(turn.role().to_string(), "assistant");
    }
}
