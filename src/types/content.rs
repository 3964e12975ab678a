use serde::{Deserialize, Serialize};

/// The producer of a [`Content`] entry, as the Gemini API names it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentRole {
    /// Text written by the user.
    User,
    /// Text generated by the model.
    Model,
}

/// One part of a multi-part content entry.
///
/// Only text parts are modeled; other part kinds the API may return
/// (inline data, function calls) deserialize with `text == None` and are
/// skipped when assembling a reply.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    /// The text of this part.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    /// Set when the part is a model "thought" rather than answer text.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub thought: bool,
}

impl Part {
    /// Create a text part.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            thought: false,
        }
    }
}

/// A role-tagged list of parts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Content {
    /// The producer of the content; absent for system instructions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<ContentRole>,

    /// The ordered parts.
    #[serde(default)]
    pub parts: Vec<Part>,
}

impl Content {
    /// Create a single-part user content entry.
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Some(ContentRole::User),
            parts: vec![Part::text(text)],
        }
    }

    /// Create a role-less entry, the shape used for system instructions.
    pub fn instruction(text: impl Into<String>) -> Self {
        Self {
            role: None,
            parts: vec![Part::text(text)],
        }
    }

    /// Concatenates the non-thought text parts.
    pub fn joined_text(&self) -> String {
        self.parts
            .iter()
            .filter(|part| !part.thought)
            .filter_map(|part| part.text.as_deref())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, to_value};

    #[test]
    fn user_content_shape() {
        let content = Content::user("Hello");
        assert_eq!(
            to_value(&content).unwrap(),
            json!({"role": "user", "parts": [{"text": "Hello"}]})
        );
    }

    #[test]
    fn instruction_has_no_role() {
        let content = Content::instruction("Be brief.");
        assert_eq!(
            to_value(&content).unwrap(),
            json!({"parts": [{"text": "Be brief."}]})
        );
    }

    #[test]
    fn joined_text_skips_thoughts_and_non_text_parts() {
        let content: Content = serde_json::from_value(json!({
            "role": "model",
            "parts": [
                {"text": "pondering", "thought": true},
                {"text": "Hi "},
                {"inlineData": {"mimeType": "image/png", "data": ""}},
                {"text": "there"}
            ]
        }))
        .unwrap();
        assert_eq!(content.role, Some(ContentRole::Model));
        assert_eq!(content.joined_text(), "Hi there");
    }
}
