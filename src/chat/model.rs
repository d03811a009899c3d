//! Chat transcript data model.

use serde::{Deserialize, Serialize};

/// Who wrote a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Origin {
    Assistant,
    Visitor,
}

/// Opaque identifier selecting a scripted dialog branch.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActionKey(String);

impl ActionKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ActionKey {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

impl std::fmt::Display for ActionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A button offered under an assistant message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatOption {
    pub label: String,
    pub action: ActionKey,
}

impl ChatOption {
    pub fn new(label: &str, action: &str) -> Self {
        Self {
            label: label.to_string(),
            action: ActionKey::from(action),
        }
    }
}

/// One transcript entry. Fields are read-only once constructed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
    origin: Origin,
    text: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    options: Vec<ChatOption>,
}

impl Message {
    pub fn assistant(text: impl Into<String>, options: Vec<ChatOption>) -> Self {
        Self {
            origin: Origin::Assistant,
            text: text.into(),
            options,
        }
    }

    pub fn visitor(text: impl Into<String>) -> Self {
        Self {
            origin: Origin::Visitor,
            text: text.into(),
            options: Vec::new(),
        }
    }

    pub fn origin(&self) -> Origin {
        self.origin
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn options(&self) -> &[ChatOption] {
        &self.options
    }
}

/// Append-only chat history. Render order is insertion order.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct Transcript {
    messages: Vec<Message>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Label of the most recently offered option carrying `action`.
    pub fn option_label(&self, action: &str) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .flat_map(|m| m.options.iter())
            .find(|o| o.action.as_str() == action)
            .map(|o| o.label.as_str())
    }
}
