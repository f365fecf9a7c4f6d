//! Conversation types shared between the pipeline and its callers.

use serde::{Deserialize, Serialize};

/// Who produced a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Assistant,
    /// Pipeline-internal notices (e.g. an error persisted as a turn)
    System,
}

impl Sender {
    /// Label used when flattening history into a prompt.
    pub fn prompt_label(self) -> &'static str {
        match self {
            Sender::User => "User",
            Sender::Assistant | Sender::System => "Assistant",
        }
    }
}

/// One prior turn of the conversation, oldest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub sender: Sender,
    pub text: String,
}

impl ConversationTurn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            sender: Sender::User,
            text: text.into(),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            sender: Sender::Assistant,
            text: text.into(),
        }
    }
}

/// Flatten history into the "User: …\nAssistant: …" block prompts expect.
///
/// Returns a fixed placeholder when there is no history, so prompts can
/// always interpolate the block unconditionally.
pub fn render_history(history: &[ConversationTurn]) -> String {
    if history.is_empty() {
        return "No previous conversation.".to_string();
    }

    history
        .iter()
        .map(|turn| format!("{}: {}", turn.sender.prompt_label(), turn.text))
        .collect::<Vec<_>>()
        .join("\n")
}
