//! Per-chat conversation state: the ephemeral pending-input flag.

use serde::{Deserialize, Serialize};
use teloxide::dispatching::dialogue::{Dialogue, InMemStorage};

/// Conversation state for one chat. `AwaitingDescription` marks that the
/// next freeform message is a product description; it is consumed exactly
/// once at the top of the text handler, whatever happens afterwards.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChatState {
    #[default]
    Idle,
    AwaitingDescription,
}

/// Type alias for our per-chat dialogue
pub type ChatDialogue = Dialogue<ChatState, InMemStorage<ChatState>>;

pub const MAX_DESCRIPTION_INPUT: usize = 2000;

/// Validates a freeform product description
pub fn validate_description(text: &str) -> Result<String, &'static str> {
    let trimmed = text.trim();

    if trimmed.is_empty() {
        return Err("empty");
    }

    if trimmed.chars().count() > MAX_DESCRIPTION_INPUT {
        return Err("too_long");
    }

    Ok(trimmed.to_string())
}
