//! Bot module for handling Telegram interactions
//!
//! This module is split into several submodules for better organization:
//! - `message_handler`: Handles `/start`, `/demo` and freeform product text
//! - `callback_handler`: Handles inline keyboard callback queries
//! - `ui_builder`: Creates keyboards and message copy

pub mod callback_handler;
pub mod message_handler;
pub mod ui_builder;

pub use callback_handler::{callback_handler, CallbackAction};
pub use message_handler::message_handler;

use std::sync::Arc;
use teloxide::prelude::*;
use tracing::error;

use crate::dialogue::ChatDialogue;
use crate::state::BotState;

/// Outermost boundary for message updates: a fault in one update is logged
/// with full context, answered with a single generic apology, and never
/// reaches the dispatcher loop.
pub async fn dispatch_message(
    bot: Bot,
    msg: Message,
    state: Arc<BotState>,
    dialogue: ChatDialogue,
) -> anyhow::Result<()> {
    let chat_id = msg.chat.id;
    if let Err(e) = message_handler(bot.clone(), msg, state, dialogue).await {
        error!(chat_id = %chat_id, error = ?e, "Message handler failed");
        let _ = bot.send_message(chat_id, ui_builder::failure_text()).await;
    }
    Ok(())
}

/// Outermost boundary for callback-query updates, same policy as
/// [`dispatch_message`].
pub async fn dispatch_callback(
    bot: Bot,
    q: CallbackQuery,
    state: Arc<BotState>,
    dialogue: ChatDialogue,
) -> anyhow::Result<()> {
    let chat_id = q
        .message
        .as_ref()
        .map(|msg| msg.chat().id)
        .unwrap_or(ChatId(q.from.id.0 as i64));
    if let Err(e) = callback_handler(bot.clone(), q, state, dialogue).await {
        error!(chat_id = %chat_id, error = ?e, "Callback handler failed");
        let _ = bot.send_message(chat_id, ui_builder::failure_text()).await;
    }
    Ok(())
}
