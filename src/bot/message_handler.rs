//! Message Handler module for processing incoming Telegram messages

use anyhow::Result;
use serde_json::json;
use std::sync::Arc;
use teloxide::prelude::*;
use teloxide::types::{InputFile, ParseMode};
use tracing::{debug, info, warn};

use crate::card::render_caption;
use crate::dialogue::{validate_description, ChatDialogue, ChatState};
use crate::plans::Plan;
use crate::session::{load_session, save_session};
use crate::state::BotState;

use super::ui_builder::{
    activation_prompt_keyboard, activation_prompt_text, demo_text, free_followup_keyboard,
    free_followup_text, invalid_description_text, main_menu_keyboard, paid_followup_keyboard,
    paid_followup_text, progress_text, quota_exhausted_keyboard, quota_exhausted_text,
    unknown_command_text, welcome_text,
};

/// Identify the sender: user id, username and first name, with fallbacks for
/// channel-style updates that carry no user.
fn sender(msg: &Message) -> (u64, String, String) {
    match msg.from.as_ref() {
        Some(user) => (
            user.id.0,
            user.username
                .clone()
                .unwrap_or_else(|| "Unknown".to_string()),
            user.first_name.clone(),
        ),
        None => (
            msg.chat.id.0.unsigned_abs(),
            "Unknown".to_string(),
            "there".to_string(),
        ),
    }
}

pub async fn message_handler(
    bot: Bot,
    msg: Message,
    state: Arc<BotState>,
    dialogue: ChatDialogue,
) -> Result<()> {
    let Some(text) = msg.text() else {
        bot.send_message(
            msg.chat.id,
            "📦 Send me a text description of your product, or /start for the menu.",
        )
        .await?;
        return Ok(());
    };

    if text == "/start" {
        handle_start(&bot, &msg, &state).await
    } else if text == "/demo" {
        handle_demo(&bot, &msg, &state).await
    } else if text.starts_with('/') {
        bot.send_message(msg.chat.id, unknown_command_text()).await?;
        Ok(())
    } else {
        handle_product_text(&bot, &msg, &state, dialogue, text).await
    }
}

async fn handle_start(bot: &Bot, msg: &Message, state: &BotState) -> Result<()> {
    let (user_id, username, first_name) = sender(msg);
    info!(user_id, username = %username, "New /start");

    state.notifier.track_with(
        user_id,
        "start_command",
        json!({ "username": username, "first_name": first_name }),
    );
    state.notifier.lead(user_id, &username, "start");

    bot.send_message(msg.chat.id, welcome_text(&first_name))
        .parse_mode(ParseMode::Markdown)
        .reply_markup(main_menu_keyboard())
        .await?;
    Ok(())
}

async fn handle_demo(bot: &Bot, msg: &Message, state: &BotState) -> Result<()> {
    let (user_id, username, _) = sender(msg);
    info!(user_id, "/demo command");

    state.notifier.track(user_id, "demo_command");
    state.notifier.lead(user_id, &username, "demo_command_used");

    bot.send_message(msg.chat.id, demo_text(state.config.free_quota))
        .parse_mode(ParseMode::Markdown)
        .reply_markup(activation_prompt_keyboard())
        .await?;
    Ok(())
}

/// Freeform text: authorize against the session, generate a card, account
/// for the free quota and offer the follow-up menu.
async fn handle_product_text(
    bot: &Bot,
    msg: &Message,
    state: &BotState,
    dialogue: ChatDialogue,
    text: &str,
) -> Result<()> {
    let (user_id, _, _) = sender(msg);
    debug!(user_id, message_length = text.len(), "Received text message from user");

    state
        .notifier
        .track_with(user_id, "text_input", json!({ "text_length": text.len() }));

    // Consume the pending-input flag exactly once, whatever happens below.
    if matches!(dialogue.get().await?, Some(ChatState::AwaitingDescription)) {
        dialogue.update(ChatState::Idle).await?;
    }

    let session = load_session(state.sessions.as_ref(), user_id).await?;
    let Some(mut session) = session.filter(|s| s.is_active()) else {
        bot.send_message(msg.chat.id, activation_prompt_text(state.config.free_quota))
            .reply_markup(activation_prompt_keyboard())
            .await?;
        return Ok(());
    };

    if session.quota_exhausted() {
        info!(user_id, "Demo quota exhausted, offering upgrade");
        bot.send_message(msg.chat.id, quota_exhausted_text())
            .parse_mode(ParseMode::Markdown)
            .reply_markup(quota_exhausted_keyboard())
            .await?;
        return Ok(());
    }

    let description = match validate_description(text) {
        Ok(description) => description,
        Err(reason) => {
            debug!(user_id, reason, "Rejected product description");
            bot.send_message(msg.chat.id, invalid_description_text())
                .await?;
            return Ok(());
        }
    };

    bot.send_message(
        msg.chat.id,
        progress_text(session.plan, session.activations_left),
    )
    .await?;

    let card = state.generator.generate(&description, user_id).await;
    let caption = render_caption(&card, session.plan);

    // Quota is spent on delivery of a card, fallback included; persist
    // before replying so a send failure cannot hand out a free retry.
    if session.plan == Plan::Free {
        session.consume_activation();
        save_session(state.sessions.as_ref(), user_id, &session).await?;
    }

    deliver_card(bot, msg, user_id, &card.image_url, &caption).await?;
    info!(user_id, plan = session.plan.slug(), "Card delivered");

    if session.plan == Plan::Free {
        let remaining = session.activations_left;
        bot.send_message(msg.chat.id, free_followup_text(remaining))
            .parse_mode(ParseMode::Markdown)
            .reply_markup(free_followup_keyboard(remaining))
            .await?;
    } else {
        bot.send_message(msg.chat.id, paid_followup_text())
            .reply_markup(paid_followup_keyboard())
            .await?;
    }

    Ok(())
}

/// Send the card as a photo with caption; a bad or rejected image URL
/// degrades to the caption as plain text.
async fn deliver_card(
    bot: &Bot,
    msg: &Message,
    user_id: u64,
    image_url: &str,
    caption: &str,
) -> Result<()> {
    match reqwest::Url::parse(image_url) {
        Ok(url) => {
            let sent = bot
                .send_photo(msg.chat.id, InputFile::url(url))
                .caption(caption.to_string())
                .parse_mode(ParseMode::Markdown)
                .await;
            if let Err(e) = sent {
                warn!(user_id, error = %e, "Photo send failed, sending caption as text");
                bot.send_message(msg.chat.id, format!("Card ready!\n\n{caption}"))
                    .parse_mode(ParseMode::Markdown)
                    .await?;
            }
        }
        Err(e) => {
            warn!(user_id, error = %e, "Generated image URL is invalid, sending caption as text");
            bot.send_message(msg.chat.id, format!("Card ready!\n\n{caption}"))
                .parse_mode(ParseMode::Markdown)
                .await?;
        }
    }
    Ok(())
}
