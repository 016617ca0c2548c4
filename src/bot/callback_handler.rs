//! Callback Handler module for processing inline keyboard callback queries

use anyhow::Result;
use std::sync::Arc;
use teloxide::prelude::*;
use teloxide::types::{InlineKeyboardMarkup, ParseMode};
use tracing::{debug, info, warn};

use crate::adapters::payment::record_pending_payment;
use crate::dialogue::{ChatDialogue, ChatState};
use crate::plans::{plan_info, Plan};
use crate::session::{save_session, UserSession};
use crate::state::BotState;

use super::ui_builder::{
    about_text, analytics_text, create_another_text, enterprise_contact_text, enterprise_keyboard,
    free_activated_keyboard, free_activated_text, how_it_works_text, payment_keyboard,
    payment_text, plan_menu_keyboard, plan_menu_text, unknown_command_text,
};

/// Closed set of dispatch actions a button token can map to. New tokens must
/// be added here, so nothing falls through unhandled at runtime.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CallbackAction {
    FreeDemo,
    ChoosePlan,
    SelectPlan(Plan),
    /// Alias family: dispatched exactly like `SelectPlan`.
    UpgradePlan(Plan),
    About,
    HowItWorks,
    ViewAnalytics,
    CreateAnother,
    Unknown,
}

impl CallbackAction {
    /// Parse a button token. Exact literals are checked before the
    /// `select_` / `upgrade_` prefix families.
    pub fn parse(token: &str) -> CallbackAction {
        match token {
            "free_demo" => Self::FreeDemo,
            "choose_plan" => Self::ChoosePlan,
            "about" => Self::About,
            "how_it_works" => Self::HowItWorks,
            "view_analytics" => Self::ViewAnalytics,
            "create_another" => Self::CreateAnother,
            _ => {
                if let Some(slug) = token.strip_prefix("select_") {
                    Plan::from_slug(slug)
                        .map(Self::SelectPlan)
                        .unwrap_or(Self::Unknown)
                } else if let Some(slug) = token.strip_prefix("upgrade_") {
                    Plan::from_slug(slug)
                        .map(Self::UpgradePlan)
                        .unwrap_or(Self::Unknown)
                } else {
                    Self::Unknown
                }
            }
        }
    }
}

/// Handle callback queries from inline keyboards
pub async fn callback_handler(
    bot: Bot,
    q: CallbackQuery,
    state: Arc<BotState>,
    dialogue: ChatDialogue,
) -> Result<()> {
    let user_id = q.from.id.0;
    let username = q
        .from
        .username
        .clone()
        .unwrap_or_else(|| "Unknown".to_string());
    let token = q.data.clone().unwrap_or_default();

    debug!(user_id, token = %token, "Received callback query");

    // Clear the button loading state before doing any slow work.
    bot.answer_callback_query(q.id.clone()).await?;

    match CallbackAction::parse(&token) {
        CallbackAction::FreeDemo => {
            activate_free_plan(&bot, &q, &state, &dialogue, user_id, &username).await?;
        }
        CallbackAction::ChoosePlan => {
            state.notifier.lead(user_id, &username, "view_pricing");
            state.notifier.track(user_id, "view_pricing_plans");
            respond(&bot, &q, plan_menu_text(), Some(plan_menu_keyboard())).await?;
        }
        CallbackAction::SelectPlan(plan) | CallbackAction::UpgradePlan(plan) => {
            state
                .notifier
                .lead(user_id, &username, &format!("select_plan_{}", plan.slug()));
            state
                .notifier
                .track(user_id, &format!("plan_selected_{}", plan.slug()));

            match plan {
                // Same routine as the free_demo token, not a re-dispatch.
                Plan::Free => {
                    activate_free_plan(&bot, &q, &state, &dialogue, user_id, &username).await?;
                }
                Plan::Enterprise => {
                    respond(&bot, &q, enterprise_contact_text(), Some(enterprise_keyboard()))
                        .await?;
                }
                plan => offer_payment(&bot, &q, &state, user_id, plan).await?,
            }
        }
        CallbackAction::About => {
            state.notifier.track(user_id, "about_viewed");
            respond(&bot, &q, about_text(), None).await?;
        }
        CallbackAction::HowItWorks => {
            state.notifier.track(user_id, "how_it_works_viewed");
            respond(&bot, &q, how_it_works_text(), None).await?;
        }
        CallbackAction::ViewAnalytics => {
            state.notifier.track(user_id, "analytics_viewed");
            respond(&bot, &q, analytics_text(), None).await?;
        }
        CallbackAction::CreateAnother => {
            state.notifier.track(user_id, "create_another");
            dialogue.update(ChatState::AwaitingDescription).await?;
            respond(&bot, &q, create_another_text(), None).await?;
        }
        CallbackAction::Unknown => {
            warn!(user_id, token = %token, "Unknown callback token");
            respond(&bot, &q, unknown_command_text(), None).await?;
        }
    }

    Ok(())
}

/// Create the free-tier session and confirm activation. Shared by the
/// `free_demo` token and `select_free` / `upgrade_free`.
async fn activate_free_plan(
    bot: &Bot,
    q: &CallbackQuery,
    state: &BotState,
    dialogue: &ChatDialogue,
    user_id: u64,
    username: &str,
) -> Result<()> {
    state.notifier.lead(user_id, username, "free_demo_activation");
    state.notifier.track(user_id, "free_demo_activated");

    let session = UserSession::fresh_free(state.config.free_quota);
    save_session(state.sessions.as_ref(), user_id, &session).await?;
    info!(user_id, quota = session.activations_left, "Free plan activated");

    // The next freeform message is a product description.
    dialogue.update(ChatState::AwaitingDescription).await?;

    respond(
        bot,
        q,
        free_activated_text(state.config.free_quota),
        Some(free_activated_keyboard()),
    )
    .await
}

/// Ask the gateway for a payment link and render the pay button. The
/// adapter never fails; a fallback URL still gets a button.
async fn offer_payment(
    bot: &Bot,
    q: &CallbackQuery,
    state: &BotState,
    user_id: u64,
    plan: Plan,
) -> Result<()> {
    let amount = plan_info(plan).monthly_price_rub.unwrap_or(0);
    let outcome = state.payments.create_payment_link(user_id, plan, amount).await;

    if let Some(record) = &outcome.record {
        if let Err(e) = record_pending_payment(state.sessions.as_ref(), record).await {
            warn!(user_id, error = %e, "Failed to store pending payment record");
        }
    }

    respond(bot, q, payment_text(plan), Some(payment_keyboard(&outcome.url))).await
}

/// Replace the previous message in place where possible, falling back to a
/// plain send when the original message is gone.
async fn respond(
    bot: &Bot,
    q: &CallbackQuery,
    text: String,
    keyboard: Option<InlineKeyboardMarkup>,
) -> Result<()> {
    if let Some(msg) = q.message.as_ref() {
        let mut request = bot
            .edit_message_text(msg.chat().id, msg.id(), text)
            .parse_mode(ParseMode::Markdown);
        if let Some(keyboard) = keyboard {
            request = request.reply_markup(keyboard);
        }
        request.await?;
    } else {
        let mut request = bot
            .send_message(ChatId(q.from.id.0 as i64), text)
            .parse_mode(ParseMode::Markdown);
        if let Some(keyboard) = keyboard {
            request = request.reply_markup(keyboard);
        }
        request.await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_tokens_parse() {
        assert_eq!(CallbackAction::parse("free_demo"), CallbackAction::FreeDemo);
        assert_eq!(CallbackAction::parse("choose_plan"), CallbackAction::ChoosePlan);
        assert_eq!(CallbackAction::parse("about"), CallbackAction::About);
        assert_eq!(CallbackAction::parse("how_it_works"), CallbackAction::HowItWorks);
        assert_eq!(CallbackAction::parse("view_analytics"), CallbackAction::ViewAnalytics);
        assert_eq!(CallbackAction::parse("create_another"), CallbackAction::CreateAnother);
    }

    #[test]
    fn test_plan_prefix_tokens_parse() {
        assert_eq!(
            CallbackAction::parse("select_free"),
            CallbackAction::SelectPlan(Plan::Free)
        );
        assert_eq!(
            CallbackAction::parse("select_basic"),
            CallbackAction::SelectPlan(Plan::Basic)
        );
        assert_eq!(
            CallbackAction::parse("select_enterprise"),
            CallbackAction::SelectPlan(Plan::Enterprise)
        );
        assert_eq!(
            CallbackAction::parse("upgrade_pro"),
            CallbackAction::UpgradePlan(Plan::Pro)
        );
    }

    #[test]
    fn test_unknown_tokens_never_panic() {
        for token in ["", "select_", "select_platinum", "upgrade_", "selec_free", "demo!"] {
            assert_eq!(CallbackAction::parse(token), CallbackAction::Unknown);
        }
    }
}
