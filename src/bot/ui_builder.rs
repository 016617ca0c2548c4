//! UI Builder module for creating keyboards and message copy

use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};

use crate::plans::{plan_info, Plan, CATALOG};

pub const SUPPORT_URL: &str = "https://t.me/cardsmith_support";
pub const SUPPORT_HANDLE: &str = "@cardsmith_support";

/// Format a RUB amount with thousands separators, e.g. 4990 -> "4,990".
pub fn format_price(amount_rub: u32) -> String {
    let digits = amount_rub.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

fn upgrade_button(plan: Plan) -> InlineKeyboardButton {
    let info = plan_info(plan);
    let price = format_price(info.monthly_price_rub.unwrap_or(0));
    InlineKeyboardButton::callback(
        format!("💎 Upgrade to {} ({price}₽)", info.display_name),
        format!("upgrade_{}", plan.slug()),
    )
}

fn select_button(plan: Plan) -> InlineKeyboardButton {
    let info = plan_info(plan);
    let label = match info.monthly_price_rub {
        Some(price) if price > 0 => format!("{} ({}₽)", info.display_name, format_price(price)),
        _ => info.display_name.to_string(),
    };
    InlineKeyboardButton::callback(label, format!("select_{}", plan.slug()))
}

fn all_plans_button() -> InlineKeyboardButton {
    InlineKeyboardButton::callback("📋 All plans", "choose_plan")
}

pub fn welcome_text(first_name: &str) -> String {
    format!(
        "Welcome to Cardsmith, {first_name}! 🚀\n\n\
         🎯 *Create, automate, sell*\n\n\
         A platform for selling product cards on marketplaces:\n\
         • 🎨 AI card builder\n\
         • 🤖 Automatic copy generation\n\
         • 📊 A/B testing\n\
         • 📈 Performance analytics\n\n\
         Start with the free plan or pick one that fits!"
    )
}

pub fn main_menu_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![
            InlineKeyboardButton::callback("🆓 Try for free", "free_demo"),
            InlineKeyboardButton::callback("💎 Choose a plan", "choose_plan"),
        ],
        vec![
            InlineKeyboardButton::callback("ℹ️ About", "about"),
            InlineKeyboardButton::callback("💡 How it works", "how_it_works"),
        ],
    ])
}

pub fn demo_text(quota: u32) -> String {
    format!(
        "🎯 *Cardsmith demo mode*\n\n\
         Try card generation for free!\n\n\
         The demo includes:\n\
         • Up to {quota} demo cards\n\
         • AI-generated copy\n\
         • Basic templates\n\
         • Watermarked cards\n\n\
         Activate the free plan to begin:"
    )
}

pub fn activation_prompt_text(quota: u32) -> String {
    format!(
        "👋 Hi! Looks like you want to create a product card.\n\n\
         Activate the free plan or pick a paid one to get started.\n\
         🎁 The free plan includes {quota} demo cards!"
    )
}

pub fn activation_prompt_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![InlineKeyboardButton::callback(
            "🆓 Activate the free plan",
            "free_demo",
        )],
        vec![InlineKeyboardButton::callback(
            "💎 Choose a plan",
            "choose_plan",
        )],
    ])
}

pub fn free_activated_text(quota: u32) -> String {
    format!(
        "🆓 *Free plan activated!*\n\n\
         ✅ *What you get:*\n\
         • Up to {quota} demo cards\n\
         • Basic card templates\n\
         • Limited AI generation\n\
         • Watermarked demo cards\n\n\
         🚀 *Try it right now:*\n\
         Send me your product description and I will build a demo card!"
    )
}

pub fn free_activated_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![upgrade_button(Plan::Basic)],
        vec![upgrade_button(Plan::Pro)],
        vec![all_plans_button()],
    ])
}

/// Render the static plan catalog as the pricing message.
pub fn plan_menu_text() -> String {
    let mut text = String::from("💎 *Cardsmith plans*\n\n");
    for info in &CATALOG {
        let price = match info.monthly_price_rub {
            Some(price) => format!("{} ₽/mo", format_price(price)),
            None => "custom pricing".to_string(),
        };
        text.push_str(&format!("*{}* — {price}\n", info.display_name));
        for feature in info.features {
            text.push_str(&format!("• {feature}\n"));
        }
        text.push('\n');
    }
    text.push_str("Pick the plan that fits:");
    text
}

pub fn plan_menu_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(
        CATALOG
            .iter()
            .map(|info| vec![select_button(info.plan)])
            .collect::<Vec<_>>(),
    )
}

pub fn quota_exhausted_text() -> String {
    "🚫 *Demo card limit reached*\n\n\
     You have created the maximum number of free cards.\n\
     To continue, pick a plan that fits:"
        .to_string()
}

pub fn quota_exhausted_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![select_button(Plan::Basic)],
        vec![select_button(Plan::Pro)],
        vec![all_plans_button()],
    ])
}

pub fn progress_text(plan: Plan, activations_left: u32) -> String {
    let remaining = match plan {
        Plan::Free => activations_left.to_string(),
        _ => "∞".to_string(),
    };
    format!(
        "🧠 Generating your product card...\n\
         📊 Plan: {}\n\
         🎫 Demo cards left: {remaining}\n\
         ⏳ Please wait 15-20 seconds.",
        plan_info(plan).display_name
    )
}

pub fn payment_text(plan: Plan) -> String {
    let info = plan_info(plan);
    let price = format_price(info.monthly_price_rub.unwrap_or(0));
    let mut text = format!(
        "💎 *{} plan*\n\nPrice: {price} ₽/month\n\nAfter payment you get:\n",
        info.display_name
    );
    for feature in info.features {
        text.push_str(&format!("• {feature}\n"));
    }
    text
}

pub fn payment_keyboard(payment_url: &str) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![InlineKeyboardButton::url(
            "💳 Pay",
            payment_url.parse().unwrap_or_else(|_| {
                "https://cardsmith.app/payment-error?code=bad_url"
                    .parse()
                    .expect("static fallback URL is valid")
            }),
        )],
        vec![all_plans_button()],
    ])
}

pub fn enterprise_contact_text() -> String {
    format!(
        "🏢 *Enterprise plan*\n\n\
         To receive a personal offer:\n\n\
         📧 Email: enterprise@cardsmith.app\n\
         💬 Telegram: {SUPPORT_HANDLE}\n\n\
         Our manager will get back to you within 24 hours."
    )
}

pub fn enterprise_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![InlineKeyboardButton::url(
            "💬 Message support",
            SUPPORT_URL.parse().expect("static support URL is valid"),
        )],
        vec![all_plans_button()],
    ])
}

pub fn free_followup_text(remaining: u32) -> String {
    format!(
        "✨ *Like the card?*\n\n\
         🎯 With a paid plan you get:\n\
         • Cards without watermarks\n\
         • Unlimited generations\n\
         • Extended templates\n\
         • A/B testing\n\n\
         Demo cards left: {remaining}"
    )
}

pub fn free_followup_keyboard(remaining: u32) -> InlineKeyboardMarkup {
    let mut rows = vec![
        vec![upgrade_button(Plan::Basic)],
        vec![upgrade_button(Plan::Pro)],
    ];
    if remaining > 0 {
        rows.push(vec![InlineKeyboardButton::callback(
            format!("🔄 Create another ({remaining} left)"),
            "create_another",
        )]);
    }
    rows.push(vec![all_plans_button()]);
    InlineKeyboardMarkup::new(rows)
}

pub fn paid_followup_text() -> String {
    "✅ Premium card ready! What next?".to_string()
}

pub fn paid_followup_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![InlineKeyboardButton::callback(
            "🔄 Create another",
            "create_another",
        )],
        vec![InlineKeyboardButton::callback(
            "📊 Analytics",
            "view_analytics",
        )],
    ])
}

pub fn about_text() -> String {
    format!(
        "ℹ️ *About Cardsmith*\n\n\
         We are an AI service for marketplace sellers: product cards, copy, \
         analytics and chat automation, generated for you.\n\
         More: https://cardsmith.app\n\
         Contact us: {SUPPORT_HANDLE}"
    )
}

pub fn how_it_works_text() -> String {
    "💡 *How it works*\n\n\
     1. Activate a plan (the free one works right away)\n\
     2. Send me a short description of your product\n\
     3. The AI writes the title, description and key benefits\n\
     4. You get a ready card with an image, formatted for the marketplace\n\n\
     Send /demo to try it for free."
        .to_string()
}

pub fn analytics_text() -> String {
    "📊 *Analytics*\n\n\
     Card performance analytics is available in the web dashboard:\n\
     https://cardsmith.app/dashboard"
        .to_string()
}

pub fn invalid_description_text() -> String {
    "📏 Please send a product description between 1 and 2000 characters.".to_string()
}

pub fn create_another_text() -> String {
    "🔄 Send me the next product description and I will build a card for it.".to_string()
}

pub fn unknown_command_text() -> String {
    "❌ Unknown command. Please start over with /start".to_string()
}

pub fn failure_text() -> String {
    format!(
        "😓 Something went wrong on our side. Please try again later or message support {SUPPORT_HANDLE}"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(markup: &InlineKeyboardMarkup) -> Vec<String> {
        markup
            .inline_keyboard
            .iter()
            .flatten()
            .filter_map(|button| match &button.kind {
                teloxide::types::InlineKeyboardButtonKind::CallbackData(data) => Some(data.clone()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_format_price() {
        assert_eq!(format_price(0), "0");
        assert_eq!(format_price(990), "990");
        assert_eq!(format_price(4990), "4,990");
        assert_eq!(format_price(1234567), "1,234,567");
    }

    #[test]
    fn test_main_menu_has_configured_top_level_buttons() {
        let markup = main_menu_keyboard();
        assert_eq!(
            tokens(&markup),
            vec!["free_demo", "choose_plan", "about", "how_it_works"]
        );
    }

    #[test]
    fn test_plan_menu_lists_every_plan() {
        let markup = plan_menu_keyboard();
        assert_eq!(
            tokens(&markup),
            vec!["select_free", "select_basic", "select_pro", "select_enterprise"]
        );
        let text = plan_menu_text();
        assert!(text.contains("Free"));
        assert!(text.contains("990 ₽/mo"));
        assert!(text.contains("4,990 ₽/mo"));
        assert!(text.contains("custom pricing"));
    }

    #[test]
    fn test_free_followup_hides_create_another_when_exhausted() {
        assert!(!tokens(&free_followup_keyboard(0)).contains(&"create_another".to_string()));
        assert!(tokens(&free_followup_keyboard(3)).contains(&"create_another".to_string()));
    }

    #[test]
    fn test_quota_exhausted_keyboard_offers_paid_plans_only() {
        let toks = tokens(&quota_exhausted_keyboard());
        assert_eq!(toks, vec!["select_basic", "select_pro", "choose_plan"]);
    }

    #[test]
    fn test_progress_text_shows_infinity_for_paid_plans() {
        assert!(progress_text(Plan::Pro, 0).contains('∞'));
        assert!(progress_text(Plan::Free, 3).contains('3'));
    }
}
