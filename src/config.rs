//! Runtime configuration loaded once at startup and passed into handlers

use anyhow::{Context, Result};
use std::env;

/// Default number of free demo cards granted on activation
pub const DEFAULT_FREE_QUOTA: u32 = 5;

/// All runtime configuration for the bot.
///
/// Required variables make startup fail; optional ones soft-disable the
/// corresponding integration (the adapter behaves as if the upstream
/// returned a "not configured" placeholder).
#[derive(Clone, Debug)]
pub struct Config {
    pub bot_token: String,
    pub generation_api_key: String,
    pub generation_folder_id: Option<String>,
    pub crm_webhook_url: Option<String>,
    pub payment_shop_id: Option<String>,
    pub payment_secret_key: Option<String>,
    pub analytics_counter_id: Option<String>,
    pub redis_url: String,
    pub free_quota: u32,
    /// Base URL for payment redirect/fallback pages
    pub site_url: String,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        let bot_token =
            env::var("TELEGRAM_BOT_TOKEN").context("TELEGRAM_BOT_TOKEN must be set")?;
        let generation_api_key =
            env::var("GENERATION_API_KEY").context("GENERATION_API_KEY must be set")?;

        let free_quota = match env::var("FREE_QUOTA") {
            Ok(raw) => raw
                .parse::<u32>()
                .context("FREE_QUOTA must be a non-negative integer")?,
            Err(_) => DEFAULT_FREE_QUOTA,
        };

        Ok(Self {
            bot_token,
            generation_api_key,
            generation_folder_id: env::var("GENERATION_FOLDER_ID").ok(),
            crm_webhook_url: env::var("CRM_WEBHOOK_URL").ok(),
            payment_shop_id: env::var("PAYMENT_SHOP_ID").ok(),
            payment_secret_key: env::var("PAYMENT_SECRET_KEY").ok(),
            analytics_counter_id: env::var("ANALYTICS_COUNTER_ID").ok(),
            redis_url: env::var("REDIS_URL")
                .unwrap_or_else(|_| "redis://localhost:6379".to_string()),
            free_quota,
            site_url: env::var("SITE_URL")
                .unwrap_or_else(|_| "https://cardsmith.app".to_string()),
        })
    }
}
