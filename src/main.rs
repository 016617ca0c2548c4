use std::sync::Arc;

use anyhow::Result;
use teloxide::dispatching::dialogue::InMemStorage;
use teloxide::prelude::*;
use tracing::info;

use cardsmith::adapters::analytics::EventTracker;
use cardsmith::adapters::crm::LeadRecorder;
use cardsmith::adapters::generation::CardGenerator;
use cardsmith::adapters::payment::PaymentProvider;
use cardsmith::bot;
use cardsmith::config::Config;
use cardsmith::dialogue::ChatState;
use cardsmith::notify::Notifier;
use cardsmith::session::RedisSessionStore;
use cardsmith::state::BotState;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("Starting Cardsmith Telegram bot");

    let config = Config::from_env()?;

    let sessions = RedisSessionStore::connect(&config.redis_url)?;
    info!(redis_url = %config.redis_url, "Using Redis session store");

    let http = reqwest::Client::new();

    let generator = CardGenerator::new(
        http.clone(),
        config.generation_api_key.clone(),
        config.generation_folder_id.clone(),
    );
    let payments = PaymentProvider::new(
        http.clone(),
        config.payment_shop_id.clone(),
        config.payment_secret_key.clone(),
        config.site_url.clone(),
    );
    let leads = LeadRecorder::new(http.clone(), config.crm_webhook_url.clone());
    let tracker = EventTracker::new(http, config.analytics_counter_id.clone());
    let notifier = Notifier::spawn(leads, tracker);

    let bot = Bot::new(config.bot_token.clone());

    let state = Arc::new(BotState {
        config,
        sessions: Arc::new(sessions),
        generator,
        payments,
        notifier,
    });

    info!("Bot initialized, starting dispatcher");

    let handler = teloxide::dispatching::dialogue::enter::<
        Update,
        InMemStorage<ChatState>,
        ChatState,
        _,
    >()
    .branch(Update::filter_message().endpoint(bot::dispatch_message))
    .branch(Update::filter_callback_query().endpoint(bot::dispatch_callback));

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![InMemStorage::<ChatState>::new(), state])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    Ok(())
}
