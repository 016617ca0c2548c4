//! Shared bot state: every dependency the handlers need, constructed once at
//! startup and injected through the dispatcher. No ambient globals.

use std::sync::Arc;

use crate::adapters::generation::CardGenerator;
use crate::adapters::payment::PaymentProvider;
use crate::config::Config;
use crate::notify::Notifier;
use crate::session::SessionStore;

pub struct BotState {
    pub config: Config,
    pub sessions: Arc<dyn SessionStore>,
    pub generator: CardGenerator,
    pub payments: PaymentProvider,
    pub notifier: Notifier,
}
