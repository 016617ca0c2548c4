//! # Cardsmith Telegram Bot
//!
//! A Telegram bot that turns a product description into a marketplace-ready
//! product card via a generative text service, with free-tier quotas and
//! paid subscription plans sold through a payment gateway.

pub mod adapters;
pub mod bot;
pub mod card;
pub mod config;
pub mod dialogue;
pub mod notify;
pub mod plans;
pub mod session;
pub mod state;
