//! Thin clients over the external HTTP integrations.
//!
//! One module per integration:
//! - `generation`: generative product-card service
//! - `payment`: payment gateway (confirmation-link creation)
//! - `crm`: lead capture, fire and forget
//! - `analytics`: event tracking, fire and forget
//!
//! Every adapter catches and neutralizes its own faults; nothing here is
//! allowed to propagate an error past the adapter boundary except as a safe
//! default value.

pub mod analytics;
pub mod crm;
pub mod generation;
pub mod payment;

use thiserror::Error;

/// Internal fault taxonomy for a single upstream call. Callers outside this
/// module only ever see the degraded result, not the error.
#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("upstream returned status {0}")]
    Status(reqwest::StatusCode),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unexpected response shape: {0}")]
    Shape(&'static str),
}
