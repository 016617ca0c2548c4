//! Lead/CRM adapter. Fire and forget: a failed lead must never block or
//! surface in the user-facing reply.

use chrono::Utc;
use serde_json::json;
use tracing::{debug, error, info};

pub struct LeadRecorder {
    http: reqwest::Client,
    webhook_url: Option<String>,
}

impl LeadRecorder {
    pub fn new(http: reqwest::Client, webhook_url: Option<String>) -> Self {
        Self { http, webhook_url }
    }

    pub fn is_configured(&self) -> bool {
        self.webhook_url.is_some()
    }

    /// Record a lead for the given user and interest tag. Failures are
    /// logged and swallowed.
    pub async fn record_lead(&self, user_id: u64, username: &str, interest: &str) {
        let Some(webhook) = &self.webhook_url else {
            debug!(user_id, "CRM webhook not configured, skipping lead");
            return;
        };

        let payload = json!({
            "fields": {
                "TITLE": format!("Telegram lead: {username}"),
                "SOURCE_ID": "TELEGRAM",
                "STATUS_ID": "NEW",
                "COMMENTS": format!(
                    "User ID: {user_id}\nInterest: {interest}\nDate: {}",
                    Utc::now().to_rfc3339()
                ),
                "UF_CRM_TELEGRAM_ID": user_id.to_string(),
                "UF_CRM_SERVICE_TYPE": interest
            }
        });

        match self
            .http
            .post(format!("{webhook}/crm.lead.add.json"))
            .json(&payload)
            .send()
            .await
        {
            Ok(response) if response.status().is_success() => {
                info!(user_id, interest, "Lead recorded");
            }
            Ok(response) => {
                error!(user_id, status = %response.status(), "CRM rejected the lead");
            }
            Err(e) => {
                error!(user_id, error = %e, "CRM lead request failed");
            }
        }
    }
}
