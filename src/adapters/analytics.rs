//! Analytics adapter. Fire and forget with a hard per-call timeout so a slow
//! analytics endpoint can never stall a reply.

use chrono::Utc;
use std::time::Duration;
use tracing::{debug, warn};

pub const ANALYTICS_ENDPOINT: &str = "https://mc.yandex.ru/metrika/tag.js";
const ANALYTICS_TIMEOUT: Duration = Duration::from_secs(5);

pub struct EventTracker {
    http: reqwest::Client,
    counter_id: Option<String>,
    endpoint: String,
}

impl EventTracker {
    pub fn new(http: reqwest::Client, counter_id: Option<String>) -> Self {
        Self {
            http,
            counter_id,
            endpoint: ANALYTICS_ENDPOINT.to_string(),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.counter_id.is_some()
    }

    /// Send one event. Failures and timeouts are logged and swallowed.
    pub async fn track(&self, user_id: u64, event: &str, params: Option<serde_json::Value>) {
        let Some(counter) = &self.counter_id else {
            debug!(user_id, event, "Analytics counter not configured, skipping event");
            return;
        };

        let mut query: Vec<(String, String)> = vec![
            ("counter".to_string(), counter.clone()),
            ("event".to_string(), event.to_string()),
            ("user_id".to_string(), user_id.to_string()),
            ("timestamp".to_string(), Utc::now().timestamp().to_string()),
        ];
        if let Some(serde_json::Value::Object(extra)) = params {
            for (key, value) in extra {
                let value = value
                    .as_str()
                    .map(str::to_string)
                    .unwrap_or_else(|| value.to_string());
                query.push((key, value));
            }
        }

        match self
            .http
            .get(&self.endpoint)
            .query(&query)
            .timeout(ANALYTICS_TIMEOUT)
            .send()
            .await
        {
            Ok(response) if response.status().is_success() => {
                debug!(user_id, event, "Event tracked");
            }
            Ok(response) => {
                warn!(user_id, event, status = %response.status(), "Analytics endpoint rejected event");
            }
            Err(e) => {
                warn!(user_id, event, error = %e, "Analytics request failed");
            }
        }
    }
}
