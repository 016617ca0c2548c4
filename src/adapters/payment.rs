//! Payment adapter: creates a confirmation link at the gateway and mirrors a
//! pending-payment record into the session store.
//!
//! Missing credentials are a soft-disable: the caller gets the configured
//! placeholder URL and no outbound call is attempted. Gateway faults fall
//! back to an error URL; the user always gets something to click.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::json;
use tracing::{error, info, warn};
use uuid::Uuid;

use super::AdapterError;
use crate::plans::Plan;
use crate::session::{SessionStore, StoreError, SESSION_TTL};

pub const PAYMENT_ENDPOINT: &str = "https://api.yookassa.ru/v3/payments";

/// Record mirrored into the session store for 24h, keyed `payment:{uuid}`.
#[derive(Clone, Debug, Serialize)]
pub struct PendingPayment {
    pub payment_id: String,
    pub user_id: u64,
    pub plan: Plan,
    pub amount_rub: u32,
    pub status: &'static str,
    pub created: DateTime<Utc>,
    /// Payment id assigned by the gateway, when the call succeeded.
    pub provider_id: Option<String>,
}

impl PendingPayment {
    pub fn store_key(&self) -> String {
        format!("payment:{}", self.payment_id)
    }
}

/// Result of a link-creation attempt: always a URL, plus the pending record
/// when a real payment was created.
pub struct PaymentOutcome {
    pub url: String,
    pub record: Option<PendingPayment>,
}

pub struct PaymentProvider {
    http: reqwest::Client,
    credentials: Option<(String, String)>,
    endpoint: String,
    site_url: String,
}

impl PaymentProvider {
    pub fn new(
        http: reqwest::Client,
        shop_id: Option<String>,
        secret_key: Option<String>,
        site_url: String,
    ) -> Self {
        Self {
            http,
            credentials: shop_id.zip(secret_key),
            endpoint: PAYMENT_ENDPOINT.to_string(),
            site_url,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.credentials.is_some()
    }

    pub fn not_configured_url(&self) -> String {
        format!("{}/payment-not-configured", self.site_url)
    }

    fn error_url(&self, code: &str) -> String {
        format!("{}/payment-error?code={code}", self.site_url)
    }

    /// Create a payment link for a paid plan. Never fails: unconfigured and
    /// faulted calls both yield a fallback URL with no pending record.
    pub async fn create_payment_link(
        &self,
        user_id: u64,
        plan: Plan,
        amount_rub: u32,
    ) -> PaymentOutcome {
        let Some((shop_id, secret_key)) = &self.credentials else {
            warn!(user_id, plan = plan.slug(), "Payment gateway not configured, returning placeholder URL");
            return PaymentOutcome {
                url: self.not_configured_url(),
                record: None,
            };
        };

        let payment_id = Uuid::new_v4().to_string();
        let payload = json!({
            "amount": { "value": format!("{amount_rub}.00"), "currency": "RUB" },
            "confirmation": {
                "type": "redirect",
                "return_url": format!("{}/payment-success", self.site_url)
            },
            "capture": true,
            "description": format!("{} plan subscription (user {user_id})", plan.slug()),
            "metadata": {
                "user_id": user_id.to_string(),
                "plan": plan.slug(),
                "timestamp": Utc::now().to_rfc3339()
            }
        });

        info!(user_id, plan = plan.slug(), amount_rub, "Creating payment");

        let result = self
            .http
            .post(&self.endpoint)
            .header("Idempotence-Key", &payment_id)
            .basic_auth(shop_id, Some(secret_key))
            .json(&payload)
            .send()
            .await;

        match result {
            Ok(response) if response.status().is_success() => {
                match Self::confirmation_url(response).await {
                    Ok((url, provider_id)) => {
                        info!(user_id, provider_id = %provider_id, "Payment created");
                        PaymentOutcome {
                            url,
                            record: Some(PendingPayment {
                                payment_id,
                                user_id,
                                plan,
                                amount_rub,
                                status: "pending",
                                created: Utc::now(),
                                provider_id: Some(provider_id),
                            }),
                        }
                    }
                    Err(e) => {
                        error!(user_id, error = %e, "Unreadable payment gateway response");
                        PaymentOutcome {
                            url: self.error_url("decode"),
                            record: None,
                        }
                    }
                }
            }
            Ok(response) => {
                error!(user_id, status = %response.status(), "Payment gateway rejected the request");
                PaymentOutcome {
                    url: self.error_url(&response.status().as_u16().to_string()),
                    record: None,
                }
            }
            Err(e) => {
                error!(user_id, error = %e, "Payment gateway request failed");
                PaymentOutcome {
                    url: self.error_url("network"),
                    record: None,
                }
            }
        }
    }

    async fn confirmation_url(response: reqwest::Response) -> Result<(String, String), AdapterError> {
        let body: serde_json::Value = response.json().await?;
        let url = body["confirmation"]["confirmation_url"]
            .as_str()
            .ok_or(AdapterError::Shape("missing confirmation_url"))?
            .to_string();
        let provider_id = body["id"].as_str().unwrap_or_default().to_string();
        Ok((url, provider_id))
    }
}

/// Mirror a pending payment into the session store with the standard TTL.
pub async fn record_pending_payment(
    store: &dyn SessionStore,
    payment: &PendingPayment,
) -> Result<(), StoreError> {
    let raw = serde_json::to_string(payment)?;
    store.put(&payment.store_key(), raw, SESSION_TTL).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::InMemorySessionStore;

    fn unconfigured_provider() -> PaymentProvider {
        PaymentProvider::new(
            reqwest::Client::new(),
            None,
            None,
            "https://cardsmith.app".to_string(),
        )
    }

    #[test]
    fn test_partial_credentials_count_as_unconfigured() {
        let provider = PaymentProvider::new(
            reqwest::Client::new(),
            Some("shop".to_string()),
            None,
            "https://cardsmith.app".to_string(),
        );
        assert!(!provider.is_configured());
    }

    #[tokio::test]
    async fn test_unconfigured_gateway_returns_placeholder_without_calling_out() {
        let provider = unconfigured_provider();
        let outcome = provider.create_payment_link(42, Plan::Basic, 990).await;
        assert_eq!(outcome.url, "https://cardsmith.app/payment-not-configured");
        assert!(outcome.record.is_none());
    }

    #[tokio::test]
    async fn test_pending_payment_round_trip_into_store() {
        let store = InMemorySessionStore::new();
        let payment = PendingPayment {
            payment_id: "abc".to_string(),
            user_id: 42,
            plan: Plan::Pro,
            amount_rub: 4990,
            status: "pending",
            created: Utc::now(),
            provider_id: Some("yk-1".to_string()),
        };
        record_pending_payment(&store, &payment).await.unwrap();

        let raw = store.fetch("payment:abc").await.unwrap().unwrap();
        let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(json["plan"], "pro");
        assert_eq!(json["status"], "pending");
        assert_eq!(json["amount_rub"], 4990);
    }
}
