//! Best-effort side-effect queue for lead capture and event tracking.
//!
//! Handlers enqueue jobs without awaiting them; a single worker task drains
//! the queue and performs the outbound calls one at a time. When the bounded
//! queue is full the job is dropped with a warning — losing a lead or an
//! analytics event must never delay the primary reply.

use tokio::sync::mpsc;
use tracing::warn;

use crate::adapters::analytics::EventTracker;
use crate::adapters::crm::LeadRecorder;

const QUEUE_CAPACITY: usize = 64;

#[derive(Debug)]
enum SideEffect {
    Lead {
        user_id: u64,
        username: String,
        interest: String,
    },
    Track {
        user_id: u64,
        event: String,
        params: Option<serde_json::Value>,
    },
}

#[derive(Clone)]
pub struct Notifier {
    tx: mpsc::Sender<SideEffect>,
}

impl Notifier {
    /// Spawn the drain task and return the handle handlers use to enqueue.
    pub fn spawn(leads: LeadRecorder, tracker: EventTracker) -> Self {
        let (tx, mut rx) = mpsc::channel(QUEUE_CAPACITY);
        tokio::spawn(async move {
            while let Some(job) = rx.recv().await {
                match job {
                    SideEffect::Lead {
                        user_id,
                        username,
                        interest,
                    } => leads.record_lead(user_id, &username, &interest).await,
                    SideEffect::Track {
                        user_id,
                        event,
                        params,
                    } => tracker.track(user_id, &event, params).await,
                }
            }
        });
        Self { tx }
    }

    pub fn lead(&self, user_id: u64, username: &str, interest: &str) {
        self.push(SideEffect::Lead {
            user_id,
            username: username.to_string(),
            interest: interest.to_string(),
        });
    }

    pub fn track(&self, user_id: u64, event: &str) {
        self.push(SideEffect::Track {
            user_id,
            event: event.to_string(),
            params: None,
        });
    }

    pub fn track_with(&self, user_id: u64, event: &str, params: serde_json::Value) {
        self.push(SideEffect::Track {
            user_id,
            event: event.to_string(),
            params: Some(params),
        });
    }

    fn push(&self, job: SideEffect) {
        if let Err(e) = self.tx.try_send(job) {
            warn!(error = %e, "Side-effect queue full, dropping job");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unconfigured_notifier() -> Notifier {
        let http = reqwest::Client::new();
        Notifier::spawn(
            LeadRecorder::new(http.clone(), None),
            EventTracker::new(http, None),
        )
    }

    #[tokio::test]
    async fn test_enqueue_never_blocks_or_panics() {
        let notifier = unconfigured_notifier();
        // Well past the queue capacity; overflow must drop, not block.
        for i in 0..500 {
            notifier.lead(i, "user", "start");
            notifier.track(i, "text_input");
            notifier.track_with(i, "text_input", serde_json::json!({"text_length": 10}));
        }
    }
}
