//! Webhook service

use std::sync::Arc;

use tracing::{debug, info, instrument};

use crate::store::SubscriptionStore;
use crate::webhook::{SignatureError, SubscriptionUpdate, WebhookEvent, WebhookHandler};
use crate::{BillingConfig, BillingError};

/// What dispatch did with a verified event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Event type is not subscription-relevant
    Ignored,
    /// Subscription write went through
    Saved(SubscriptionUpdate),
}

/// Verifies incoming webhooks and applies them to the subscription store
pub struct WebhookService {
    verifier: WebhookHandler,
    store: Arc<dyn SubscriptionStore>,
}

impl WebhookService {
    /// Create a new webhook service
    pub fn new(verifier: WebhookHandler, store: Arc<dyn SubscriptionStore>) -> Self {
        Self { verifier, store }
    }

    /// Create a webhook service from billing configuration
    pub fn from_config(config: &BillingConfig, store: Arc<dyn SubscriptionStore>) -> Self {
        let verifier = WebhookHandler::new(&config.stripe_webhook_secret)
            .with_tolerance(config.webhook_tolerance);
        Self::new(verifier, store)
    }

    /// Verify the signature over the raw body and decode the event
    pub fn verify(&self, payload: &[u8], signature: &str) -> Result<WebhookEvent, SignatureError> {
        self.verifier.verify_and_parse(payload, signature)
    }

    /// Apply a verified event
    ///
    /// Irrelevant event types succeed without touching the store.
    #[instrument(skip(self, event), fields(event_id = %event.id, event_type = %event.event_type))]
    pub async fn dispatch(&self, event: &WebhookEvent) -> Result<DispatchOutcome, BillingError> {
        if !event.event_type.is_relevant() {
            debug!("Ignoring webhook event");
            return Ok(DispatchOutcome::Ignored);
        }

        let update = event.data()?.subscription_update()?;
        self.store
            .save_subscription(
                &update.subscription_id,
                &update.customer_id,
                update.created_action,
            )
            .await?;

        info!(
            subscription_id = %update.subscription_id,
            customer_id = %update.customer_id,
            created_action = update.created_action,
            "Subscription saved"
        );

        Ok(DispatchOutcome::Saved(update))
    }

    /// Check the subscription store is reachable
    pub async fn ping(&self) -> Result<(), BillingError> {
        self.store.ping().await
    }
}
