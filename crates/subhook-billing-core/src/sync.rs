//! Subscription sync
//!
//! Default [`SubscriptionStore`]: resolves the user behind a Stripe customer,
//! fetches the subscription's current state from Stripe and writes it to
//! Postgres.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, instrument, warn};

use subhook_db::{Repositories, SubscriptionRepository, UpsertSubscription, UserRepository};

use crate::provider::PaymentProvider;
use crate::store::SubscriptionStore;
use crate::BillingError;

/// Syncs Stripe subscriptions into the local database
pub struct SubscriptionSync {
    provider: Arc<dyn PaymentProvider>,
    users: Arc<dyn UserRepository>,
    subscriptions: Arc<dyn SubscriptionRepository>,
}

impl SubscriptionSync {
    /// Create a new subscription sync
    pub fn new(
        provider: Arc<dyn PaymentProvider>,
        users: Arc<dyn UserRepository>,
        subscriptions: Arc<dyn SubscriptionRepository>,
    ) -> Self {
        Self {
            provider,
            users,
            subscriptions,
        }
    }

    /// Create a subscription sync backed by the Postgres repositories
    pub fn from_repositories(provider: Arc<dyn PaymentProvider>, repos: Repositories) -> Self {
        Self::new(
            provider,
            Arc::new(repos.users),
            Arc::new(repos.subscriptions),
        )
    }
}

#[async_trait]
impl SubscriptionStore for SubscriptionSync {
    #[instrument(skip(self))]
    async fn save_subscription(
        &self,
        subscription_id: &str,
        customer_id: &str,
        created_action: bool,
    ) -> Result<(), BillingError> {
        let user = self
            .users
            .find_by_stripe_customer_id(customer_id)
            .await?
            .ok_or_else(|| {
                warn!(customer_id = %customer_id, "No user linked to Stripe customer");
                BillingError::CustomerNotFound(customer_id.to_string())
            })?;

        let remote = self.provider.retrieve_subscription(subscription_id).await?;

        let record = UpsertSubscription {
            id: remote.id.clone(),
            user_id: user.id,
            status: remote.status.clone(),
            price_id: remote.price_id().map(str::to_string),
        };

        if created_action {
            let inserted = self.subscriptions.insert_if_absent(record).await?;
            if inserted {
                info!(subscription_id = %remote.id, user_id = %user.id, "Subscription created");
            } else {
                info!(subscription_id = %remote.id, "Subscription already registered");
            }
        } else {
            let row = self.subscriptions.upsert(record).await?;
            info!(subscription_id = %row.id, status = %row.status, "Subscription updated");
        }

        Ok(())
    }

    async fn ping(&self) -> Result<(), BillingError> {
        self.subscriptions.ping().await?;
        Ok(())
    }
}
