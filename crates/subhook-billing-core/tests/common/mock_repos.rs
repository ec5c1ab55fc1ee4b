//! In-memory repositories and provider for testing

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use std::sync::Arc;
use uuid::Uuid;

use subhook_billing_core::stripe::{StripeList, StripePrice, StripeSubscriptionItem};
use subhook_billing_core::{BillingError, Expandable, PaymentProvider, StripeSubscription};
use subhook_db::{
    DbResult, SubscriptionRepository, SubscriptionRow, UpsertSubscription, UserRepository, UserRow,
};

/// In-memory user repository keyed by Stripe customer ID
#[derive(Default, Clone)]
pub struct MockUserRepository {
    by_customer: Arc<DashMap<String, UserRow>>,
}

impl MockUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a user linked to `customer_id` and return its ID
    pub fn insert_customer(&self, customer_id: &str) -> Uuid {
        let id = Uuid::new_v4();
        self.by_customer.insert(
            customer_id.to_string(),
            UserRow {
                id,
                email: format!("{customer_id}@example.com"),
                stripe_customer_id: Some(customer_id.to_string()),
                created_at: Utc::now(),
                updated_at: Utc::now(),
            },
        );
        id
    }
}

#[async_trait]
impl UserRepository for MockUserRepository {
    async fn find_by_stripe_customer_id(&self, customer_id: &str) -> DbResult<Option<UserRow>> {
        Ok(self.by_customer.get(customer_id).map(|r| r.value().clone()))
    }
}

/// In-memory subscription repository
#[derive(Default, Clone)]
pub struct MockSubscriptionRepository {
    rows: Arc<DashMap<String, SubscriptionRow>>,
}

impl MockSubscriptionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &str) -> Option<SubscriptionRow> {
        self.rows.get(id).map(|r| r.value().clone())
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    fn row(sub: UpsertSubscription) -> SubscriptionRow {
        SubscriptionRow {
            id: sub.id,
            user_id: sub.user_id,
            status: sub.status,
            price_id: sub.price_id,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }
}

#[async_trait]
impl SubscriptionRepository for MockSubscriptionRepository {
    async fn insert_if_absent(&self, sub: UpsertSubscription) -> DbResult<bool> {
        if self.rows.contains_key(&sub.id) {
            return Ok(false);
        }
        self.rows.insert(sub.id.clone(), Self::row(sub));
        Ok(true)
    }

    async fn upsert(&self, sub: UpsertSubscription) -> DbResult<SubscriptionRow> {
        let row = Self::row(sub);
        self.rows.insert(row.id.clone(), row.clone());
        Ok(row)
    }

    async fn ping(&self) -> DbResult<()> {
        Ok(())
    }
}

/// Provider returning canned subscriptions
#[derive(Default, Clone)]
pub struct MockProvider {
    subscriptions: Arc<DashMap<String, StripeSubscription>>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, id: &str, customer: &str, status: &str, price: &str) {
        self.subscriptions.insert(
            id.to_string(),
            StripeSubscription {
                id: id.to_string(),
                customer: Expandable::Id(customer.to_string()),
                status: status.to_string(),
                items: Some(StripeList {
                    data: vec![StripeSubscriptionItem {
                        id: format!("si_{id}"),
                        price: StripePrice {
                            id: price.to_string(),
                        },
                    }],
                    has_more: false,
                }),
            },
        );
    }
}

#[async_trait]
impl PaymentProvider for MockProvider {
    async fn retrieve_subscription(
        &self,
        subscription_id: &str,
    ) -> Result<StripeSubscription, BillingError> {
        self.subscriptions
            .get(subscription_id)
            .map(|r| r.value().clone())
            .ok_or_else(|| BillingError::ProviderError("Stripe API error: 404 Not Found".into()))
    }
}
