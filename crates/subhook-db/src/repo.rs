//! Repository traits
//!
//! Define async repository interfaces for database operations.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::DbResult;
use crate::models::*;

/// User repository trait
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find a user by Stripe customer ID
    async fn find_by_stripe_customer_id(&self, customer_id: &str) -> DbResult<Option<UserRow>>;
}

/// Subscription write input
#[derive(Debug, Clone)]
pub struct UpsertSubscription {
    /// Stripe subscription ID
    pub id: String,
    pub user_id: Uuid,
    pub status: String,
    pub price_id: Option<String>,
}

/// Subscription repository trait
#[async_trait]
pub trait SubscriptionRepository: Send + Sync {
    /// Insert a subscription unless one with the same ID already exists.
    ///
    /// Returns `false` when the row was already present.
    async fn insert_if_absent(&self, sub: UpsertSubscription) -> DbResult<bool>;

    /// Insert a subscription or replace the mutable fields of an existing one
    async fn upsert(&self, sub: UpsertSubscription) -> DbResult<SubscriptionRow>;

    /// Check that the backing store is reachable
    async fn ping(&self) -> DbResult<()>;
}
