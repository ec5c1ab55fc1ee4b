//! Subscription persistence seam

use async_trait::async_trait;

use crate::BillingError;

/// Persists the subscription changes announced by webhook events
///
/// Implementations must tolerate the same call arriving more than once;
/// Stripe redelivers any event that did not get a 2xx response.
#[async_trait]
pub trait SubscriptionStore: Send + Sync {
    /// Create (`created_action = true`) or modify a subscription record
    async fn save_subscription(
        &self,
        subscription_id: &str,
        customer_id: &str,
        created_action: bool,
    ) -> Result<(), BillingError>;

    /// Check the store is reachable
    async fn ping(&self) -> Result<(), BillingError> {
        Ok(())
    }
}
