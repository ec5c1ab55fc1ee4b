//! Payment provider abstraction

use async_trait::async_trait;

use crate::stripe::StripeSubscription;
use crate::BillingError;

/// Payment provider trait
///
/// Abstracts the provider lookups subscription sync relies on.
#[async_trait]
pub trait PaymentProvider: Send + Sync {
    /// Fetch the current state of a subscription
    async fn retrieve_subscription(
        &self,
        subscription_id: &str,
    ) -> Result<StripeSubscription, BillingError>;
}
