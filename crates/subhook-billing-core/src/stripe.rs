//! Stripe payment provider implementation

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, instrument};

use crate::config::BillingConfig;
use crate::error::BillingError;
use crate::provider::PaymentProvider;

/// Stripe payment provider
#[derive(Clone)]
pub struct StripeProvider {
    client: Client,
    secret_key: String,
    api_base: String,
}

impl StripeProvider {
    /// Create a new Stripe provider
    pub fn new(config: &BillingConfig) -> Self {
        Self {
            client: Client::new(),
            secret_key: config.stripe_secret_key.clone(),
            api_base: config.stripe_api_base.trim_end_matches('/').to_string(),
        }
    }

    /// Make authenticated GET request to Stripe
    async fn stripe_get<T: for<'de> Deserialize<'de>>(
        &self,
        endpoint: &str,
    ) -> Result<T, BillingError> {
        let url = format!("{}{endpoint}", self.api_base);

        let response = self
            .client
            .get(&url)
            .basic_auth(&self.secret_key, Option::<&str>::None)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "Stripe API request failed");
                BillingError::ProviderError(e.to_string())
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %error_body, "Stripe API error");
            return Err(BillingError::ProviderError(format!(
                "Stripe API error: {status}"
            )));
        }

        response.json::<T>().await.map_err(|e| {
            error!(error = %e, "Failed to parse Stripe response");
            BillingError::ProviderError(e.to_string())
        })
    }
}

#[async_trait]
impl PaymentProvider for StripeProvider {
    #[instrument(skip(self))]
    async fn retrieve_subscription(
        &self,
        subscription_id: &str,
    ) -> Result<StripeSubscription, BillingError> {
        debug!(subscription_id = %subscription_id, "Retrieving Stripe subscription");

        self.stripe_get(&format!("/subscriptions/{subscription_id}"))
            .await
    }
}

// Stripe API object types

/// A reference that Stripe returns either as a bare ID or, when expanded,
/// as the full object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Expandable {
    /// Unexpanded object ID
    Id(String),
    /// Expanded object; only its ID is kept
    Object {
        /// Object ID
        id: String,
    },
}

impl Expandable {
    /// The referenced object's ID
    pub fn id(&self) -> &str {
        match self {
            Self::Id(id) | Self::Object { id } => id,
        }
    }
}

/// Stripe subscription
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StripeSubscription {
    /// Subscription ID
    pub id: String,
    /// Customer
    pub customer: Expandable,
    /// Subscription status
    pub status: String,
    /// Subscription items
    #[serde(default)]
    pub items: Option<StripeList<StripeSubscriptionItem>>,
}

impl StripeSubscription {
    /// Price ID of the first subscription item
    pub fn price_id(&self) -> Option<&str> {
        self.items
            .as_ref()
            .and_then(|items| items.data.first())
            .map(|item| item.price.id.as_str())
    }
}

/// Stripe subscription item
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StripeSubscriptionItem {
    /// Item ID
    pub id: String,
    /// Price the item bills
    pub price: StripePrice,
}

/// Stripe price
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StripePrice {
    /// Price ID
    pub id: String,
}

/// Stripe list response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StripeList<T> {
    /// List data
    pub data: Vec<T>,
    /// Whether there are more items
    #[serde(default)]
    pub has_more: bool,
}
