//! Billing configuration

use std::fmt;
use std::time::Duration;

use crate::webhook::DEFAULT_TOLERANCE;

/// Default Stripe REST API base URL
pub const DEFAULT_STRIPE_API_BASE: &str = "https://api.stripe.com/v1";

/// Billing configuration
#[derive(Clone)]
pub struct BillingConfig {
    /// Stripe secret key
    pub stripe_secret_key: String,
    /// Stripe webhook signing secret
    pub stripe_webhook_secret: String,
    /// Stripe REST API base URL
    pub stripe_api_base: String,
    /// Maximum age of a signed webhook; `None` disables the check
    pub webhook_tolerance: Option<Duration>,
}

impl BillingConfig {
    /// Create a new billing config
    pub fn new(
        stripe_secret_key: impl Into<String>,
        stripe_webhook_secret: impl Into<String>,
    ) -> Self {
        Self {
            stripe_secret_key: stripe_secret_key.into(),
            stripe_webhook_secret: stripe_webhook_secret.into(),
            stripe_api_base: DEFAULT_STRIPE_API_BASE.to_string(),
            webhook_tolerance: Some(DEFAULT_TOLERANCE),
        }
    }

    /// Override the Stripe API base URL
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.stripe_api_base = api_base.into();
        self
    }

    /// Override the webhook timestamp tolerance
    pub fn with_tolerance(mut self, tolerance: Option<Duration>) -> Self {
        self.webhook_tolerance = tolerance;
        self
    }
}

impl fmt::Debug for BillingConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BillingConfig")
            .field("stripe_secret_key", &"[redacted]")
            .field("stripe_webhook_secret", &"[redacted]")
            .field("stripe_api_base", &self.stripe_api_base)
            .field("webhook_tolerance", &self.webhook_tolerance)
            .finish()
    }
}
