//! Subhook Billing Core - Stripe webhook handling
//!
//! Verifies Stripe webhook signatures, types the events that matter for
//! subscriptions and hands them to a [`SubscriptionStore`].
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use subhook_billing_core::{BillingConfig, StripeProvider, SubscriptionSync, WebhookService};
//!
//! let config = BillingConfig::new("sk_test_...", "whsec_...");
//! let provider = Arc::new(StripeProvider::new(&config));
//! let store = Arc::new(SubscriptionSync::from_repositories(provider, repos));
//! let webhooks = WebhookService::from_config(&config, store);
//!
//! let event = webhooks.verify(&body, signature)?;
//! webhooks.dispatch(&event).await?;
//! ```

pub mod config;
pub mod error;
pub mod provider;
pub mod service;
pub mod store;
pub mod stripe;
pub mod sync;
pub mod webhook;

pub use config::BillingConfig;
pub use error::BillingError;
pub use provider::PaymentProvider;
pub use service::{DispatchOutcome, WebhookService};
pub use store::SubscriptionStore;
pub use stripe::{Expandable, StripeProvider, StripeSubscription};
pub use sync::SubscriptionSync;
pub use webhook::{
    signature_header, SignatureError, SubscriptionUpdate, WebhookEvent, WebhookEventData,
    WebhookEventType, WebhookHandler, RELEVANT_EVENTS, STRIPE_SIGNATURE_HEADER,
};
