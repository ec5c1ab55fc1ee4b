//! Billing errors

use thiserror::Error;

/// Errors raised while dispatching a verified webhook event
#[derive(Error, Debug)]
pub enum BillingError {
    /// Event type reached dispatch without a handler
    #[error("unhandled event type: {0}")]
    UnhandledEvent(String),

    /// The event object could not be decoded for its type
    #[error("invalid event object: {0}")]
    InvalidObject(String),

    /// A field required to save the subscription is absent
    #[error("event object is missing `{0}`")]
    MissingField(&'static str),

    /// No user is linked to the Stripe customer
    #[error("customer not found: {0}")]
    CustomerNotFound(String),

    /// Payment provider error
    #[error("provider error: {0}")]
    ProviderError(String),

    /// Database error
    #[error("database error: {0}")]
    Database(#[from] subhook_db::DbError),

    /// Internal error
    #[error("internal error: {0}")]
    Internal(String),
}

impl BillingError {
    /// Check if the event itself was unusable, as opposed to a downstream failure
    pub fn is_event_error(&self) -> bool {
        matches!(
            self,
            Self::UnhandledEvent(_) | Self::InvalidObject(_) | Self::MissingField(_)
        )
    }
}
