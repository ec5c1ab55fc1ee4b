//! Stripe webhook verification and event model

use std::fmt;
use std::time::Duration;

use chrono::Utc;
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;
use thiserror::Error;
use tracing::{debug, instrument, warn};

use crate::error::BillingError;
use crate::stripe::Expandable;

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the Stripe webhook signature
pub const STRIPE_SIGNATURE_HEADER: &str = "stripe-signature";

/// Default maximum age of a signed payload
pub const DEFAULT_TOLERANCE: Duration = Duration::from_secs(300);

/// Event types that update a subscription record
pub const RELEVANT_EVENTS: [&str; 3] = [
    "checkout.session.completed",
    "customer.subscription.updated",
    "customer.subscription.deleted",
];

/// Signature verification failures
///
/// The `Display` text is returned to the caller verbatim.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SignatureError {
    /// No signature header on the request
    #[error("Missing Stripe-Signature header")]
    MissingHeader,

    /// Header lacks a timestamp or any `v1` signature
    #[error("Unable to extract timestamp and signatures from header")]
    MalformedHeader,

    /// No `v1` signature matches the payload
    #[error("No signatures found matching the expected signature for payload")]
    NoMatch,

    /// Signed timestamp is too far from now
    #[error("Timestamp outside the tolerance zone")]
    TimestampOutsideTolerance,

    /// Signature matched but the body is not a Stripe event
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),
}

/// Webhook event types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookEventType {
    /// Checkout session completed
    CheckoutSessionCompleted,
    /// Customer subscription updated
    CustomerSubscriptionUpdated,
    /// Customer subscription deleted
    CustomerSubscriptionDeleted,
    /// Any other event type
    Unknown(String),
}

impl From<&str> for WebhookEventType {
    fn from(s: &str) -> Self {
        match s {
            "checkout.session.completed" => Self::CheckoutSessionCompleted,
            "customer.subscription.updated" => Self::CustomerSubscriptionUpdated,
            "customer.subscription.deleted" => Self::CustomerSubscriptionDeleted,
            other => Self::Unknown(other.to_string()),
        }
    }
}

impl WebhookEventType {
    /// The Stripe type tag
    pub fn as_str(&self) -> &str {
        match self {
            Self::CheckoutSessionCompleted => "checkout.session.completed",
            Self::CustomerSubscriptionUpdated => "customer.subscription.updated",
            Self::CustomerSubscriptionDeleted => "customer.subscription.deleted",
            Self::Unknown(other) => other,
        }
    }

    /// Whether events of this type update a subscription
    pub fn is_relevant(&self) -> bool {
        RELEVANT_EVENTS.contains(&self.as_str())
    }
}

impl fmt::Display for WebhookEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Verified webhook event
#[derive(Debug, Clone)]
pub struct WebhookEvent {
    /// Event ID
    pub id: String,
    /// Event type
    pub event_type: WebhookEventType,
    /// When the event was created (Unix timestamp)
    pub created: i64,
    /// Whether the event came from live mode
    pub livemode: bool,
    /// Undecoded `data.object`; its shape depends on `event_type`
    pub object: serde_json::Value,
}

impl WebhookEvent {
    /// Decode `data.object` into the variant matching the event type
    pub fn data(&self) -> Result<WebhookEventData, BillingError> {
        match &self.event_type {
            WebhookEventType::CheckoutSessionCompleted => Ok(
                WebhookEventData::CheckoutSessionCompleted(decode_object(&self.object)?),
            ),
            WebhookEventType::CustomerSubscriptionUpdated => Ok(
                WebhookEventData::SubscriptionUpdated(decode_object(&self.object)?),
            ),
            WebhookEventType::CustomerSubscriptionDeleted => Ok(
                WebhookEventData::SubscriptionDeleted(decode_object(&self.object)?),
            ),
            WebhookEventType::Unknown(other) => Err(BillingError::UnhandledEvent(other.clone())),
        }
    }
}

fn decode_object<T: for<'de> Deserialize<'de>>(
    object: &serde_json::Value,
) -> Result<T, BillingError> {
    T::deserialize(object).map_err(|e| BillingError::InvalidObject(e.to_string()))
}

/// Typed `data.object` of a subscription-relevant event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookEventData {
    /// `checkout.session.completed`
    CheckoutSessionCompleted(CheckoutSessionObject),
    /// `customer.subscription.updated`
    SubscriptionUpdated(SubscriptionObject),
    /// `customer.subscription.deleted`
    SubscriptionDeleted(SubscriptionObject),
}

impl WebhookEventData {
    /// Arguments of the subscription write this event calls for
    pub fn subscription_update(&self) -> Result<SubscriptionUpdate, BillingError> {
        match self {
            Self::SubscriptionUpdated(sub) | Self::SubscriptionDeleted(sub) => {
                Ok(SubscriptionUpdate {
                    subscription_id: sub.id.clone(),
                    customer_id: sub.customer.id().to_string(),
                    created_action: false,
                })
            }
            Self::CheckoutSessionCompleted(session) => {
                let subscription = session
                    .subscription
                    .as_ref()
                    .ok_or(BillingError::MissingField("subscription"))?;
                let customer = session
                    .customer
                    .as_ref()
                    .ok_or(BillingError::MissingField("customer"))?;

                Ok(SubscriptionUpdate {
                    subscription_id: subscription.id().to_string(),
                    customer_id: customer.id().to_string(),
                    created_action: true,
                })
            }
        }
    }
}

/// Checkout session fields used by the handler
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CheckoutSessionObject {
    /// Session ID
    pub id: String,
    /// Subscription created by the session; absent for one-off payments
    #[serde(default)]
    pub subscription: Option<Expandable>,
    /// Customer who checked out
    #[serde(default)]
    pub customer: Option<Expandable>,
}

/// Subscription fields used by the handler
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SubscriptionObject {
    /// Subscription ID
    pub id: String,
    /// Owning customer
    pub customer: Expandable,
}

/// One subscription write derived from an event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriptionUpdate {
    /// Stripe subscription ID
    pub subscription_id: String,
    /// Stripe customer ID
    pub customer_id: String,
    /// `true` when the write creates the record (checkout), `false` when it modifies it
    pub created_action: bool,
}

/// Verifies Stripe webhook signatures and decodes the event envelope
#[derive(Clone)]
pub struct WebhookHandler {
    webhook_secret: String,
    tolerance: Option<Duration>,
}

impl fmt::Debug for WebhookHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebhookHandler")
            .field("tolerance", &self.tolerance)
            .finish_non_exhaustive()
    }
}

impl WebhookHandler {
    /// Create a new webhook handler with the default tolerance
    pub fn new(webhook_secret: impl Into<String>) -> Self {
        Self {
            webhook_secret: webhook_secret.into(),
            tolerance: Some(DEFAULT_TOLERANCE),
        }
    }

    /// Set the timestamp tolerance; `None` accepts any timestamp
    pub fn with_tolerance(mut self, tolerance: Option<Duration>) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Verify and parse a webhook payload
    pub fn verify_and_parse(
        &self,
        payload: &[u8],
        signature: &str,
    ) -> Result<WebhookEvent, SignatureError> {
        self.verify_and_parse_at(payload, signature, Utc::now().timestamp())
    }

    /// Verify and parse a webhook payload against an explicit clock
    #[instrument(skip(self, payload, signature))]
    pub fn verify_and_parse_at(
        &self,
        payload: &[u8],
        signature: &str,
        now: i64,
    ) -> Result<WebhookEvent, SignatureError> {
        self.verify_signature(payload, signature, now)?;

        let raw_event: RawStripeEvent = serde_json::from_slice(payload)
            .map_err(|e| SignatureError::InvalidPayload(e.to_string()))?;

        debug!(event_id = %raw_event.id, event_type = %raw_event.event_type, "Parsed webhook event");

        Ok(WebhookEvent {
            id: raw_event.id,
            event_type: WebhookEventType::from(raw_event.event_type.as_str()),
            created: raw_event.created,
            livemode: raw_event.livemode,
            object: raw_event.data.object,
        })
    }

    fn verify_signature(
        &self,
        payload: &[u8],
        signature: &str,
        now: i64,
    ) -> Result<(), SignatureError> {
        let header = SignatureHeader::parse(signature)?;

        let expected = self.mac_for(header.raw_timestamp, payload)?;
        let matched = header.signatures.iter().any(|candidate| {
            hex::decode(candidate)
                .map(|bytes| expected.clone().verify_slice(&bytes).is_ok())
                .unwrap_or(false)
        });

        if !matched {
            warn!("Webhook signature verification failed");
            return Err(SignatureError::NoMatch);
        }

        if let Some(tolerance) = self.tolerance {
            let age = now.abs_diff(header.timestamp);
            if age > tolerance.as_secs() {
                warn!(timestamp = header.timestamp, now = now, "Webhook timestamp outside tolerance");
                return Err(SignatureError::TimestampOutsideTolerance);
            }
        }

        Ok(())
    }

    fn mac_for(&self, timestamp: &str, payload: &[u8]) -> Result<HmacSha256, SignatureError> {
        // HMAC takes keys of any length, so this never fails in practice
        let mut mac = HmacSha256::new_from_slice(self.webhook_secret.as_bytes())
            .map_err(|_| SignatureError::NoMatch)?;
        mac.update(timestamp.as_bytes());
        mac.update(b".");
        mac.update(payload);
        Ok(mac)
    }
}

/// Build a `Stripe-Signature` header value for `payload`
///
/// Mirrors what Stripe sends; used to sign test fixtures and replayed events.
pub fn signature_header(payload: &[u8], secret: &str, timestamp: i64) -> String {
    let ts = timestamp.to_string();
    let signature = match HmacSha256::new_from_slice(secret.as_bytes()) {
        Ok(mut mac) => {
            mac.update(ts.as_bytes());
            mac.update(b".");
            mac.update(payload);
            hex::encode(mac.finalize().into_bytes())
        }
        Err(_) => String::new(),
    };
    format!("t={ts},v1={signature}")
}

/// Parsed `t=...,v1=...` header
struct SignatureHeader<'a> {
    raw_timestamp: &'a str,
    timestamp: i64,
    signatures: Vec<&'a str>,
}

impl<'a> SignatureHeader<'a> {
    fn parse(header: &'a str) -> Result<Self, SignatureError> {
        let mut raw_timestamp = None;
        let mut signatures = Vec::new();

        for part in header.split(',') {
            if let Some((key, value)) = part.trim().split_once('=') {
                match key {
                    "t" => raw_timestamp = Some(value),
                    "v1" => signatures.push(value),
                    _ => {}
                }
            }
        }

        let raw_timestamp = raw_timestamp.ok_or(SignatureError::MalformedHeader)?;
        let timestamp = raw_timestamp
            .parse()
            .map_err(|_| SignatureError::MalformedHeader)?;
        if signatures.is_empty() {
            return Err(SignatureError::MalformedHeader);
        }

        Ok(Self {
            raw_timestamp,
            timestamp,
            signatures,
        })
    }
}

// Raw Stripe event for parsing
#[derive(Debug, Deserialize)]
struct RawStripeEvent {
    id: String,
    #[serde(rename = "type")]
    event_type: String,
    #[serde(default)]
    created: i64,
    #[serde(default)]
    livemode: bool,
    data: RawEventData,
}

#[derive(Debug, Deserialize)]
struct RawEventData {
    object: serde_json::Value,
}
