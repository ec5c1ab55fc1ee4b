//! Shared fixtures for webhook-api integration tests

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use chrono::Utc;
use hmac::{Hmac, Mac};
use http_body_util::BodyExt;
use sha2::Sha256;
use tokio::sync::Mutex;
use tower::ServiceExt;

use subhook_billing_core::{BillingConfig, BillingError, SubscriptionStore, WebhookService};
use webhook_api::{build_router, AppState, Config, WEBHOOK_PATH};

pub const SECRET: &str = "whsec_test_secret_key";

/// Arguments of one `save_subscription` call
pub type SaveCall = (String, String, bool);

/// Store that records every call and can be told to fail
#[derive(Default)]
pub struct RecordingStore {
    calls: Mutex<Vec<SaveCall>>,
    fail: bool,
}

impl RecordingStore {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub async fn calls(&self) -> Vec<SaveCall> {
        self.calls.lock().await.clone()
    }
}

#[async_trait]
impl SubscriptionStore for RecordingStore {
    async fn save_subscription(
        &self,
        subscription_id: &str,
        customer_id: &str,
        created_action: bool,
    ) -> Result<(), BillingError> {
        self.calls.lock().await.push((
            subscription_id.to_string(),
            customer_id.to_string(),
            created_action,
        ));
        if self.fail {
            return Err(BillingError::Internal("instance not unique".into()));
        }
        Ok(())
    }

    async fn ping(&self) -> Result<(), BillingError> {
        if self.fail {
            return Err(BillingError::Internal("store unreachable".into()));
        }
        Ok(())
    }
}

pub fn test_config() -> Config {
    Config {
        http_port: 0,
        database_url: String::new(),
        billing: BillingConfig::new("sk_test_123", SECRET),
        request_timeout: Duration::from_secs(5),
        metrics_enabled: false,
        run_migrations: false,
    }
}

pub fn app(store: Arc<RecordingStore>) -> Router {
    let config = test_config();
    let webhooks = WebhookService::from_config(&config.billing, store);
    build_router(AppState::new(webhooks, config), None)
}

/// Generate a Stripe signature header the way Stripe does
pub fn stripe_signature(payload: &[u8], secret: &str, timestamp: i64) -> String {
    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes()).unwrap();
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);
    let signature = hex::encode(mac.finalize().into_bytes());

    format!("t={},v1={}", timestamp, signature)
}

pub fn event_payload(event_type: &str, object: serde_json::Value) -> Vec<u8> {
    serde_json::to_vec(&serde_json::json!({
        "id": "evt_test_123",
        "object": "event",
        "type": event_type,
        "created": Utc::now().timestamp(),
        "livemode": false,
        "data": { "object": object }
    }))
    .unwrap()
}

pub fn signed_request(payload: Vec<u8>) -> Request<Body> {
    let signature = stripe_signature(&payload, SECRET, Utc::now().timestamp());
    Request::builder()
        .method(Method::POST)
        .uri(WEBHOOK_PATH)
        .header("stripe-signature", signature)
        .header("content-type", "application/json")
        .body(Body::from(payload))
        .unwrap()
}

pub async fn send(app: Router, request: Request<Body>) -> Response<Body> {
    app.oneshot(request).await.unwrap()
}

pub async fn body_string(response: Response<Body>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
