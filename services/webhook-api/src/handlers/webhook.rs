//! Stripe webhook handler

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, Method};
use axum::Json;
use serde::Serialize;
use std::time::Instant;

use subhook_billing_core::{DispatchOutcome, SignatureError, STRIPE_SIGNATURE_HEADER};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Acknowledgement returned for every accepted delivery
#[derive(Debug, Serialize)]
pub struct WebhookAck {
    pub received: bool,
}

/// POST /api/webhooks
///
/// Verifies the Stripe signature over the raw body, then saves the
/// subscription for checkout and subscription lifecycle events. Any other
/// verified event is acknowledged without side effects.
pub async fn stripe_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<Json<WebhookAck>> {
    let start = Instant::now();

    let signature = match headers.get(STRIPE_SIGNATURE_HEADER).map(|v| v.to_str()) {
        Some(Ok(signature)) => signature,
        Some(Err(_)) => return Err(reject(SignatureError::MalformedHeader, start)),
        None => return Err(reject(SignatureError::MissingHeader, start)),
    };

    let event = state
        .webhooks
        .verify(&body, signature)
        .map_err(|e| reject(e, start))?;

    match state.webhooks.dispatch(&event).await {
        Ok(outcome) => {
            let label = match outcome {
                DispatchOutcome::Ignored => "ignored",
                DispatchOutcome::Saved(_) => "processed",
            };
            record_outcome(label, start);
            Ok(Json(WebhookAck { received: true }))
        }
        Err(e) => {
            if e.is_event_error() {
                tracing::warn!(error = %e, event_id = %event.id, event_type = %event.event_type, "Webhook handler failed");
            } else {
                tracing::error!(error = ?e, event_id = %event.id, event_type = %event.event_type, "Webhook handler failed");
            }
            record_outcome("failed", start);
            Err(ApiError::HandlerFailed)
        }
    }
}

/// Any method other than POST on the webhook route
pub async fn method_not_allowed(method: Method) -> ApiError {
    tracing::debug!(%method, "Method not allowed on webhook route");
    ApiError::MethodNotAllowed
}

fn reject(error: SignatureError, start: Instant) -> ApiError {
    tracing::warn!(error = %error, "Webhook verification failed");
    record_outcome("rejected", start);
    ApiError::Verification(error.to_string())
}

fn record_outcome(outcome: &'static str, start: Instant) {
    metrics::counter!("webhooks_received_total", "outcome" => outcome).increment(1);
    metrics::histogram!("webhook_processing_duration_seconds")
        .record(start.elapsed().as_secs_f64());
}
