//! Subscription sync tests
//!
//! Exercise `SubscriptionSync` against in-memory repositories and provider.

mod common;

use std::sync::Arc;

use common::{MockProvider, MockSubscriptionRepository, MockUserRepository};
use subhook_billing_core::{BillingError, SubscriptionStore, SubscriptionSync};

struct Fixture {
    provider: MockProvider,
    users: MockUserRepository,
    subscriptions: MockSubscriptionRepository,
    sync: SubscriptionSync,
}

fn fixture() -> Fixture {
    let provider = MockProvider::new();
    let users = MockUserRepository::new();
    let subscriptions = MockSubscriptionRepository::new();
    let sync = SubscriptionSync::new(
        Arc::new(provider.clone()),
        Arc::new(users.clone()),
        Arc::new(subscriptions.clone()),
    );

    Fixture {
        provider,
        users,
        subscriptions,
        sync,
    }
}

#[tokio::test]
async fn test_checkout_creates_subscription() {
    let f = fixture();
    let user_id = f.users.insert_customer("cus_1");
    f.provider.insert("sub_1", "cus_1", "active", "price_pro");

    f.sync.save_subscription("sub_1", "cus_1", true).await.unwrap();

    let row = f.subscriptions.get("sub_1").expect("row stored");
    assert_eq!(row.user_id, user_id);
    assert_eq!(row.status, "active");
    assert_eq!(row.price_id.as_deref(), Some("price_pro"));
}

#[tokio::test]
async fn test_redelivered_checkout_is_noop() {
    let f = fixture();
    f.users.insert_customer("cus_1");
    f.provider.insert("sub_1", "cus_1", "active", "price_pro");

    f.sync.save_subscription("sub_1", "cus_1", true).await.unwrap();
    f.provider.insert("sub_1", "cus_1", "past_due", "price_pro");
    f.sync.save_subscription("sub_1", "cus_1", true).await.unwrap();

    assert_eq!(f.subscriptions.len(), 1);
    assert_eq!(f.subscriptions.get("sub_1").unwrap().status, "active");
}

#[tokio::test]
async fn test_update_replaces_status() {
    let f = fixture();
    f.users.insert_customer("cus_2");
    f.provider.insert("sub_2", "cus_2", "active", "price_basic");
    f.sync.save_subscription("sub_2", "cus_2", true).await.unwrap();

    f.provider.insert("sub_2", "cus_2", "canceled", "price_basic");
    f.sync.save_subscription("sub_2", "cus_2", false).await.unwrap();

    assert_eq!(f.subscriptions.get("sub_2").unwrap().status, "canceled");
}

#[tokio::test]
async fn test_update_before_checkout_inserts() {
    let f = fixture();
    f.users.insert_customer("cus_3");
    f.provider.insert("sub_3", "cus_3", "trialing", "price_basic");

    f.sync.save_subscription("sub_3", "cus_3", false).await.unwrap();

    assert_eq!(f.subscriptions.get("sub_3").unwrap().status, "trialing");
}

#[tokio::test]
async fn test_unknown_customer_fails() {
    let f = fixture();
    f.provider.insert("sub_4", "cus_unknown", "active", "price_basic");

    let err = f
        .sync
        .save_subscription("sub_4", "cus_unknown", true)
        .await
        .unwrap_err();

    assert!(matches!(err, BillingError::CustomerNotFound(ref c) if c == "cus_unknown"));
    assert_eq!(f.subscriptions.len(), 0);
}

#[tokio::test]
async fn test_provider_failure_fails() {
    let f = fixture();
    f.users.insert_customer("cus_5");

    let err = f
        .sync
        .save_subscription("sub_missing", "cus_5", false)
        .await
        .unwrap_err();

    assert!(matches!(err, BillingError::ProviderError(_)));
    assert_eq!(f.subscriptions.len(), 0);
}

#[tokio::test]
async fn test_ping_delegates_to_repository() {
    let f = fixture();
    assert!(f.sync.ping().await.is_ok());
}
