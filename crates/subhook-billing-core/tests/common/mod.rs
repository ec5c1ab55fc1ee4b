//! Common test utilities for subhook-billing-core integration tests

pub mod mock_repos;

#[allow(unused_imports)]
pub use mock_repos::{MockProvider, MockSubscriptionRepository, MockUserRepository};
