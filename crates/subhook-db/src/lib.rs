//! Subhook DB - Database abstractions
//!
//! SQLx-based persistence for the users and subscriptions touched by
//! Stripe webhooks.
//!
//! # Example
//!
//! ```rust,ignore
//! use subhook_db::{create_pool, run_migrations, Repositories, UserRepository};
//!
//! let pool = create_pool("postgres://localhost/subhook").await?;
//! run_migrations(&pool).await?;
//! let repos = Repositories::new(pool);
//!
//! let user = repos.users.find_by_stripe_customer_id("cus_123").await?;
//! ```

pub mod error;
pub mod models;
pub mod pg;
pub mod pool;
pub mod repo;

pub use error::{DbError, DbResult};
pub use models::*;
pub use pg::Repositories;
pub use pool::{create_pool, create_pool_with_options, ping, run_migrations, DbPool, PoolOptions};
pub use repo::*;
