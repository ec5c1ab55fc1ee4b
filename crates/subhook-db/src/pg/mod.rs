//! PostgreSQL repository implementations

mod subscription;
mod user;

pub use subscription::PgSubscriptionRepository;
pub use user::PgUserRepository;

use crate::DbPool;

/// All repositories bundled together
#[derive(Clone)]
pub struct Repositories {
    pub users: PgUserRepository,
    pub subscriptions: PgSubscriptionRepository,
}

impl Repositories {
    /// Create all repositories from a database pool
    pub fn new(pool: DbPool) -> Self {
        Self {
            users: PgUserRepository::new(pool.clone()),
            subscriptions: PgSubscriptionRepository::new(pool),
        }
    }
}
