//! PostgreSQL subscription repository implementation

use async_trait::async_trait;
use sqlx::PgPool;

use crate::error::DbResult;
use crate::models::SubscriptionRow;
use crate::repo::{SubscriptionRepository, UpsertSubscription};

/// PostgreSQL subscription repository
#[derive(Clone)]
pub struct PgSubscriptionRepository {
    pool: PgPool,
}

impl PgSubscriptionRepository {
    /// Create a new subscription repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SubscriptionRepository for PgSubscriptionRepository {
    async fn insert_if_absent(&self, sub: UpsertSubscription) -> DbResult<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO subscriptions (id, user_id, status, price_id)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(&sub.id)
        .bind(sub.user_id)
        .bind(&sub.status)
        .bind(&sub.price_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn upsert(&self, sub: UpsertSubscription) -> DbResult<SubscriptionRow> {
        let row = sqlx::query_as::<_, SubscriptionRow>(
            r#"
            INSERT INTO subscriptions (id, user_id, status, price_id)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (id) DO UPDATE
            SET user_id = EXCLUDED.user_id,
                status = EXCLUDED.status,
                price_id = EXCLUDED.price_id,
                updated_at = NOW()
            RETURNING id, user_id, status, price_id, created_at, updated_at
            "#,
        )
        .bind(&sub.id)
        .bind(sub.user_id)
        .bind(&sub.status)
        .bind(&sub.price_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    async fn ping(&self) -> DbResult<()> {
        crate::pool::ping(&self.pool).await
    }
}
