use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use marquee_domain::repository::{LoyaltyLedger, LoyaltyRateProvider, StoreError};

/// Admin-configured earn rates plus the balance/transaction ledger.
pub struct PgLoyaltyStore {
    pub pool: PgPool,
}

#[async_trait]
impl LoyaltyRateProvider for PgLoyaltyStore {
    async fn active_rate(&self, now: DateTime<Utc>) -> Result<Option<f64>, StoreError> {
        let rate: Option<f64> = sqlx::query_scalar(
            r#"
            SELECT points_per_unit
            FROM loyalty_rates
            WHERE is_active
              AND (starts_at IS NULL OR starts_at <= $1)
              AND (ends_at IS NULL OR ends_at > $1)
            ORDER BY starts_at DESC NULLS LAST
            LIMIT 1
            "#,
        )
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;

        Ok(rate)
    }
}

#[async_trait]
impl LoyaltyLedger for PgLoyaltyStore {
    async fn credit(
        &self,
        user_id: &str,
        points: i64,
        reason: &str,
        booking_id: Uuid,
    ) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO loyalty_transactions (id, user_id, points, reason, booking_id, created_at)
            VALUES ($1, $2, $3, $4, $5, now())
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(points)
        .bind(reason)
        .bind(booking_id)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO loyalty_balances (user_id, points)
            VALUES ($1, $2)
            ON CONFLICT (user_id)
            DO UPDATE SET points = loyalty_balances.points + EXCLUDED.points
            "#,
        )
        .bind(user_id)
        .bind(points)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }
}
