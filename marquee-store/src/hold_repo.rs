use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use marquee_domain::repository::{HoldRepository, StoreError};
use marquee_domain::{SeatHold, SeatId};

pub struct PgHoldRepository {
    pub pool: PgPool,
}

#[derive(sqlx::FromRow)]
struct HoldRow {
    id: Uuid,
    showtime_id: Uuid,
    user_id: String,
    seats: Vec<String>,
    expires_at: DateTime<Utc>,
}

impl HoldRow {
    fn into_domain(self) -> Result<SeatHold, StoreError> {
        let seats = parse_seats(&self.seats)?;
        Ok(SeatHold {
            id: self.id,
            showtime_id: self.showtime_id,
            user_id: self.user_id,
            seats,
            expires_at: self.expires_at,
        })
    }
}

pub(crate) fn parse_seats(raw: &[String]) -> Result<Vec<SeatId>, StoreError> {
    raw.iter()
        .map(|s| s.parse::<SeatId>().map_err(|e| Box::new(e) as StoreError))
        .collect()
}

pub(crate) fn seat_strings(seats: &[SeatId]) -> Vec<String> {
    seats.iter().map(|s| s.to_string()).collect()
}

#[async_trait]
impl HoldRepository for PgHoldRepository {
    async fn active_for_showtime(
        &self,
        showtime_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Vec<SeatHold>, StoreError> {
        let rows = sqlx::query_as::<_, HoldRow>(
            r#"
            SELECT id, showtime_id, user_id, seats, expires_at
            FROM seat_holds
            WHERE showtime_id = $1 AND expires_at > $2
            "#,
        )
        .bind(showtime_id)
        .bind(now)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(HoldRow::into_domain).collect()
    }

    async fn active_for_user(
        &self,
        showtime_id: Uuid,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<SeatHold>, StoreError> {
        let row = sqlx::query_as::<_, HoldRow>(
            r#"
            SELECT id, showtime_id, user_id, seats, expires_at
            FROM seat_holds
            WHERE showtime_id = $1 AND user_id = $2 AND expires_at > $3
            "#,
        )
        .bind(showtime_id)
        .bind(user_id)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;

        row.map(HoldRow::into_domain).transpose()
    }

    async fn upsert(&self, hold: &SeatHold) -> Result<(), StoreError> {
        // Overwrites any previous row for the pair, including an expired
        // one still awaiting cleanup.
        sqlx::query(
            r#"
            INSERT INTO seat_holds (id, showtime_id, user_id, seats, expires_at, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, now(), now())
            ON CONFLICT (showtime_id, user_id)
            DO UPDATE SET
                id = EXCLUDED.id,
                seats = EXCLUDED.seats,
                expires_at = EXCLUDED.expires_at,
                updated_at = now()
            "#,
        )
        .bind(hold.id)
        .bind(hold.showtime_id)
        .bind(&hold.user_id)
        .bind(seat_strings(&hold.seats))
        .bind(hold.expires_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
