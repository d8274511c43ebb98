use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use marquee_domain::repository::{BookingRepository, ConfirmWriteError, StoreError};
use marquee_domain::{Booking, BookingStatus};

use crate::hold_repo::{parse_seats, seat_strings};

pub struct PgBookingRepository {
    pub pool: PgPool,
}

#[derive(sqlx::FromRow)]
struct BookingRow {
    id: Uuid,
    showtime_id: Uuid,
    user_id: String,
    seats: Vec<String>,
    total_price_amount: i64,
    status: String,
    created_at: DateTime<Utc>,
}

impl BookingRow {
    fn into_domain(self) -> Result<Booking, StoreError> {
        let status = BookingStatus::parse(&self.status)
            .ok_or_else(|| format!("unknown booking status: {}", self.status))?;
        Ok(Booking {
            id: self.id,
            showtime_id: self.showtime_id,
            user_id: self.user_id,
            seats: parse_seats(&self.seats)?,
            total_price_amount: self.total_price_amount,
            status,
            created_at: self.created_at,
        })
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(
        err,
        sqlx::Error::Database(db) if matches!(db.kind(), sqlx::error::ErrorKind::UniqueViolation)
    )
}

#[async_trait]
impl BookingRepository for PgBookingRepository {
    async fn confirmed_for_showtime(&self, showtime_id: Uuid) -> Result<Vec<Booking>, StoreError> {
        let rows = sqlx::query_as::<_, BookingRow>(
            r#"
            SELECT id, showtime_id, user_id, seats, total_price_amount, status, created_at
            FROM bookings
            WHERE showtime_id = $1 AND status = $2
            "#,
        )
        .bind(showtime_id)
        .bind(BookingStatus::Confirmed.as_str())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(BookingRow::into_domain).collect()
    }

    /// Booking insert, per-seat index insert, and hold delete in one
    /// transaction. The (showtime_id, seat_id) primary key on booking_seats
    /// turns a lost race into a unique violation on the contested seat.
    async fn create_confirmed(
        &self,
        booking: &Booking,
        hold_id: Uuid,
    ) -> Result<(), ConfirmWriteError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| ConfirmWriteError::Store(e.into()))?;

        sqlx::query(
            r#"
            INSERT INTO bookings (id, showtime_id, user_id, seats, total_price_amount, status, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(booking.id)
        .bind(booking.showtime_id)
        .bind(&booking.user_id)
        .bind(seat_strings(&booking.seats))
        .bind(booking.total_price_amount)
        .bind(booking.status.as_str())
        .bind(booking.created_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| ConfirmWriteError::Store(e.into()))?;

        for seat in &booking.seats {
            let result = sqlx::query(
                r#"
                INSERT INTO booking_seats (showtime_id, seat_id, booking_id)
                VALUES ($1, $2, $3)
                "#,
            )
            .bind(booking.showtime_id)
            .bind(seat.to_string())
            .bind(booking.id)
            .execute(&mut *tx)
            .await;

            if let Err(e) = result {
                // Dropping the transaction rolls the booking insert back.
                if is_unique_violation(&e) {
                    return Err(ConfirmWriteError::DuplicateSeat(*seat));
                }
                return Err(ConfirmWriteError::Store(e.into()));
            }
        }

        sqlx::query("DELETE FROM seat_holds WHERE id = $1")
            .bind(hold_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| ConfirmWriteError::Store(e.into()))?;

        tx.commit()
            .await
            .map_err(|e| ConfirmWriteError::Store(e.into()))?;

        Ok(())
    }
}
