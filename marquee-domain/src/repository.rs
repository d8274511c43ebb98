use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::booking::Booking;
use crate::hold::SeatHold;
use crate::seat::SeatId;

pub type StoreError = Box<dyn std::error::Error + Send + Sync>;

/// Existence check against the catalog-owned showtime table. The booking
/// core never reads anything else from it.
#[async_trait]
pub trait ShowtimeRepository: Send + Sync {
    async fn exists_active(&self, showtime_id: Uuid) -> Result<bool, StoreError>;
}

/// Source of truth for temporarily claimed seats. Every query filters on
/// `expires_at > now`; physical deletion of expired rows is storage hygiene,
/// never a correctness mechanism.
#[async_trait]
pub trait HoldRepository: Send + Sync {
    async fn active_for_showtime(
        &self,
        showtime_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Vec<SeatHold>, StoreError>;

    async fn active_for_user(
        &self,
        showtime_id: Uuid,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<SeatHold>, StoreError>;

    /// Insert, or overwrite the existing (possibly expired) row for the
    /// hold's (showtime, user) pair.
    async fn upsert(&self, hold: &SeatHold) -> Result<(), StoreError>;
}

/// Source of truth for permanently taken seats.
#[async_trait]
pub trait BookingRepository: Send + Sync {
    async fn confirmed_for_showtime(&self, showtime_id: Uuid) -> Result<Vec<Booking>, StoreError>;

    /// Write the confirmed booking and delete the consumed hold as one
    /// atomic store operation. Implementations must enforce uniqueness of
    /// (showtime, seat) among confirmed bookings and report the losing seat
    /// when a concurrent confirmation got there first.
    async fn create_confirmed(
        &self,
        booking: &Booking,
        hold_id: Uuid,
    ) -> Result<(), ConfirmWriteError>;
}

#[derive(Debug, thiserror::Error)]
pub enum ConfirmWriteError {
    #[error("seat {0} already booked")]
    DuplicateSeat(SeatId),

    #[error("storage error: {0}")]
    Store(#[from] StoreError),
}

/// Admin-configured loyalty earn rate, when one is active.
#[async_trait]
pub trait LoyaltyRateProvider: Send + Sync {
    /// Points earned per currency unit at `now`, or None when no configured
    /// rate window covers it.
    async fn active_rate(&self, now: DateTime<Utc>) -> Result<Option<f64>, StoreError>;
}

/// Loyalty balance + transaction log. Credited best-effort after a booking
/// commits; failures must never undo the booking.
#[async_trait]
pub trait LoyaltyLedger: Send + Sync {
    async fn credit(
        &self,
        user_id: &str,
        points: i64,
        reason: &str,
        booking_id: Uuid,
    ) -> Result<(), StoreError>;
}
