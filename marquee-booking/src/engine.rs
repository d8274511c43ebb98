use chrono::{DateTime, Duration, Utc};
use std::collections::HashSet;
use std::sync::Arc;
use uuid::Uuid;

use marquee_domain::repository::{
    BookingRepository, ConfirmWriteError, HoldRepository, LoyaltyLedger, LoyaltyRateProvider,
    ShowtimeRepository,
};
use marquee_domain::{Booking, BookingError, SeatGrid, SeatHold, SeatId};

use crate::availability::{partition, SeatAvailability};
use crate::loyalty::points_earned;

/// Business parameters for the booking core, sourced from configuration.
#[derive(Debug, Clone)]
pub struct BookingRules {
    pub hold_duration: Duration,
    pub seat_price_amount: i64,
    /// Earn rate applied when no admin-configured rate is active.
    pub default_loyalty_rate: f64,
    pub grid: SeatGrid,
}

impl Default for BookingRules {
    fn default() -> Self {
        BookingRules {
            hold_duration: Duration::hours(2),
            seat_price_amount: 350,
            default_loyalty_rate: 0.01,
            grid: SeatGrid::default(),
        }
    }
}

/// Whether a hold request created a fresh hold or merged into an existing
/// one (the HTTP layer answers 201 vs 200 accordingly).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoldOutcome {
    Created,
    Extended,
}

/// The seat-availability state machine: availability reads, seat holds, and
/// booking confirmation, over injected stores. Stateless — all coordination
/// happens through the stores' own atomic operations, and every decision is
/// made against reads taken fresh within the same call.
pub struct BookingEngine {
    showtimes: Arc<dyn ShowtimeRepository>,
    holds: Arc<dyn HoldRepository>,
    bookings: Arc<dyn BookingRepository>,
    loyalty_rates: Arc<dyn LoyaltyRateProvider>,
    loyalty_ledger: Arc<dyn LoyaltyLedger>,
    rules: BookingRules,
}

impl BookingEngine {
    pub fn new(
        showtimes: Arc<dyn ShowtimeRepository>,
        holds: Arc<dyn HoldRepository>,
        bookings: Arc<dyn BookingRepository>,
        loyalty_rates: Arc<dyn LoyaltyRateProvider>,
        loyalty_ledger: Arc<dyn LoyaltyLedger>,
        rules: BookingRules,
    ) -> Self {
        BookingEngine {
            showtimes,
            holds,
            bookings,
            loyalty_rates,
            loyalty_ledger,
            rules,
        }
    }

    pub fn rules(&self) -> &BookingRules {
        &self.rules
    }

    /// Read-only availability view for a showtime. When `viewer` is given,
    /// that user's own hold is excluded from the held list.
    pub async fn seat_availability(
        &self,
        showtime_id: Uuid,
        viewer: Option<&str>,
    ) -> Result<SeatAvailability, BookingError> {
        self.check_showtime(showtime_id).await?;
        let now = Utc::now();

        let bookings = self.bookings.confirmed_for_showtime(showtime_id).await?;
        let holds = self.holds.active_for_showtime(showtime_id, now).await?;

        Ok(partition(self.rules.grid, &bookings, &holds, viewer, now))
    }

    /// Claim seats for a user: validate against a fresh availability
    /// snapshot, then merge into the user's existing hold (refreshing its
    /// expiry) or create a new one. Optimistic — the final gate against
    /// races is `confirm_booking`'s re-check plus the store's uniqueness
    /// backstop.
    pub async fn hold_seats(
        &self,
        showtime_id: Uuid,
        user_id: &str,
        requested: &[SeatId],
    ) -> Result<(SeatHold, HoldOutcome), BookingError> {
        self.check_showtime(showtime_id).await?;

        if requested.is_empty() {
            return Err(BookingError::InvalidSeats("no seats requested".to_string()));
        }
        for seat in requested {
            if !self.rules.grid.contains(seat) {
                return Err(BookingError::InvalidSeats(format!(
                    "seat {seat} is outside the hall layout"
                )));
            }
        }

        // Dedup while keeping request order; conflict reporting is
        // deterministic in that order.
        let mut requested_unique: Vec<SeatId> = Vec::with_capacity(requested.len());
        for seat in requested {
            if !requested_unique.contains(seat) {
                requested_unique.push(*seat);
            }
        }

        let now = Utc::now();
        let bookings = self.bookings.confirmed_for_showtime(showtime_id).await?;
        let holds = self.holds.active_for_showtime(showtime_id, now).await?;
        let view = partition(self.rules.grid, &bookings, &holds, Some(user_id), now);

        for seat in &requested_unique {
            if view.is_taken(seat) {
                return Err(BookingError::SeatConflict(*seat));
            }
        }

        match self.holds.active_for_user(showtime_id, user_id, now).await? {
            Some(mut hold) => {
                hold.merge(&requested_unique, now, self.rules.hold_duration);
                self.holds.upsert(&hold).await?;
                Ok((hold, HoldOutcome::Extended))
            }
            None => {
                let hold = SeatHold::new(
                    showtime_id,
                    user_id,
                    requested_unique,
                    now,
                    self.rules.hold_duration,
                );
                self.holds.upsert(&hold).await?;
                Ok((hold, HoldOutcome::Created))
            }
        }
    }

    /// Convert the user's active hold into a confirmed booking. Re-reads
    /// the confirmed set immediately before writing to close the race
    /// window; the booking write and hold delete are one atomic store
    /// operation and the store's (showtime, seat) uniqueness is the hard
    /// backstop. Loyalty credit runs after the write, best-effort.
    pub async fn confirm_booking(
        &self,
        showtime_id: Uuid,
        user_id: &str,
    ) -> Result<Booking, BookingError> {
        self.check_showtime(showtime_id).await?;
        let now = Utc::now();

        let hold = self
            .holds
            .active_for_user(showtime_id, user_id, now)
            .await?
            .filter(|h| !h.seats.is_empty())
            .ok_or(BookingError::NoActiveHold)?;

        let confirmed = self.bookings.confirmed_for_showtime(showtime_id).await?;
        let taken: HashSet<SeatId> = confirmed
            .iter()
            .flat_map(|b| b.seats.iter().copied())
            .collect();
        if let Some(seat) = hold.seats.iter().find(|s| taken.contains(s)) {
            return Err(BookingError::SeatConflict(*seat));
        }

        let total = hold.seats.len() as i64 * self.rules.seat_price_amount;
        let booking = Booking::confirmed(showtime_id, user_id, hold.seats.clone(), total, now);

        self.bookings
            .create_confirmed(&booking, hold.id)
            .await
            .map_err(|e| match e {
                ConfirmWriteError::DuplicateSeat(seat) => BookingError::SeatConflict(seat),
                ConfirmWriteError::Store(e) => BookingError::Store(e),
            })?;

        tracing::info!(
            booking_id = %booking.id,
            showtime_id = %showtime_id,
            seats = booking.seats.len(),
            total = booking.total_price_amount,
            "booking confirmed"
        );

        self.credit_loyalty(&booking, now).await;

        Ok(booking)
    }

    async fn check_showtime(&self, showtime_id: Uuid) -> Result<(), BookingError> {
        if self.showtimes.exists_active(showtime_id).await? {
            Ok(())
        } else {
            Err(BookingError::ShowtimeNotFound)
        }
    }

    /// Best-effort: a loyalty failure is logged and swallowed, it must
    /// never undo or block the booking.
    async fn credit_loyalty(&self, booking: &Booking, now: DateTime<Utc>) {
        let rate = match self.loyalty_rates.active_rate(now).await {
            Ok(Some(rate)) => rate,
            Ok(None) => self.rules.default_loyalty_rate,
            Err(e) => {
                tracing::warn!(booking_id = %booking.id, error = %e, "loyalty rate lookup failed, using default");
                self.rules.default_loyalty_rate
            }
        };

        let points = points_earned(booking.total_price_amount, rate);
        if points == 0 {
            return;
        }

        if let Err(e) = self
            .loyalty_ledger
            .credit(&booking.user_id, points, "booking", booking.id)
            .await
        {
            tracing::warn!(booking_id = %booking.id, error = %e, "loyalty credit failed, booking unaffected");
        }
    }
}
