use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::seat::SeatId;

/// One user's temporary claim on a set of seats for a showtime. At most one
/// hold exists per (showtime, user); re-holding merges into it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeatHold {
    pub id: Uuid,
    pub showtime_id: Uuid,
    pub user_id: String,
    pub seats: Vec<SeatId>,
    pub expires_at: DateTime<Utc>,
}

impl SeatHold {
    pub fn new(
        showtime_id: Uuid,
        user_id: &str,
        seats: Vec<SeatId>,
        now: DateTime<Utc>,
        duration: Duration,
    ) -> Self {
        SeatHold {
            id: Uuid::new_v4(),
            showtime_id,
            user_id: user_id.to_string(),
            seats,
            expires_at: now + duration,
        }
    }

    /// A hold counts only while unexpired; expired rows may linger in
    /// storage and every reader must ignore them.
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        self.expires_at > now
    }

    /// Set-union the requested seats into this hold (existing order kept,
    /// new seats appended in request order) and reset the expiry window.
    pub fn merge(&mut self, requested: &[SeatId], now: DateTime<Utc>, duration: Duration) {
        for seat in requested {
            if !self.seats.contains(seat) {
                self.seats.push(*seat);
            }
        }
        self.expires_at = now + duration;
    }
}
