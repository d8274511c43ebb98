use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::seat::SeatId;

/// A permanent, paid seat allocation. Created only by confirming a hold;
/// cancellation is handled by an out-of-scope refund flow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: Uuid,
    pub showtime_id: Uuid,
    pub user_id: String,
    pub seats: Vec<SeatId>,
    pub total_price_amount: i64,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
}

impl Booking {
    pub fn confirmed(
        showtime_id: Uuid,
        user_id: &str,
        seats: Vec<SeatId>,
        total_price_amount: i64,
        now: DateTime<Utc>,
    ) -> Self {
        Booking {
            id: Uuid::new_v4(),
            showtime_id,
            user_id: user_id.to_string(),
            seats,
            total_price_amount,
            status: BookingStatus::Confirmed,
            created_at: now,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatus {
    Confirmed,
    Cancelled,
}

impl BookingStatus {
    /// Text form stored in the status column.
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Confirmed => "CONFIRMED",
            BookingStatus::Cancelled => "CANCELLED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "CONFIRMED" => Some(BookingStatus::Confirmed),
            "CANCELLED" => Some(BookingStatus::Cancelled),
            _ => None,
        }
    }
}
