use crate::repository::StoreError;
use crate::seat::SeatId;

/// Failure taxonomy for the booking core. Seat contention is a legitimate
/// business outcome and is never retried; callers surface it so the user can
/// pick different seats.
#[derive(Debug, thiserror::Error)]
pub enum BookingError {
    #[error("showtime not found")]
    ShowtimeNotFound,

    #[error("{0}")]
    InvalidSeats(String),

    #[error("no valid held seats to confirm")]
    NoActiveHold,

    /// Always names the first offending seat so the client can deselect it.
    #[error("seat {0} is no longer available")]
    SeatConflict(SeatId),

    #[error("storage error: {0}")]
    Store(#[from] StoreError),
}
