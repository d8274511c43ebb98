//! The booking operations: availability resolution, seat holds, and booking
//! confirmation, written against the store traits in `marquee-domain`.

pub mod availability;
pub mod engine;
pub mod loyalty;

pub use availability::{HeldSeat, SeatAvailability};
pub use engine::{BookingEngine, BookingRules, HoldOutcome};
