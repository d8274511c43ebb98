//! Domain types for the marquee seat-booking core: seats and the hall grid,
//! holds and bookings, the error taxonomy, and the store/collaborator traits
//! the operations are written against.

pub mod booking;
pub mod error;
pub mod hold;
pub mod repository;
pub mod seat;

pub use booking::{Booking, BookingStatus};
pub use error::BookingError;
pub use hold::SeatHold;
pub use seat::{SeatGrid, SeatId};
