//! Postgres-backed implementations of the marquee store traits, plus the
//! application configuration and the connection-pool wrapper.

pub mod app_config;
pub mod booking_repo;
pub mod database;
pub mod hold_repo;
pub mod loyalty_repo;
pub mod showtime_repo;

pub use booking_repo::PgBookingRepository;
pub use database::DbClient;
pub use hold_repo::PgHoldRepository;
pub use loyalty_repo::PgLoyaltyStore;
pub use showtime_repo::PgShowtimeRepository;
