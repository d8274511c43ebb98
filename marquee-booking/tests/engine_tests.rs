//! Engine-level tests running the booking operations against in-memory
//! store implementations, covering the core availability, exclusivity,
//! merge, expiry, and race-backstop properties.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use marquee_booking::{BookingEngine, BookingRules, HoldOutcome};
use marquee_domain::repository::{
    BookingRepository, ConfirmWriteError, HoldRepository, LoyaltyLedger, LoyaltyRateProvider,
    ShowtimeRepository, StoreError,
};
use marquee_domain::{Booking, BookingError, SeatHold, SeatId};

#[derive(Default)]
struct MemStore {
    showtimes: Mutex<HashSet<Uuid>>,
    holds: Mutex<HashMap<(Uuid, String), SeatHold>>,
    bookings: Mutex<Vec<Booking>>,
    // Mirrors the (showtime_id, seat_id) uniqueness backstop of the real
    // store.
    seat_index: Mutex<HashSet<(Uuid, SeatId)>>,
    credits: Mutex<Vec<(String, i64, Uuid)>>,
    rate: Mutex<Option<f64>>,
    fail_credit: AtomicBool,
}

impl MemStore {
    fn with_showtime(showtime_id: Uuid) -> Arc<Self> {
        let store = Arc::new(MemStore::default());
        store.showtimes.lock().unwrap().insert(showtime_id);
        store
    }
}

#[async_trait]
impl ShowtimeRepository for MemStore {
    async fn exists_active(&self, showtime_id: Uuid) -> Result<bool, StoreError> {
        Ok(self.showtimes.lock().unwrap().contains(&showtime_id))
    }
}

#[async_trait]
impl HoldRepository for MemStore {
    async fn active_for_showtime(
        &self,
        showtime_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Vec<SeatHold>, StoreError> {
        Ok(self
            .holds
            .lock()
            .unwrap()
            .values()
            .filter(|h| h.showtime_id == showtime_id && h.is_active(now))
            .cloned()
            .collect())
    }

    async fn active_for_user(
        &self,
        showtime_id: Uuid,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<SeatHold>, StoreError> {
        Ok(self
            .holds
            .lock()
            .unwrap()
            .get(&(showtime_id, user_id.to_string()))
            .filter(|h| h.is_active(now))
            .cloned())
    }

    async fn upsert(&self, hold: &SeatHold) -> Result<(), StoreError> {
        self.holds
            .lock()
            .unwrap()
            .insert((hold.showtime_id, hold.user_id.clone()), hold.clone());
        Ok(())
    }
}

#[async_trait]
impl BookingRepository for MemStore {
    async fn confirmed_for_showtime(&self, showtime_id: Uuid) -> Result<Vec<Booking>, StoreError> {
        Ok(self
            .bookings
            .lock()
            .unwrap()
            .iter()
            .filter(|b| b.showtime_id == showtime_id)
            .cloned()
            .collect())
    }

    async fn create_confirmed(
        &self,
        booking: &Booking,
        hold_id: Uuid,
    ) -> Result<(), ConfirmWriteError> {
        let mut index = self.seat_index.lock().unwrap();
        for seat in &booking.seats {
            if index.contains(&(booking.showtime_id, *seat)) {
                return Err(ConfirmWriteError::DuplicateSeat(*seat));
            }
        }
        for seat in &booking.seats {
            index.insert((booking.showtime_id, *seat));
        }
        self.bookings.lock().unwrap().push(booking.clone());
        self.holds.lock().unwrap().retain(|_, h| h.id != hold_id);
        Ok(())
    }
}

#[async_trait]
impl LoyaltyRateProvider for MemStore {
    async fn active_rate(&self, _now: DateTime<Utc>) -> Result<Option<f64>, StoreError> {
        Ok(*self.rate.lock().unwrap())
    }
}

#[async_trait]
impl LoyaltyLedger for MemStore {
    async fn credit(
        &self,
        user_id: &str,
        points: i64,
        _reason: &str,
        booking_id: Uuid,
    ) -> Result<(), StoreError> {
        if self.fail_credit.load(Ordering::SeqCst) {
            return Err("ledger unavailable".into());
        }
        self.credits
            .lock()
            .unwrap()
            .push((user_id.to_string(), points, booking_id));
        Ok(())
    }
}

fn engine(store: &Arc<MemStore>) -> BookingEngine {
    BookingEngine::new(
        store.clone(),
        store.clone(),
        store.clone(),
        store.clone(),
        store.clone(),
        BookingRules::default(),
    )
}

fn seats(ids: &[&str]) -> Vec<SeatId> {
    ids.iter().map(|s| s.parse().unwrap()).collect()
}

#[tokio::test]
async fn unknown_showtime_fails_every_operation() {
    let store = Arc::new(MemStore::default());
    let engine = engine(&store);
    let showtime = Uuid::new_v4();

    assert!(matches!(
        engine.seat_availability(showtime, None).await,
        Err(BookingError::ShowtimeNotFound)
    ));
    assert!(matches!(
        engine.hold_seats(showtime, "u1", &seats(&["A1"])).await,
        Err(BookingError::ShowtimeNotFound)
    ));
    assert!(matches!(
        engine.confirm_booking(showtime, "u1").await,
        Err(BookingError::ShowtimeNotFound)
    ));
}

#[tokio::test]
async fn rejects_empty_and_out_of_grid_seat_lists() {
    let showtime = Uuid::new_v4();
    let store = MemStore::with_showtime(showtime);
    let engine = engine(&store);

    assert!(matches!(
        engine.hold_seats(showtime, "u1", &[]).await,
        Err(BookingError::InvalidSeats(_))
    ));
    assert!(matches!(
        engine.hold_seats(showtime, "u1", &seats(&["H1"])).await,
        Err(BookingError::InvalidSeats(_))
    ));
    assert!(matches!(
        engine.hold_seats(showtime, "u1", &seats(&["A13"])).await,
        Err(BookingError::InvalidSeats(_))
    ));
}

// A seat held by one user cannot be held by another.
#[tokio::test]
async fn held_seat_is_exclusive() {
    let showtime = Uuid::new_v4();
    let store = MemStore::with_showtime(showtime);
    let engine = engine(&store);

    engine
        .hold_seats(showtime, "u1", &seats(&["B5", "B6"]))
        .await
        .unwrap();

    let err = engine
        .hold_seats(showtime, "u2", &seats(&["B6", "B7"]))
        .await
        .unwrap_err();
    match err {
        BookingError::SeatConflict(seat) => assert_eq!(seat.to_string(), "B6"),
        other => panic!("expected conflict, got {other:?}"),
    }
}

// Repeat holds by the same user merge and refresh the expiry.
#[tokio::test]
async fn repeat_holds_merge_into_one() {
    let showtime = Uuid::new_v4();
    let store = MemStore::with_showtime(showtime);
    let engine = engine(&store);

    let (first, outcome) = engine
        .hold_seats(showtime, "u1", &seats(&["A1"]))
        .await
        .unwrap();
    assert_eq!(outcome, HoldOutcome::Created);

    let (second, outcome) = engine
        .hold_seats(showtime, "u1", &seats(&["A2"]))
        .await
        .unwrap();
    assert_eq!(outcome, HoldOutcome::Extended);
    assert_eq!(second.id, first.id);
    assert_eq!(second.seats, seats(&["A1", "A2"]));
    assert!(second.expires_at >= first.expires_at);
    assert_eq!(store.holds.lock().unwrap().len(), 1);
}

// An expired hold releases its seats.
#[tokio::test]
async fn expired_hold_releases_seats() {
    let showtime = Uuid::new_v4();
    let store = MemStore::with_showtime(showtime);
    let engine = engine(&store);

    let stale = SeatHold {
        id: Uuid::new_v4(),
        showtime_id: showtime,
        user_id: "u1".to_string(),
        seats: seats(&["C3", "C4"]),
        expires_at: Utc::now() - Duration::minutes(1),
    };
    store.upsert(&stale).await.unwrap();

    let view = engine.seat_availability(showtime, None).await.unwrap();
    assert!(view.held.is_empty());

    // Another user can take the seats, and the stale holder cannot confirm.
    let (hold, _) = engine
        .hold_seats(showtime, "u2", &seats(&["C3", "C4"]))
        .await
        .unwrap();
    assert_eq!(hold.seats, seats(&["C3", "C4"]));

    assert!(matches!(
        engine.confirm_booking(showtime, "u1").await,
        Err(BookingError::NoActiveHold)
    ));
}

// Confirmation consumes the hold and the seats become booked.
#[tokio::test]
async fn confirmation_clears_hold_and_books_seats() {
    let showtime = Uuid::new_v4();
    let store = MemStore::with_showtime(showtime);
    let engine = engine(&store);

    engine
        .hold_seats(showtime, "u1", &seats(&["B5", "B6"]))
        .await
        .unwrap();
    let booking = engine.confirm_booking(showtime, "u1").await.unwrap();
    assert_eq!(booking.seats, seats(&["B5", "B6"]));
    assert_eq!(booking.total_price_amount, 700);

    assert!(store.holds.lock().unwrap().is_empty());

    let view = engine.seat_availability(showtime, Some("u2")).await.unwrap();
    assert_eq!(view.booked, seats(&["B5", "B6"]));
    assert!(view.held.is_empty());
}

// Confirming again after the hold was consumed fails cleanly.
#[tokio::test]
async fn second_confirmation_fails_without_duplicate_booking() {
    let showtime = Uuid::new_v4();
    let store = MemStore::with_showtime(showtime);
    let engine = engine(&store);

    engine
        .hold_seats(showtime, "u1", &seats(&["D1"]))
        .await
        .unwrap();
    engine.confirm_booking(showtime, "u1").await.unwrap();

    assert!(matches!(
        engine.confirm_booking(showtime, "u1").await,
        Err(BookingError::NoActiveHold)
    ));
    assert_eq!(store.bookings.lock().unwrap().len(), 1);
}

// Even when two overlapping holds exist (an interleaving the hold
// manager normally prevents), at most one confirmation wins each seat.
#[tokio::test]
async fn overlapping_holds_cannot_both_confirm() {
    let showtime = Uuid::new_v4();
    let store = MemStore::with_showtime(showtime);
    let engine = engine(&store);
    let now = Utc::now();

    for user in ["u1", "u2"] {
        let hold = SeatHold::new(showtime, user, seats(&["E5"]), now, Duration::hours(2));
        store.upsert(&hold).await.unwrap();
    }

    engine.confirm_booking(showtime, "u1").await.unwrap();
    let err = engine.confirm_booking(showtime, "u2").await.unwrap_err();
    assert!(matches!(err, BookingError::SeatConflict(s) if s.to_string() == "E5"));

    // No seat appears twice across confirmed bookings.
    let mut seen = HashSet::new();
    for booking in store.bookings.lock().unwrap().iter() {
        for seat in &booking.seats {
            assert!(seen.insert(*seat), "seat {seat} double booked");
        }
    }
}

// The store-level uniqueness constraint is the last line of defense when
// the application-level re-check races.
#[tokio::test]
async fn seat_index_backstop_rejects_duplicate_write() {
    let showtime = Uuid::new_v4();
    let store = MemStore::with_showtime(showtime);
    let now = Utc::now();

    let first = Booking::confirmed(showtime, "u1", seats(&["F1", "F2"]), 700, now);
    store.create_confirmed(&first, Uuid::new_v4()).await.unwrap();

    let second = Booking::confirmed(showtime, "u2", seats(&["F3", "F2"]), 700, now);
    let err = store
        .create_confirmed(&second, Uuid::new_v4())
        .await
        .unwrap_err();
    assert!(matches!(err, ConfirmWriteError::DuplicateSeat(s) if s.to_string() == "F2"));
}

#[tokio::test]
async fn loyalty_credit_uses_active_rate_or_default() {
    let showtime = Uuid::new_v4();
    let store = MemStore::with_showtime(showtime);
    let engine = engine(&store);

    // No configured rate: default 0.01 on 700 earns 7 points.
    engine
        .hold_seats(showtime, "u1", &seats(&["A1", "A2"]))
        .await
        .unwrap();
    let booking = engine.confirm_booking(showtime, "u1").await.unwrap();
    {
        let credits = store.credits.lock().unwrap();
        assert_eq!(credits.len(), 1);
        assert_eq!(credits[0], ("u1".to_string(), 7, booking.id));
    }

    // Admin-configured rate overrides the default.
    *store.rate.lock().unwrap() = Some(0.1);
    engine
        .hold_seats(showtime, "u2", &seats(&["B1"]))
        .await
        .unwrap();
    engine.confirm_booking(showtime, "u2").await.unwrap();
    let credits = store.credits.lock().unwrap();
    assert_eq!(credits[1].1, 35);
}

#[tokio::test]
async fn loyalty_failure_never_fails_the_booking() {
    let showtime = Uuid::new_v4();
    let store = MemStore::with_showtime(showtime);
    let engine = engine(&store);
    store.fail_credit.store(true, Ordering::SeqCst);

    engine
        .hold_seats(showtime, "u1", &seats(&["G1"]))
        .await
        .unwrap();
    let booking = engine.confirm_booking(showtime, "u1").await.unwrap();
    assert_eq!(booking.total_price_amount, 350);
    assert_eq!(store.bookings.lock().unwrap().len(), 1);
    assert!(store.credits.lock().unwrap().is_empty());
}

// The end-to-end contention scenario from the product walkthrough.
#[tokio::test]
async fn contention_walkthrough() {
    let showtime = Uuid::new_v4();
    let store = MemStore::with_showtime(showtime);
    let engine = engine(&store);

    // U1 holds B5+B6.
    let (hold, outcome) = engine
        .hold_seats(showtime, "u1", &seats(&["B5", "B6"]))
        .await
        .unwrap();
    assert_eq!(outcome, HoldOutcome::Created);
    assert!(hold.expires_at > Utc::now() + Duration::minutes(119));

    // U2 collides on B6.
    let err = engine
        .hold_seats(showtime, "u2", &seats(&["B6", "B7"]))
        .await
        .unwrap_err();
    assert!(matches!(err, BookingError::SeatConflict(s) if s.to_string() == "B6"));

    // U1 confirms: 2 seats at 350.
    let booking = engine.confirm_booking(showtime, "u1").await.unwrap();
    assert_eq!(booking.total_price_amount, 700);

    // B6 stays blocked after booking, B7 alone works.
    let err = engine
        .hold_seats(showtime, "u2", &seats(&["B6", "B7"]))
        .await
        .unwrap_err();
    assert!(matches!(err, BookingError::SeatConflict(s) if s.to_string() == "B6"));
    engine
        .hold_seats(showtime, "u2", &seats(&["B7"]))
        .await
        .unwrap();

    let view = engine.seat_availability(showtime, None).await.unwrap();
    assert_eq!(view.booked, seats(&["B5", "B6"]));
    assert_eq!(view.held.len(), 1);
    assert_eq!(view.held[0].seat.to_string(), "B7");
}
