use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

use marquee_domain::{Booking, BookingStatus, SeatGrid, SeatHold, SeatId};

/// A seat temporarily claimed by some other user, with the instant the
/// claim lapses.
#[derive(Debug, Clone, Serialize)]
pub struct HeldSeat {
    pub seat: SeatId,
    pub expires_at: DateTime<Utc>,
}

/// Point-in-time three-way partition of a showtime's seats. Anything not
/// listed as booked or held is free. Computed fresh per request, never
/// cached.
#[derive(Debug, Clone, Serialize)]
pub struct SeatAvailability {
    pub grid: SeatGrid,
    pub booked: Vec<SeatId>,
    pub held: Vec<HeldSeat>,
}

impl SeatAvailability {
    pub fn is_taken(&self, seat: &SeatId) -> bool {
        self.booked.contains(seat) || self.held.iter().any(|h| h.seat == *seat)
    }
}

/// Combine a confirmed-bookings snapshot and a holds snapshot into the
/// availability view, as seen by `viewer` at `now`.
///
/// Booked is authoritative: a seat in a confirmed booking is never also
/// reported held, even if a stale hold still claims it. Expired holds are
/// ignored, and the viewer's own hold is not "held by others". Output
/// ordering is deterministic (row then column).
pub fn partition(
    grid: SeatGrid,
    bookings: &[Booking],
    holds: &[SeatHold],
    viewer: Option<&str>,
    now: DateTime<Utc>,
) -> SeatAvailability {
    let booked: BTreeSet<SeatId> = bookings
        .iter()
        .filter(|b| b.status == BookingStatus::Confirmed)
        .flat_map(|b| b.seats.iter().copied())
        .collect();

    let mut held: BTreeMap<SeatId, DateTime<Utc>> = BTreeMap::new();
    for hold in holds {
        if !hold.is_active(now) {
            continue;
        }
        if viewer.is_some_and(|u| u == hold.user_id) {
            continue;
        }
        for seat in &hold.seats {
            if booked.contains(seat) {
                continue;
            }
            // Two active holds on one seat would mean an upstream bug;
            // report the earliest expiry if it ever happens.
            held.entry(*seat)
                .and_modify(|at| {
                    if hold.expires_at < *at {
                        *at = hold.expires_at;
                    }
                })
                .or_insert(hold.expires_at);
        }
    }

    SeatAvailability {
        grid,
        booked: booked.into_iter().collect(),
        held: held
            .into_iter()
            .map(|(seat, expires_at)| HeldSeat { seat, expires_at })
            .collect(),
    }
}
