use axum::{
    extract::{Path, State},
    http::HeaderMap,
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use marquee_domain::SeatId;

use crate::error::AppError;
use crate::middleware::bearer_claims;
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SeatMapResponse {
    rows: u8,
    columns: u8,
    booked_seats: Vec<SeatId>,
    held_seats: Vec<HeldSeatResponse>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct HeldSeatResponse {
    seat_id: SeatId,
    expires_at: DateTime<Utc>,
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/showtimes/{id}/seats", get(showtime_seats))
}

/// Availability snapshot for a showtime. The token is optional here; when
/// one is supplied, that user's own held seats are not reported as held.
async fn showtime_seats(
    State(state): State<AppState>,
    Path(showtime_id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<Json<SeatMapResponse>, AppError> {
    let viewer = bearer_claims(&headers, &state.auth.secret).map(|c| c.sub);

    let view = state
        .engine
        .seat_availability(showtime_id, viewer.as_deref())
        .await?;

    Ok(Json(SeatMapResponse {
        rows: view.grid.rows,
        columns: view.grid.columns,
        booked_seats: view.booked,
        held_seats: view
            .held
            .into_iter()
            .map(|h| HeldSeatResponse {
                seat_id: h.seat,
                expires_at: h.expires_at,
            })
            .collect(),
    }))
}
