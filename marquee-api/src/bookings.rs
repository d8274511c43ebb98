use axum::{
    extract::rejection::JsonRejection,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::post,
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use marquee_domain::{Booking, BookingStatus, SeatId};

use crate::error::AppError;
use crate::middleware::Claims;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfirmBookingRequest {
    showtime_id: Uuid,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BookingResponse {
    id: Uuid,
    showtime_id: Uuid,
    seats: Vec<SeatId>,
    total_price: i64,
    status: BookingStatus,
    created_at: DateTime<Utc>,
}

impl From<Booking> for BookingResponse {
    fn from(b: Booking) -> Self {
        BookingResponse {
            id: b.id,
            showtime_id: b.showtime_id,
            seats: b.seats,
            total_price: b.total_price_amount,
            status: b.status,
            created_at: b.created_at,
        }
    }
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/confirm", post(confirm_booking))
}

/// Convert the caller's active hold into a confirmed booking.
async fn confirm_booking(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    body: Result<Json<ConfirmBookingRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(req) = body.map_err(|e| AppError::BadRequest(e.body_text()))?;

    let booking = state
        .engine
        .confirm_booking(req.showtime_id, &claims.sub)
        .await?;

    Ok((StatusCode::CREATED, Json(BookingResponse::from(booking))))
}
