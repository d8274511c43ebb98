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

use marquee_booking::HoldOutcome;
use marquee_domain::SeatId;

use crate::error::AppError;
use crate::middleware::Claims;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HoldSeatsRequest {
    showtime_id: Uuid,
    seats: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct HoldResponse {
    id: Uuid,
    showtime_id: Uuid,
    seats: Vec<SeatId>,
    expires_at: DateTime<Utc>,
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/holds", post(hold_seats))
}

/// Claim seats for the authenticated user. 201 for a fresh hold, 200 when
/// the request merged into an existing one.
async fn hold_seats(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    body: Result<Json<HoldSeatsRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(req) = body.map_err(|e| AppError::BadRequest(e.body_text()))?;

    let mut seats = Vec::with_capacity(req.seats.len());
    for raw in &req.seats {
        let seat: SeatId = raw
            .parse()
            .map_err(|_| AppError::BadRequest(format!("invalid seat id: {raw}")))?;
        seats.push(seat);
    }

    let (hold, outcome) = state
        .engine
        .hold_seats(req.showtime_id, &claims.sub, &seats)
        .await?;

    let status = match outcome {
        HoldOutcome::Created => StatusCode::CREATED,
        HoldOutcome::Extended => StatusCode::OK,
    };

    Ok((
        status,
        Json(HoldResponse {
            id: hold.id,
            showtime_id: hold.showtime_id,
            seats: hold.seats,
            expires_at: hold.expires_at,
        }),
    ))
}
