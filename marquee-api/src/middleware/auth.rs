use axum::{
    extract::{Request, State},
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use crate::state::AppState;

/// Customer token claims; `sub` is the user id the booking core keys holds
/// and bookings on. Token issuance lives in the out-of-scope accounts
/// service.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
}

pub async fn customer_auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let claims =
        bearer_claims(req.headers(), &state.auth.secret).ok_or(StatusCode::UNAUTHORIZED)?;

    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}

/// Decode the bearer token when one is present. Used directly by routes
/// where authentication is optional.
pub fn bearer_claims(headers: &HeaderMap, secret: &str) -> Option<Claims> {
    let auth_header = headers.get("Authorization").and_then(|h| h.to_str().ok())?;
    let token = auth_header.strip_prefix("Bearer ")?;

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .ok()
    .map(|data| data.claims)
}
