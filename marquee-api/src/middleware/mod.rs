pub mod auth;

pub use auth::{bearer_claims, customer_auth_middleware, Claims};
