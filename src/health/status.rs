//! Condition → HTTP status mapping.
//!
//! | Condition   | Status |
//! |-------------|--------|
//! | healthy     | 200    |
//! | degraded    | 200    |
//! | unhealthy   | 503    |
//!
//! A degraded service still accepts traffic, so load balancers keep it in
//! rotation.

use axum::http::StatusCode;

use crate::health::Condition;

/// Map an aggregate condition to the transport status code.
pub fn map_status(condition: Condition) -> StatusCode {
    match condition {
        Condition::Healthy | Condition::Degraded => StatusCode::OK,
        Condition::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    }
}
