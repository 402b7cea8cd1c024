//! Response rendering.
//!
//! # Design Decisions
//! - Status code comes from `map_status`, never from the handler
//! - Body is the serialized `AggregateResponse`
//! - Health responses must not be cached by intermediaries

use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::health::AggregateResponse;

impl IntoResponse for AggregateResponse {
    fn into_response(self) -> Response {
        let status = self.status_code();
        (
            status,
            [(header::CACHE_CONTROL, "no-store")],
            Json(self),
        )
            .into_response()
    }
}
