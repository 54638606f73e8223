use crate::bookings::BookingError;
use crate::state;
use crate::types::booking::{Booking, BookingId};

use axum::Json;
use axum::body::Body;
use axum::body::Bytes;
use axum::extract::Query;
use axum::extract::State;
use axum::http::Method;
use axum::http::StatusCode;
use axum::http::header::CONNECTION;
use axum::response::IntoResponse;
use axum::response::Response;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use tracing::{error, warn};

pub(crate) const MAX_BODY_BYTES: usize = 1_000_000;

#[derive(Serialize)]
pub(crate) struct BookResponse {
    pub(crate) success: bool,
    pub(crate) id: BookingId,
}

#[derive(Serialize)]
pub(crate) struct DeleteResponse {
    pub(crate) success: bool,
}

#[derive(Serialize)]
pub(crate) struct ErrorResponse {
    pub(crate) error: &'static str,
}

pub(crate) async fn book(
    State(state): State<state::AppState>,
    body: Body,
) -> Result<Json<BookResponse>, Response> {
    let bytes = read_capped_body(body).await?;
    let input: Value = serde_json::from_slice(&bytes)
        .map_err(|_| booking_error_response(BookingError::InvalidPayload))?;
    let (id, _) = state
        .bookings
        .create(input)
        .await
        .map_err(booking_error_response)?;

    Ok(Json(BookResponse { success: true, id }))
}

pub(crate) async fn list_bookings(
    State(state): State<state::AppState>,
) -> Result<Json<Vec<Booking>>, Response> {
    let bookings = state
        .bookings
        .list()
        .await
        .map_err(booking_error_response)?;
    Ok(Json(bookings))
}

pub(crate) async fn delete_booking(
    State(state): State<state::AppState>,
    method: Method,
    Query(query): Query<HashMap<String, String>>,
    body: Body,
) -> Result<Json<DeleteResponse>, Response> {
    let mut id = query.get("id").and_then(|raw| parse_id(raw));
    if method == Method::POST {
        let bytes = read_capped_body(body).await?;
        if let Some(from_body) = id_from_body(&bytes) {
            id = Some(from_body);
        }
    }

    state
        .bookings
        .delete(id)
        .await
        .map_err(booking_error_response)?;
    Ok(Json(DeleteResponse { success: true }))
}

/// Reads at most `MAX_BODY_BYTES`. Anything larger gets a bare 413 with the
/// connection marked for closing; the rest of the body is never read.
async fn read_capped_body(body: Body) -> Result<Bytes, Response> {
    axum::body::to_bytes(body, MAX_BODY_BYTES)
        .await
        .map_err(|err| {
            warn!(error = %err, limit = MAX_BODY_BYTES, "dropping request body");
            (StatusCode::PAYLOAD_TOO_LARGE, [(CONNECTION, "close")]).into_response()
        })
}

fn parse_id(raw: &str) -> Option<BookingId> {
    raw.trim().parse().ok()
}

/// A malformed body or an unusable `id` yields `None`, leaving the query
/// parameter in charge.
fn id_from_body(bytes: &[u8]) -> Option<BookingId> {
    let body: Value = serde_json::from_slice(bytes).ok()?;
    match body.get("id")? {
        Value::Number(number) => number.as_i64(),
        Value::String(raw) => parse_id(raw),
        _ => None,
    }
}

fn booking_error_response(err: BookingError) -> Response {
    let (status, message) = match err {
        BookingError::InvalidPayload => (StatusCode::BAD_REQUEST, "invalid payload"),
        BookingError::MissingId => (StatusCode::BAD_REQUEST, "id not specified"),
        BookingError::NotFound => (StatusCode::NOT_FOUND, "record not found"),
        BookingError::Storage(_)
        | BookingError::Timestamp(_)
        | BookingError::IdsExhausted(_) => {
            error!(error = %err, "booking operation failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "internal error")
        }
    };
    (status, Json(ErrorResponse { error: message })).into_response()
}

#[cfg(test)]
#[allow(non_snake_case)]
mod tests {
    use super::*;

    #[test]
    fn parse_id__should_accept_integers_only() {
        // Then
        assert_eq!(parse_id("1736674200123"), Some(1_736_674_200_123));
        assert_eq!(parse_id(" 42 "), Some(42));
        assert_eq!(parse_id(""), None);
        assert_eq!(parse_id("abc"), None);
        assert_eq!(parse_id("1.5"), None);
    }

    #[test]
    fn id_from_body__should_read_numeric_and_string_ids() {
        // Then
        assert_eq!(id_from_body(br#"{"id": 7}"#), Some(7));
        assert_eq!(id_from_body(br#"{"id": "8"}"#), Some(8));
    }

    #[test]
    fn id_from_body__should_ignore_unusable_bodies() {
        // Then
        assert_eq!(id_from_body(b""), None);
        assert_eq!(id_from_body(b"{not json"), None);
        assert_eq!(id_from_body(br#"{"name": "Ana"}"#), None);
        assert_eq!(id_from_body(br#"{"id": null}"#), None);
        assert_eq!(id_from_body(br#"{"id": "x"}"#), None);
        assert_eq!(id_from_body(b"[7]"), None);
    }
}
