use crate::adapters::SystemClock;
use crate::bookings::BookingService;
use crate::config;
use crate::state;
use crate::store::Store;

use axum::Router;
use axum::routing::get;
use axum::routing::post;
use std::sync::Arc;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

mod bookings;
mod static_files;

pub fn app(config: config::AppConfig) -> Router {
    let bookings = BookingService::new(Store::in_root(&config.root), Arc::new(SystemClock));
    let state = state::AppState {
        config,
        bookings: Arc::new(bookings),
    };

    // Unsupported methods on API paths fall through to static files like any
    // other unknown path instead of answering 405.
    Router::new()
        .route(
            "/api/book",
            post(bookings::book).fallback(static_files::static_asset),
        )
        .route(
            "/api/bookings",
            get(bookings::list_bookings).fallback(static_files::static_asset),
        )
        .route(
            "/api/delete",
            get(bookings::delete_booking)
                .post(bookings::delete_booking)
                .fallback(static_files::static_asset),
        )
        .fallback(static_files::static_asset)
        .with_state(state)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
}
