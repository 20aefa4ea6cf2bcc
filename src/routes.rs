use std::sync::Arc;

use axum::routing::{get, post, put};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health::health))
        .route(
            "/console/bookings/:id",
            get(handlers::bookings::get_booking),
        )
        .route(
            "/console/bookings/:id/confirm",
            post(handlers::bookings::confirm_booking),
        )
        .route(
            "/console/bookings/:id/cancel",
            post(handlers::bookings::cancel_booking),
        )
        .route(
            "/console/bookings/:id/checkin",
            post(handlers::bookings::check_in),
        )
        .route(
            "/console/bookings/:id/checkout",
            post(handlers::bookings::check_out),
        )
        .route(
            "/console/bookings/:id/status",
            put(handlers::bookings::override_status),
        )
        .route(
            "/console/bookings/:id/notes",
            put(handlers::bookings::save_notes),
        )
        .route(
            "/console/bookings/:id/staff",
            put(handlers::bookings::assign_staff),
        )
        .route("/console/staff", get(handlers::bookings::list_staff))
        .route(
            "/console/services/:sid/availability",
            get(handlers::availability::get_availability).post(handlers::availability::add_day),
        )
        .route(
            "/console/services/:sid/availability/batch",
            post(handlers::availability::add_range),
        )
        .route(
            "/console/services/:sid/availability/:aid",
            put(handlers::availability::update_slots),
        )
        .route("/console/events", get(handlers::events::notices_stream))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
