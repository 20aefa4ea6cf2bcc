use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::Json;
use chrono::{Duration, Utc};
use serde::Deserialize;

use super::check_auth;
use crate::errors::AppError;
use crate::models::{BookingStatus, Staff};
use crate::services::booking_detail::{BookingDetail, BookingView};
use crate::state::AppState;

async fn open_detail(state: &AppState, booking_id: i64) -> Result<BookingDetail, AppError> {
    let mut detail = BookingDetail::new(state.api.clone(), booking_id, state.notifier.clone())
        .with_banner_ttl(Duration::seconds(state.config.notice_ttl_secs))
        .with_assigned_staff(state.assigned_staff(booking_id));
    detail.load().await?;
    detail.load_related().await;
    Ok(detail)
}

// GET /console/bookings/:id
pub async fn get_booking(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<Json<BookingView>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;
    let detail = open_detail(&state, id).await?;
    Ok(Json(detail.view_at(Utc::now())?))
}

// POST /console/bookings/:id/confirm
pub async fn confirm_booking(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<Json<BookingView>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;
    let mut detail = open_detail(&state, id).await?;
    let now = Utc::now();
    detail.confirm_at(now).await?;
    Ok(Json(detail.view_at(now)?))
}

// POST /console/bookings/:id/cancel
pub async fn cancel_booking(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<Json<BookingView>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;
    let mut detail = open_detail(&state, id).await?;
    let now = Utc::now();
    detail.cancel_at(now).await?;
    Ok(Json(detail.view_at(now)?))
}

// POST /console/bookings/:id/checkin
pub async fn check_in(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<Json<BookingView>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;
    let mut detail = open_detail(&state, id).await?;
    let now = Utc::now();
    detail.check_in_at(now).await?;
    Ok(Json(detail.view_at(now)?))
}

// POST /console/bookings/:id/checkout
pub async fn check_out(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<Json<BookingView>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;
    let mut detail = open_detail(&state, id).await?;
    let now = Utc::now();
    detail.check_out_at(now).await?;
    Ok(Json(detail.view_at(now)?))
}

// PUT /console/bookings/:id/status
#[derive(Deserialize)]
pub struct StatusRequest {
    pub status: BookingStatus,
}

pub async fn override_status(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(body): Json<StatusRequest>,
) -> Result<Json<BookingView>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;
    let mut detail = open_detail(&state, id).await?;
    let now = Utc::now();
    detail.change_status_at(body.status, now).await?;
    Ok(Json(detail.view_at(now)?))
}

// PUT /console/bookings/:id/notes (text/plain)
pub async fn save_notes(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    notes: String,
) -> Result<Json<BookingView>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;
    let mut detail = open_detail(&state, id).await?;
    let now = Utc::now();
    detail.set_notes_draft(notes);
    detail.save_notes_at(now).await?;
    Ok(Json(detail.view_at(now)?))
}

// PUT /console/bookings/:id/staff
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignStaffRequest {
    pub staff_id: i64,
}

pub async fn assign_staff(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(body): Json<AssignStaffRequest>,
) -> Result<Json<BookingView>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;
    let mut detail = open_detail(&state, id).await?;
    let now = Utc::now();
    let staff = detail
        .assign_staff_at(state.staff.as_ref(), body.staff_id, now)
        .await?
        .clone();
    state.record_assignment(id, staff);
    Ok(Json(detail.view_at(now)?))
}

// GET /console/staff
pub async fn list_staff(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<Staff>>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;
    let staff = state.staff.fetch_available_staff().await?;
    Ok(Json(staff))
}
