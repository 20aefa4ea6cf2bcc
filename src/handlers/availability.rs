use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::Json;
use chrono::Utc;

use super::check_auth;
use crate::errors::AppError;
use crate::models::{CreateDayRequest, CreateRangeRequest, UpdateSlotsRequest};
use crate::services::availability_editor::{AvailabilityEditor, AvailabilityView};
use crate::state::AppState;

async fn open_editor(state: &AppState, service_id: i64) -> Result<AvailabilityEditor, AppError> {
    let mut editor = AvailabilityEditor::new(state.api.clone(), service_id, state.notifier.clone());
    editor.load().await?;
    Ok(editor)
}

// GET /console/services/:sid/availability
pub async fn get_availability(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(service_id): Path<i64>,
) -> Result<Json<AvailabilityView>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;

    let mut editor = AvailabilityEditor::new(state.api.clone(), service_id, state.notifier.clone());
    // A failed fetch renders as the unavailable state, not as an error
    if let Err(e) = editor.load().await {
        tracing::warn!(service_id, error = %e, "availability shown as unavailable");
    }
    Ok(Json(editor.view_at(Utc::now())))
}

// PUT /console/services/:sid/availability/:aid
pub async fn update_slots(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path((service_id, availability_id)): Path<(i64, i64)>,
    Json(body): Json<UpdateSlotsRequest>,
) -> Result<Json<AvailabilityView>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;
    let mut editor = open_editor(&state, service_id).await?;
    let now = Utc::now();
    editor
        .update_total_slots_at(availability_id, body.total_slots, now)
        .await?;
    Ok(Json(editor.view_at(now)))
}

// POST /console/services/:sid/availability
pub async fn add_day(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(service_id): Path<i64>,
    Json(body): Json<CreateDayRequest>,
) -> Result<Json<AvailabilityView>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;
    let mut editor = open_editor(&state, service_id).await?;
    let now = Utc::now();
    editor.add_day_at(body.date, body.total_slots, now).await?;
    Ok(Json(editor.view_at(now)))
}

// POST /console/services/:sid/availability/batch
pub async fn add_range(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(service_id): Path<i64>,
    Json(body): Json<CreateRangeRequest>,
) -> Result<Json<AvailabilityView>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;
    let mut editor = open_editor(&state, service_id).await?;
    let now = Utc::now();
    editor
        .add_range_at(body.start_date, body.end_date, body.total_slots, now)
        .await?;
    Ok(Json(editor.view_at(now)))
}
