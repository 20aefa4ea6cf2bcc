use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chrono::{NaiveDate, NaiveDateTime};

use crate::models::BookingStatus;
use crate::services::backend::ApiError;
use crate::services::lifecycle::BookingAction;

/// An operator command refused locally, before any backend call.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GuardRefusal {
    #[error("cannot {action} a booking that is {status}")]
    ActionNotOffered {
        action: BookingAction,
        status: BookingStatus,
    },

    #[error("check-in opens at {}", .opens_at.format("%d/%m/%Y %H:%M"))]
    CheckInTooEarly { opens_at: NaiveDateTime },

    #[error("check-in time is unknown for this booking")]
    CheckInTimeUnknown,

    #[error("Ngày {date} đã được tạo!")]
    DuplicateDate { date: NaiveDate },

    #[error("date {date} is before today ({today})")]
    DateInPast { date: NaiveDate, today: NaiveDate },

    #[error("end date {end} is before start date {start}")]
    EndBeforeStart { start: NaiveDate, end: NaiveDate },

    #[error("invalid slot count: {0}")]
    InvalidSlots(i32),

    #[error("unknown staff member: {0}")]
    UnknownStaff(i64),

    #[error("{name} is not available")]
    StaffUnavailable { id: i64, name: String },
}

impl GuardRefusal {
    fn status_code(&self) -> StatusCode {
        match self {
            GuardRefusal::ActionNotOffered { .. }
            | GuardRefusal::CheckInTooEarly { .. }
            | GuardRefusal::CheckInTimeUnknown
            | GuardRefusal::DuplicateDate { .. }
            | GuardRefusal::StaffUnavailable { .. } => StatusCode::CONFLICT,
            GuardRefusal::DateInPast { .. }
            | GuardRefusal::EndBeforeStart { .. }
            | GuardRefusal::InvalidSlots(_)
            | GuardRefusal::UnknownStaff(_) => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("backend error: {0}")]
    Backend(#[from] ApiError),

    #[error("{0}")]
    Refused(#[from] GuardRefusal),

    #[error("not loaded: {0}")]
    NotLoaded(String),

    #[error("unauthorized")]
    Unauthorized,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Backend(e) if e.is_not_found() => StatusCode::NOT_FOUND,
            AppError::Backend(_) => StatusCode::BAD_GATEWAY,
            AppError::Refused(r) => r.status_code(),
            AppError::NotLoaded(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
        };

        let body = serde_json::json!({ "error": self.to_string() });
        (status, axum::Json(body)).into_response()
    }
}
