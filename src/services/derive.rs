//! Display values derived from a booking.
//!
//! The backend does not always fill the booking-level stay fields, so each one
//! is resolved in a fixed order: the booking's own field, then the first
//! service line's field, then [`PLACEHOLDER`].

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::models::wire::local_datetime_opt;
use crate::models::{Booking, BookingStatus};

pub const PLACEHOLDER: &str = "N/A";

const DISPLAY_FORMAT: &str = "%d/%m/%Y %H:%M";
const SECONDS_PER_DAY: f64 = 86_400.0;

pub fn resolve_check_in(booking: &Booking) -> Option<NaiveDateTime> {
    booking
        .check_in_date
        .or_else(|| booking.first_service().and_then(|s| s.check_in_date))
}

pub fn resolve_check_out(booking: &Booking) -> Option<NaiveDateTime> {
    booking
        .check_out_date
        .or_else(|| booking.first_service().and_then(|s| s.check_out_date))
}

pub fn resolve_location(booking: &Booking) -> Option<&str> {
    non_empty(booking.location.as_deref()).or_else(|| {
        booking
            .first_service()
            .and_then(|s| non_empty(s.location.as_deref()))
    })
}

/// Whole days between resolved check-in and check-out, rounded up.
pub fn duration_days(booking: &Booking) -> Option<i64> {
    let check_in = resolve_check_in(booking)?;
    let check_out = resolve_check_out(booking)?;
    let seconds = (check_out - check_in).num_seconds() as f64;
    Some((seconds / SECONDS_PER_DAY).ceil() as i64)
}

pub fn format_datetime(value: Option<NaiveDateTime>) -> String {
    value
        .map(|dt| dt.format(DISPLAY_FORMAT).to_string())
        .unwrap_or_else(|| PLACEHOLDER.to_string())
}

pub fn display_duration(booking: &Booking) -> String {
    match duration_days(booking) {
        Some(days) => format!("{days} ngày"),
        None => PLACEHOLDER.to_string(),
    }
}

fn non_empty(s: Option<&str>) -> Option<&str> {
    s.map(str::trim).filter(|s| !s.is_empty())
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BookingSummary {
    pub check_in: String,
    pub check_out: String,
    pub duration: String,
    pub location: String,
    pub total_amount: Option<f64>,
    pub payment_method: String,
    pub payment_status: String,
    pub paid_at: String,
    pub item_count: usize,
    pub head_count: i32,
}

pub fn summarize(booking: &Booking) -> BookingSummary {
    let payment = booking.payment.as_ref();
    BookingSummary {
        check_in: format_datetime(resolve_check_in(booking)),
        check_out: format_datetime(resolve_check_out(booking)),
        duration: display_duration(booking),
        location: resolve_location(booking).unwrap_or(PLACEHOLDER).to_string(),
        total_amount: booking.total_amount,
        payment_method: payment
            .and_then(|p| non_empty(p.method.as_deref()))
            .unwrap_or(PLACEHOLDER)
            .to_string(),
        payment_status: payment
            .and_then(|p| non_empty(p.status.as_deref()))
            .unwrap_or(PLACEHOLDER)
            .to_string(),
        paid_at: format_datetime(payment.and_then(|p| p.created_at)),
        item_count: booking.items().count(),
        head_count: booking.head_count(),
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TimelineEntry {
    pub label: String,
    #[serde(with = "local_datetime_opt")]
    pub at: Option<NaiveDateTime>,
    pub reached: bool,
    pub description: Option<String>,
}

impl TimelineEntry {
    fn milestone(label: &str, at: Option<NaiveDateTime>, reached: bool) -> Self {
        Self {
            label: label.to_string(),
            at,
            reached,
            description: None,
        }
    }
}

/// Lifecycle milestones in their fixed order, merged with the backend's own
/// status events by time. Milestones without a time keep their place.
pub fn build_timeline(booking: &Booking) -> Vec<TimelineEntry> {
    let status = booking.status;
    let mut entries = vec![TimelineEntry::milestone(
        "Đặt chỗ",
        booking.booking_date,
        true,
    )];

    let paid_at = booking.payment.as_ref().and_then(|p| p.created_at);
    entries.push(TimelineEntry::milestone(
        "Thanh toán",
        paid_at,
        booking.payment.is_some(),
    ));

    if status == BookingStatus::Cancelled {
        entries.push(TimelineEntry::milestone("Đã hủy", None, true));
    } else {
        entries.push(TimelineEntry::milestone(
            "Xác nhận",
            None,
            status != BookingStatus::Pending,
        ));
        entries.push(TimelineEntry::milestone(
            "Nhận chỗ",
            resolve_check_in(booking),
            matches!(status, BookingStatus::InProgress | BookingStatus::Completed),
        ));
        entries.push(TimelineEntry::milestone(
            "Trả chỗ",
            resolve_check_out(booking),
            status == BookingStatus::Completed,
        ));
    }

    let mut events: Vec<TimelineEntry> = booking
        .timeline
        .iter()
        .map(|e| TimelineEntry {
            label: e.label.clone(),
            at: e.at,
            reached: true,
            description: e.description.clone(),
        })
        .collect();
    // Undated events sort last
    events.sort_by_key(|e| (e.at.is_none(), e.at));
    let mut events = events.into_iter().peekable();

    let mut merged = Vec::with_capacity(entries.len() + events.len());
    for milestone in entries {
        if let Some(at) = milestone.at {
            while let Some(event) = events.next_if(|e| matches!(e.at, Some(t) if t < at)) {
                merged.push(event);
            }
        }
        merged.push(milestone);
    }
    merged.extend(events);

    merged
}
