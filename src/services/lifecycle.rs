use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::errors::GuardRefusal;
use crate::models::wire::local_datetime_opt;
use crate::models::{Booking, BookingStatus};
use crate::services::derive::resolve_check_in;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BookingAction {
    Confirm,
    Cancel,
    CheckIn,
    CheckOut,
}

impl BookingAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingAction::Confirm => "confirm",
            BookingAction::Cancel => "cancel",
            BookingAction::CheckIn => "check in",
            BookingAction::CheckOut => "check out",
        }
    }

    pub fn target(&self) -> BookingStatus {
        match self {
            BookingAction::Confirm => BookingStatus::Confirmed,
            BookingAction::Cancel => BookingStatus::Cancelled,
            BookingAction::CheckIn => BookingStatus::InProgress,
            BookingAction::CheckOut => BookingStatus::Completed,
        }
    }
}

impl std::fmt::Display for BookingAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A guarded action as the console offers it. Disabled actions are still
/// listed so the operator can see why they are unavailable.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ActionState {
    pub action: BookingAction,
    pub enabled: bool,
    #[serde(
        with = "local_datetime_opt",
        skip_serializing_if = "Option::is_none"
    )]
    pub opens_at: Option<NaiveDateTime>,
}

/// The transition table followed by the guarded actions. The manual status
/// override does not consult it.
pub fn can_transition(from: BookingStatus, to: BookingStatus) -> bool {
    use BookingStatus::*;
    matches!(
        (from, to),
        (Pending, Confirmed) | (Pending, Cancelled) | (Confirmed, InProgress) | (InProgress, Completed)
    )
}

pub fn offered_actions(status: BookingStatus) -> &'static [BookingAction] {
    match status {
        BookingStatus::Pending => &[BookingAction::Confirm, BookingAction::Cancel],
        BookingStatus::Confirmed => &[BookingAction::CheckIn],
        BookingStatus::InProgress => &[BookingAction::CheckOut],
        BookingStatus::Completed | BookingStatus::Cancelled => &[],
    }
}

/// Check-in opens at the resolved check-in time, in console-local time.
pub fn check_in_open(booking: &Booking, now_local: NaiveDateTime) -> bool {
    resolve_check_in(booking)
        .map(|opens_at| now_local >= opens_at)
        .unwrap_or(false)
}

pub fn action_states(booking: &Booking, now_local: NaiveDateTime) -> Vec<ActionState> {
    offered_actions(booking.status)
        .iter()
        .map(|&action| match action {
            BookingAction::CheckIn => ActionState {
                action,
                enabled: check_in_open(booking, now_local),
                opens_at: resolve_check_in(booking),
            },
            _ => ActionState {
                action,
                enabled: true,
                opens_at: None,
            },
        })
        .collect()
}

pub fn guard(
    booking: &Booking,
    action: BookingAction,
    now_local: NaiveDateTime,
) -> Result<(), GuardRefusal> {
    if !offered_actions(booking.status).contains(&action) {
        return Err(GuardRefusal::ActionNotOffered {
            action,
            status: booking.status,
        });
    }

    if action == BookingAction::CheckIn {
        match resolve_check_in(booking) {
            None => return Err(GuardRefusal::CheckInTimeUnknown),
            Some(opens_at) if now_local < opens_at => {
                return Err(GuardRefusal::CheckInTooEarly { opens_at })
            }
            Some(_) => {}
        }
    }

    Ok(())
}
