use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Capacity of one service on one calendar date.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityRecord {
    pub id: i64,
    pub date: NaiveDate,
    pub total_slots: i32,
    #[serde(default)]
    pub booked_slots: i32,
}

impl AvailabilityRecord {
    pub fn is_full(&self) -> bool {
        self.booked_slots >= self.total_slots
    }

    pub fn remaining_slots(&self) -> i32 {
        (self.total_slots - self.booked_slots).max(0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSlotsRequest {
    pub total_slots: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CreateDayRequest {
    pub date: NaiveDate,
    pub total_slots: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CreateRangeRequest {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub total_slots: i32,
}

impl CreateRangeRequest {
    pub fn day_count(&self) -> i64 {
        (self.end_date - self.start_date).num_days() + 1
    }
}

pub fn sort_by_date(records: &mut [AvailabilityRecord]) {
    records.sort_by_key(|r| r.date);
}
