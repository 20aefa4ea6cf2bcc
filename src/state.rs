use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::config::AppConfig;
use crate::models::Staff;
use crate::services::backend::CampsiteApi;
use crate::services::notices::Notifier;
use crate::services::staff::StaffDirectory;

pub struct AppState {
    pub config: AppConfig,
    pub api: Arc<dyn CampsiteApi>,
    pub staff: Box<dyn StaffDirectory>,
    pub notifier: Notifier,
    /// Staff assignments made from this console, keyed by booking id.
    pub assignments: Mutex<HashMap<i64, Staff>>,
}

impl AppState {
    pub fn assigned_staff(&self, booking_id: i64) -> Option<Staff> {
        self.assignments
            .lock()
            .ok()
            .and_then(|a| a.get(&booking_id).cloned())
    }

    pub fn record_assignment(&self, booking_id: i64, staff: Staff) {
        match self.assignments.lock() {
            Ok(mut a) => {
                a.insert(booking_id, staff);
            }
            Err(e) => tracing::error!(booking_id, error = %e, "assignment map poisoned"),
        }
    }
}
