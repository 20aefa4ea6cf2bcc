use std::sync::Arc;

use async_trait::async_trait;

use crate::models::Staff;
use crate::services::backend::{ApiResult, CampsiteApi};

/// Source of staff members that can be assigned to a booking.
#[async_trait]
pub trait StaffDirectory: Send + Sync {
    async fn fetch_available_staff(&self) -> ApiResult<Vec<Staff>>;
}

/// Fixed roster, independent of backend state.
pub struct StaticStaffDirectory {
    staff: Vec<Staff>,
}

impl StaticStaffDirectory {
    pub fn new(staff: Vec<Staff>) -> Self {
        Self { staff }
    }
}

impl Default for StaticStaffDirectory {
    fn default() -> Self {
        let member = |id: i64, name: &str, role: &str, shift: &str| Staff {
            id,
            name: name.to_string(),
            role: Some(role.to_string()),
            shift: Some(shift.to_string()),
            available: true,
        };
        Self::new(vec![
            member(1, "Nguyễn Văn An", "Hướng dẫn viên", "Sáng"),
            member(2, "Trần Thị Bình", "Lễ tân", "Chiều"),
            member(3, "Lê Văn Cường", "Kỹ thuật", "Tối"),
        ])
    }
}

#[async_trait]
impl StaffDirectory for StaticStaffDirectory {
    async fn fetch_available_staff(&self) -> ApiResult<Vec<Staff>> {
        Ok(self.staff.clone())
    }
}

/// Roster served by the backend's staff endpoint.
pub struct BackendStaffDirectory {
    api: Arc<dyn CampsiteApi>,
}

impl BackendStaffDirectory {
    pub fn new(api: Arc<dyn CampsiteApi>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl StaffDirectory for BackendStaffDirectory {
    async fn fetch_available_staff(&self) -> ApiResult<Vec<Staff>> {
        let staff = self.api.fetch_staff().await?;
        Ok(staff.into_iter().filter(|s| s.available).collect())
    }
}
