//! Booking detail controller.
//!
//! Holds one booking plus the operator-side state around it (notes draft,
//! staff assignment, banner) and exposes each operator action as a command.
//! Every successful mutation is followed by a full refetch of the booking;
//! local state is never patched speculatively, except for the server-echoed
//! status after a status update.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::errors::{AppError, GuardRefusal};
use crate::models::wire::to_console_local;
use crate::models::{Booking, BookingItem, BookingStatus, Customer, Notice, NoticeLevel, Staff};
use crate::services::backend::{ApiError, CampsiteApi};
use crate::services::derive::{self, BookingSummary, TimelineEntry};
use crate::services::lifecycle::{self, ActionState, BookingAction};
use crate::services::notices::Notifier;
use crate::services::staff::StaffDirectory;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemView {
    #[serde(flatten)]
    pub item: BookingItem,
    pub line_total: f64,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingView {
    pub booking: Booking,
    pub customer: Option<Customer>,
    pub summary: BookingSummary,
    pub actions: Vec<ActionState>,
    pub status_options: Vec<BookingStatus>,
    pub timeline: Vec<TimelineEntry>,
    pub items: Vec<ItemView>,
    pub assigned_staff: Option<Staff>,
    pub notes_draft: String,
    pub banner: Option<Notice>,
}

pub struct BookingDetail {
    api: Arc<dyn CampsiteApi>,
    notifier: Notifier,
    booking_id: i64,
    booking: Option<Booking>,
    customer: Option<Customer>,
    service_images: HashMap<i64, String>,
    assigned_staff: Option<Staff>,
    notes_draft: Option<String>,
    banner: Option<Notice>,
    banner_ttl: Duration,
}

impl BookingDetail {
    pub fn new(api: Arc<dyn CampsiteApi>, booking_id: i64, notifier: Notifier) -> Self {
        Self {
            api,
            notifier,
            booking_id,
            booking: None,
            customer: None,
            service_images: HashMap::new(),
            assigned_staff: None,
            notes_draft: None,
            banner: None,
            banner_ttl: Duration::seconds(3),
        }
    }

    pub fn with_banner_ttl(mut self, ttl: Duration) -> Self {
        self.banner_ttl = ttl;
        self
    }

    pub fn with_assigned_staff(mut self, staff: Option<Staff>) -> Self {
        self.assigned_staff = staff;
        self
    }

    pub fn booking_id(&self) -> i64 {
        self.booking_id
    }

    pub fn booking(&self) -> Option<&Booking> {
        self.booking.as_ref()
    }

    pub fn assigned_staff(&self) -> Option<&Staff> {
        self.assigned_staff.as_ref()
    }

    pub fn notes_draft(&self) -> &str {
        self.notes_draft.as_deref().unwrap_or("")
    }

    pub fn set_notes_draft(&mut self, text: impl Into<String>) {
        self.notes_draft = Some(text.into());
    }

    pub fn banner_at(&self, now: DateTime<Utc>) -> Option<&Notice> {
        self.banner.as_ref().filter(|b| b.is_visible_at(now))
    }

    fn loaded(&self) -> Result<&Booking, AppError> {
        self.booking
            .as_ref()
            .ok_or_else(|| AppError::NotLoaded(format!("booking {}", self.booking_id)))
    }

    /// Fetches the booking. The notes draft is seeded from the first load only.
    pub async fn load(&mut self) -> Result<&Booking, AppError> {
        let booking = self.api.fetch_booking(self.booking_id).await?;
        tracing::debug!(booking_id = self.booking_id, status = %booking.status, "booking loaded");

        if self.notes_draft.is_none() {
            self.notes_draft = Some(booking.internal_notes.clone().unwrap_or_default());
        }
        Ok(&*self.booking.insert(booking))
    }

    /// Fetches the customer and the image of every service line. Failures are
    /// logged and leave the decoration empty.
    pub async fn load_related(&mut self) {
        let Some(booking) = self.booking.as_ref() else {
            return;
        };
        let customer_id = booking.customer_id;
        let mut service_ids: Vec<i64> = booking.services.iter().filter_map(|s| s.service_id).collect();
        service_ids.sort_unstable();
        service_ids.dedup();

        if let Some(customer_id) = customer_id {
            match self.api.fetch_customer(customer_id).await {
                Ok(customer) => self.customer = Some(customer),
                Err(e) => {
                    tracing::warn!(booking_id = self.booking_id, customer_id, error = %e, "failed to load customer")
                }
            }
        }

        for service_id in service_ids {
            if self.service_images.contains_key(&service_id) {
                continue;
            }
            match self.api.fetch_service(service_id).await {
                Ok(service) => {
                    if let Some(url) = service.image_url {
                        self.service_images.insert(service_id, url);
                    }
                }
                Err(e) => {
                    tracing::warn!(booking_id = self.booking_id, service_id, error = %e, "failed to load service")
                }
            }
        }
    }

    fn alert_failure(&self, what: &str, error: &ApiError, now: DateTime<Utc>) {
        tracing::error!(booking_id = self.booking_id, error = %error, "{what} failed");
        self.notifier.publish(
            Notice::alert(NoticeLevel::Error, format!("{what} thất bại: {error}"), now)
                .for_booking(self.booking_id),
        );
    }

    fn announce(&self, message: String, now: DateTime<Utc>) {
        self.notifier.publish(
            Notice::banner(NoticeLevel::Success, message, now, self.banner_ttl)
                .for_booking(self.booking_id),
        );
    }

    /// Manual status override. Any target is accepted; the backend decides.
    pub async fn change_status_at(
        &mut self,
        status: BookingStatus,
        now: DateTime<Utc>,
    ) -> Result<BookingStatus, AppError> {
        let current = self.loaded()?.status;
        if !lifecycle::can_transition(current, status) {
            tracing::warn!(
                booking_id = self.booking_id,
                from = %current,
                to = %status,
                "status override outside the transition table"
            );
        }
        self.apply_status(status, now).await
    }

    async fn apply_status(
        &mut self,
        status: BookingStatus,
        now: DateTime<Utc>,
    ) -> Result<BookingStatus, AppError> {
        let confirmed = match self.api.update_status(self.booking_id, status).await {
            Ok(echoed) => echoed.unwrap_or(status),
            Err(e) => {
                self.alert_failure("Cập nhật trạng thái", &e, now);
                return Err(e.into());
            }
        };

        if let Some(booking) = self.booking.as_mut() {
            booking.status = confirmed;
        }
        tracing::info!(booking_id = self.booking_id, status = %confirmed, "booking status updated");
        self.announce(format!("Đã cập nhật trạng thái: {confirmed}"), now);
        Ok(confirmed)
    }

    async fn guarded_status(
        &mut self,
        action: BookingAction,
        now: DateTime<Utc>,
    ) -> Result<BookingStatus, AppError> {
        lifecycle::guard(self.loaded()?, action, to_console_local(now))?;
        self.apply_status(action.target(), now).await
    }

    pub async fn confirm_at(&mut self, now: DateTime<Utc>) -> Result<BookingStatus, AppError> {
        self.guarded_status(BookingAction::Confirm, now).await
    }

    pub async fn cancel_at(&mut self, now: DateTime<Utc>) -> Result<BookingStatus, AppError> {
        self.guarded_status(BookingAction::Cancel, now).await
    }

    pub async fn check_in_at(&mut self, now: DateTime<Utc>) -> Result<&Booking, AppError> {
        lifecycle::guard(self.loaded()?, BookingAction::CheckIn, to_console_local(now))?;

        if let Err(e) = self.api.check_in(self.booking_id).await {
            self.alert_failure("Check-in", &e, now);
            return Err(e.into());
        }
        tracing::info!(booking_id = self.booking_id, "booking checked in");
        self.announce("Check-in thành công".to_string(), now);
        self.reload_after("Check-in", now).await;
        self.loaded()
    }

    pub async fn check_out_at(&mut self, now: DateTime<Utc>) -> Result<&Booking, AppError> {
        lifecycle::guard(self.loaded()?, BookingAction::CheckOut, to_console_local(now))?;

        if let Err(e) = self.api.check_out(self.booking_id).await {
            self.alert_failure("Check-out", &e, now);
            return Err(e.into());
        }
        tracing::info!(booking_id = self.booking_id, "booking checked out");
        self.announce("Check-out thành công".to_string(), now);
        self.reload_after("Check-out", now).await;
        self.loaded()
    }

    /// Refetches after a mutation the backend already accepted. A failure here
    /// leaves the stale copy in place and raises its own alert; the mutation
    /// still counts as done.
    async fn reload_after(&mut self, what: &str, now: DateTime<Utc>) {
        if let Err(e) = self.load().await {
            tracing::error!(booking_id = self.booking_id, error = %e, "reload after {what} failed");
            self.notifier.publish(
                Notice::alert(
                    NoticeLevel::Error,
                    format!("{what} đã thực hiện nhưng tải lại thất bại: {e}"),
                    now,
                )
                .for_booking(self.booking_id),
            );
        }
    }

    /// Saves the current notes draft as plain text. The outcome of the PUT is
    /// shown as a banner that expires after the configured lifetime; the
    /// refetch that follows does not change it.
    pub async fn save_notes_at(&mut self, now: DateTime<Utc>) -> Result<(), AppError> {
        self.loaded()?;
        let text = self.notes_draft().to_string();

        if let Err(e) = self.api.update_internal_notes(self.booking_id, &text).await {
            let e = AppError::from(e);
            tracing::error!(booking_id = self.booking_id, error = %e, "failed to save internal notes");
            self.set_banner(NoticeLevel::Error, format!("Lưu ghi chú thất bại: {e}"), now);
            return Err(e);
        }

        self.notes_draft = Some(String::new());
        self.set_banner(NoticeLevel::Success, "Đã lưu ghi chú nội bộ".to_string(), now);
        tracing::info!(booking_id = self.booking_id, "internal notes saved");
        self.reload_after("Lưu ghi chú", now).await;
        Ok(())
    }

    fn set_banner(&mut self, level: NoticeLevel, message: String, now: DateTime<Utc>) {
        let banner = Notice::banner(level, message, now, self.banner_ttl).for_booking(self.booking_id);
        self.notifier.publish(banner.clone());
        self.banner = Some(banner);
    }

    /// Assigns a staff member from the directory. The assignment lives in
    /// console memory only.
    pub async fn assign_staff_at(
        &mut self,
        directory: &dyn StaffDirectory,
        staff_id: i64,
        now: DateTime<Utc>,
    ) -> Result<&Staff, AppError> {
        self.loaded()?;

        let roster = match directory.fetch_available_staff().await {
            Ok(roster) => roster,
            Err(e) => {
                self.alert_failure("Phân công nhân viên", &e, now);
                return Err(e.into());
            }
        };

        let staff = roster
            .into_iter()
            .find(|s| s.id == staff_id)
            .ok_or(GuardRefusal::UnknownStaff(staff_id))?;
        if !staff.available {
            return Err(GuardRefusal::StaffUnavailable {
                id: staff.id,
                name: staff.name,
            }
            .into());
        }

        tracing::info!(booking_id = self.booking_id, staff_id, "staff assigned");
        self.announce(format!("Đã phân công {}", staff.name), now);
        Ok(&*self.assigned_staff.insert(staff))
    }

    pub fn view_at(&self, now: DateTime<Utc>) -> Result<BookingView, AppError> {
        let booking = self.loaded()?;

        let items = booking
            .items()
            .map(|item| ItemView {
                item: item.clone(),
                line_total: item.line_total(),
                image_url: item
                    .service_id
                    .and_then(|id| self.service_images.get(&id).cloned()),
            })
            .collect();

        Ok(BookingView {
            booking: booking.clone(),
            customer: self.customer.clone(),
            summary: derive::summarize(booking),
            actions: lifecycle::action_states(booking, to_console_local(now)),
            status_options: BookingStatus::ALL.to_vec(),
            timeline: derive::build_timeline(booking),
            items,
            assigned_staff: self.assigned_staff.clone(),
            notes_draft: self.notes_draft().to_string(),
            banner: self.banner_at(now).cloned(),
        })
    }
}
