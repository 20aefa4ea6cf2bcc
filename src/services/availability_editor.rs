//! Per-service availability editor.
//!
//! `records` is `None` until a successful fetch; a loaded service with no days
//! is `Some(vec![])`. The console renders those two cases differently.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use crate::errors::{AppError, GuardRefusal};
use crate::models::availability::sort_by_date;
use crate::models::wire::to_console_local;
use crate::models::{
    AvailabilityRecord, CreateDayRequest, CreateRangeRequest, Notice, NoticeLevel,
    UpdateSlotsRequest,
};
use crate::services::backend::{ApiError, CampsiteApi};
use crate::services::notices::Notifier;

pub const UNAVAILABLE_MESSAGE: &str = "Tính năng chưa khả dụng";

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DayView {
    #[serde(flatten)]
    pub record: AvailabilityRecord,
    pub is_full: bool,
    pub remaining_slots: i32,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum AvailabilityView {
    Unavailable {
        message: String,
    },
    #[serde(rename_all = "camelCase")]
    Ready {
        service_id: i64,
        min_date: NaiveDate,
        days: Vec<DayView>,
    },
}

/// First selectable date for new availability: today in Vietnam.
pub fn min_date(now: DateTime<Utc>) -> NaiveDate {
    to_console_local(now).date()
}

pub struct AvailabilityEditor {
    api: Arc<dyn CampsiteApi>,
    notifier: Notifier,
    service_id: i64,
    records: Option<Vec<AvailabilityRecord>>,
}

impl AvailabilityEditor {
    pub fn new(api: Arc<dyn CampsiteApi>, service_id: i64, notifier: Notifier) -> Self {
        Self {
            api,
            notifier,
            service_id,
            records: None,
        }
    }

    pub fn service_id(&self) -> i64 {
        self.service_id
    }

    pub fn records(&self) -> Option<&[AvailabilityRecord]> {
        self.records.as_deref()
    }

    pub fn has_date(&self, date: NaiveDate) -> bool {
        self.records
            .as_ref()
            .map(|records| records.iter().any(|r| r.date == date))
            .unwrap_or(false)
    }

    /// Replaces the local list with the server's, sorted by date. On failure
    /// the previous list is kept.
    pub async fn load(&mut self) -> Result<&[AvailabilityRecord], AppError> {
        let mut records = match self.api.fetch_availability(self.service_id).await {
            Ok(records) => records,
            Err(e) => {
                tracing::warn!(service_id = self.service_id, error = %e, "failed to load availability");
                return Err(e.into());
            }
        };
        sort_by_date(&mut records);
        tracing::debug!(service_id = self.service_id, days = records.len(), "availability loaded");
        Ok(self.records.insert(records).as_slice())
    }

    fn alert_failure(&self, what: &str, error: &ApiError, now: DateTime<Utc>) {
        tracing::error!(service_id = self.service_id, error = %error, "{what} failed");
        self.notifier.publish(
            Notice::alert(NoticeLevel::Error, format!("{what} thất bại: {error}"), now)
                .for_service(self.service_id),
        );
    }

    /// Refetches after an accepted mutation. On failure the previous list stays
    /// and a separate alert is raised; the mutation is not reported as failed.
    async fn reload_after(&mut self, what: &str, now: DateTime<Utc>) {
        if let Err(e) = self.load().await {
            self.notifier.publish(
                Notice::alert(
                    NoticeLevel::Error,
                    format!("{what} đã thực hiện nhưng tải lại thất bại: {e}"),
                    now,
                )
                .for_service(self.service_id),
            );
        }
    }

    /// Sets the total slots of one day. Capacity below the booked count is
    /// sent as-is.
    pub async fn update_total_slots_at(
        &mut self,
        availability_id: i64,
        total_slots: i32,
        now: DateTime<Utc>,
    ) -> Result<(), AppError> {
        if total_slots < 0 {
            return Err(GuardRefusal::InvalidSlots(total_slots).into());
        }

        if let Some(record) = self
            .records
            .as_ref()
            .and_then(|records| records.iter().find(|r| r.id == availability_id))
        {
            if total_slots < record.booked_slots {
                tracing::warn!(
                    service_id = self.service_id,
                    availability_id,
                    total_slots,
                    booked_slots = record.booked_slots,
                    "total slots set below booked slots"
                );
            }
        }

        let body = UpdateSlotsRequest { total_slots };
        if let Err(e) = self
            .api
            .update_availability(self.service_id, availability_id, &body)
            .await
        {
            self.alert_failure("Cập nhật số chỗ", &e, now);
            return Err(e.into());
        }

        tracing::info!(service_id = self.service_id, availability_id, total_slots, "slots updated");
        self.reload_after("Cập nhật số chỗ", now).await;
        Ok(())
    }

    /// Creates one day. Refused without a call if the date is in the past or
    /// already present in the local list.
    pub async fn add_day_at(
        &mut self,
        date: NaiveDate,
        total_slots: i32,
        now: DateTime<Utc>,
    ) -> Result<(), AppError> {
        let today = min_date(now);
        if date < today {
            return Err(GuardRefusal::DateInPast { date, today }.into());
        }
        if total_slots <= 0 {
            return Err(GuardRefusal::InvalidSlots(total_slots).into());
        }
        if self.has_date(date) {
            return Err(GuardRefusal::DuplicateDate { date }.into());
        }

        let body = CreateDayRequest { date, total_slots };
        if let Err(e) = self.api.create_availability(self.service_id, &body).await {
            self.alert_failure("Thêm ngày", &e, now);
            return Err(e.into());
        }

        tracing::info!(service_id = self.service_id, %date, total_slots, "availability day created");
        self.notifier.publish(
            Notice::alert(NoticeLevel::Success, format!("Đã thêm ngày {date}"), now)
                .for_service(self.service_id),
        );
        self.reload_after("Thêm ngày", now).await;
        Ok(())
    }

    /// Creates every day from `start` to `end` inclusive in one batch call.
    /// Expansion into days is left to the server.
    pub async fn add_range_at(
        &mut self,
        start_date: NaiveDate,
        end_date: NaiveDate,
        total_slots: i32,
        now: DateTime<Utc>,
    ) -> Result<(), AppError> {
        let today = min_date(now);
        if start_date < today {
            return Err(GuardRefusal::DateInPast {
                date: start_date,
                today,
            }
            .into());
        }
        if end_date < start_date {
            return Err(GuardRefusal::EndBeforeStart {
                start: start_date,
                end: end_date,
            }
            .into());
        }
        if total_slots <= 0 {
            return Err(GuardRefusal::InvalidSlots(total_slots).into());
        }

        let body = CreateRangeRequest {
            start_date,
            end_date,
            total_slots,
        };
        if let Err(e) = self
            .api
            .create_availability_batch(self.service_id, &body)
            .await
        {
            self.alert_failure("Thêm khoảng ngày", &e, now);
            return Err(e.into());
        }

        tracing::info!(
            service_id = self.service_id,
            %start_date,
            %end_date,
            days = body.day_count(),
            total_slots,
            "availability range created"
        );
        self.notifier.publish(
            Notice::alert(
                NoticeLevel::Success,
                format!("Đã thêm {} ngày từ {start_date} đến {end_date}", body.day_count()),
                now,
            )
            .for_service(self.service_id),
        );
        self.reload_after("Thêm khoảng ngày", now).await;
        Ok(())
    }

    pub fn view_at(&self, now: DateTime<Utc>) -> AvailabilityView {
        match &self.records {
            None => AvailabilityView::Unavailable {
                message: UNAVAILABLE_MESSAGE.to_string(),
            },
            Some(records) => AvailabilityView::Ready {
                service_id: self.service_id,
                min_date: min_date(now),
                days: records
                    .iter()
                    .map(|r| DayView {
                        record: r.clone(),
                        is_full: r.is_full(),
                        remaining_slots: r.remaining_slots(),
                    })
                    .collect(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::backend::mock::MockApi;
    use chrono::TimeZone;
    use std::sync::atomic::Ordering;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn record(id: i64, d: &str, total: i32, booked: i32) -> AvailabilityRecord {
        AvailabilityRecord {
            id,
            date: date(d),
            total_slots: total,
            booked_slots: booked,
        }
    }

    /// 2025-05-31 20:00 UTC is already 2025-06-01 in Vietnam.
    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 5, 31, 20, 0, 0).unwrap()
    }

    async fn loaded(api: &Arc<MockApi>) -> AvailabilityEditor {
        let mut editor = AvailabilityEditor::new(api.clone(), 7, Notifier::default());
        editor.load().await.unwrap();
        editor
    }

    #[test]
    fn test_min_date_uses_vietnam_offset() {
        assert_eq!(min_date(now()), date("2025-06-01"));
        let morning = Utc.with_ymd_and_hms(2025, 5, 31, 16, 59, 0).unwrap();
        assert_eq!(min_date(morning), date("2025-05-31"));
    }

    #[tokio::test]
    async fn test_unloaded_vs_empty() {
        let api = Arc::new(MockApi::default());
        let mut editor = AvailabilityEditor::new(api.clone(), 7, Notifier::default());
        assert!(editor.load().await.is_err());
        assert!(editor.records().is_none());
        assert!(matches!(
            editor.view_at(now()),
            AvailabilityView::Unavailable { .. }
        ));

        let api = Arc::new(MockApi::with_availability(vec![]));
        let editor = loaded(&api).await;
        match editor.view_at(now()) {
            AvailabilityView::Ready { days, .. } => assert!(days.is_empty()),
            other => panic!("expected ready view, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_load_sorts_by_date() {
        let api = Arc::new(MockApi::with_availability(vec![
            record(2, "2025-06-03", 10, 0),
            record(1, "2025-06-01", 10, 10),
        ]));
        let editor = loaded(&api).await;
        let ids: Vec<i64> = editor.records().unwrap().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 2]);

        match editor.view_at(now()) {
            AvailabilityView::Ready { days, min_date, .. } => {
                assert!(days[0].is_full);
                assert!(!days[1].is_full);
                assert_eq!(min_date, date("2025-06-01"));
            }
            other => panic!("expected ready view, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_add_day_posts_and_reloads() {
        let api = Arc::new(MockApi::with_availability(vec![]));
        let mut editor = loaded(&api).await;

        editor.add_day_at(date("2025-06-01"), 10, now()).await.unwrap();

        let calls = api.calls();
        assert_eq!(calls[1].0, "POST /apis/v1/services/7/availability");
        let body: serde_json::Value = serde_json::from_str(calls[1].1.as_deref().unwrap()).unwrap();
        assert_eq!(body, serde_json::json!({"date": "2025-06-01", "totalSlots": 10}));
        assert_eq!(calls[2].0, "GET /apis/v1/services/7/availability");
        assert!(editor.has_date(date("2025-06-01")));
    }

    #[tokio::test]
    async fn test_add_duplicate_day_is_refused_locally() {
        let api = Arc::new(MockApi::with_availability(vec![record(1, "2025-06-01", 10, 0)]));
        let mut editor = loaded(&api).await;

        let err = editor.add_day_at(date("2025-06-01"), 10, now()).await.unwrap_err();
        assert_eq!(err.to_string(), "Ngày 2025-06-01 đã được tạo!");
        assert_eq!(api.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_add_day_in_past_is_refused() {
        let api = Arc::new(MockApi::with_availability(vec![]));
        let mut editor = loaded(&api).await;

        let err = editor.add_day_at(date("2025-05-31"), 10, now()).await.unwrap_err();
        assert!(matches!(err, AppError::Refused(GuardRefusal::DateInPast { .. })));
        let err = editor.add_day_at(date("2025-06-02"), 0, now()).await.unwrap_err();
        assert!(matches!(err, AppError::Refused(GuardRefusal::InvalidSlots(0))));
        assert_eq!(api.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_add_range_is_one_batch_call() {
        let api = Arc::new(MockApi::with_availability(vec![]));
        let mut editor = loaded(&api).await;

        editor
            .add_range_at(date("2025-06-01"), date("2025-06-05"), 5, now())
            .await
            .unwrap();

        let calls = api.calls();
        let posts: Vec<_> = calls.iter().filter(|(l, _)| l.starts_with("POST")).collect();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].0, "POST /apis/v1/services/7/availability/batch");
        let body: serde_json::Value = serde_json::from_str(posts[0].1.as_deref().unwrap()).unwrap();
        assert_eq!(
            body,
            serde_json::json!({"startDate": "2025-06-01", "endDate": "2025-06-05", "totalSlots": 5})
        );
        assert_eq!(editor.records().unwrap().len(), 5);
    }

    #[tokio::test]
    async fn test_add_range_end_before_start() {
        let api = Arc::new(MockApi::with_availability(vec![]));
        let mut editor = loaded(&api).await;
        let err = editor
            .add_range_at(date("2025-06-05"), date("2025-06-01"), 5, now())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Refused(GuardRefusal::EndBeforeStart { .. })));
        assert_eq!(api.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_update_slots_puts_and_reloads() {
        let api = Arc::new(MockApi::with_availability(vec![record(99, "2025-06-01", 10, 3)]));
        let mut editor = loaded(&api).await;

        editor.update_total_slots_at(99, 15, now()).await.unwrap();

        let calls = api.calls();
        assert_eq!(calls[1].0, "PUT /apis/v1/services/7/availability/99");
        assert_eq!(calls[1].1.as_deref(), Some(r#"{"totalSlots":15}"#));
        assert_eq!(calls[2].0, "GET /apis/v1/services/7/availability");
        assert_eq!(editor.records().unwrap()[0].total_slots, 15);
    }

    #[tokio::test]
    async fn test_update_below_booked_is_sent() {
        let api = Arc::new(MockApi::with_availability(vec![record(99, "2025-06-01", 10, 8)]));
        let mut editor = loaded(&api).await;
        editor.update_total_slots_at(99, 2, now()).await.unwrap();
        assert!(editor.records().unwrap()[0].is_full());
    }

    #[tokio::test]
    async fn test_update_failure_keeps_list() {
        let api = Arc::new(MockApi::with_availability(vec![record(99, "2025-06-01", 10, 0)]));
        let mut editor = loaded(&api).await;
        api.fail_mutations.store(true, Ordering::SeqCst);

        assert!(editor.update_total_slots_at(99, 15, now()).await.is_err());
        assert_eq!(editor.records().unwrap()[0].total_slots, 10);
        assert_eq!(api.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_add_day_stands_when_refetch_fails() {
        let api = Arc::new(MockApi::with_availability(vec![record(1, "2025-06-01", 10, 0)]));
        let notifier = Notifier::default();
        let mut rx = notifier.subscribe();
        let mut editor = AvailabilityEditor::new(api.clone(), 7, notifier);
        editor.load().await.unwrap();
        api.fail_fetches.store(true, Ordering::SeqCst);

        editor.add_day_at(date("2025-06-05"), 6, now()).await.unwrap();
        assert_eq!(api.availability.lock().unwrap().as_ref().unwrap().len(), 2);
        // Previous list is kept
        assert_eq!(editor.records().unwrap().len(), 1);

        assert_eq!(rx.recv().await.unwrap().level, NoticeLevel::Success);
        let reload = rx.recv().await.unwrap();
        assert_eq!(reload.level, NoticeLevel::Error);
        assert!(reload.message.contains("tải lại thất bại"));
    }

    #[tokio::test]
    async fn test_update_slots_stands_when_refetch_fails() {
        let api = Arc::new(MockApi::with_availability(vec![record(1, "2025-06-01", 10, 0)]));
        let mut editor = loaded(&api).await;
        api.fail_fetches.store(true, Ordering::SeqCst);

        editor.update_total_slots_at(1, 4, now()).await.unwrap();
        assert_eq!(
            api.availability.lock().unwrap().as_ref().unwrap()[0].total_slots,
            4
        );
    }
}
