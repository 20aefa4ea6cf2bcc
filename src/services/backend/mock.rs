//! In-memory backend for controller tests. Mutations behave like the real
//! server would, so refetches observe them.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Duration;

use super::{ApiError, ApiResult, CampsiteApi};
use crate::models::{
    AvailabilityRecord, Booking, BookingStatus, CreateDayRequest, CreateRangeRequest, Customer,
    ServiceInfo, Staff, UpdateSlotsRequest,
};

#[derive(Default)]
pub struct MockApi {
    pub booking: Mutex<Option<Booking>>,
    pub availability: Mutex<Option<Vec<AvailabilityRecord>>>,
    pub staff: Mutex<Vec<Staff>>,
    pub calls: Mutex<Vec<(String, Option<String>)>>,
    pub fail_mutations: AtomicBool,
    pub fail_fetches: AtomicBool,
}

impl MockApi {
    pub fn with_booking(booking: Booking) -> Self {
        let api = Self::default();
        *api.booking.lock().unwrap() = Some(booking);
        api
    }

    pub fn with_availability(records: Vec<AvailabilityRecord>) -> Self {
        let api = Self::default();
        *api.availability.lock().unwrap() = Some(records);
        api
    }

    pub fn calls(&self) -> Vec<(String, Option<String>)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_labels(&self) -> Vec<String> {
        self.calls().into_iter().map(|(label, _)| label).collect()
    }

    fn record(&self, label: String, body: Option<String>) {
        self.calls.lock().unwrap().push((label, body));
    }

    fn mutation(&self, label: &str) -> ApiResult<()> {
        if self.fail_mutations.load(Ordering::SeqCst) {
            return Err(ApiError::Status {
                endpoint: label.to_string(),
                status: 500,
                body: "boom".to_string(),
            });
        }
        Ok(())
    }

    fn fetch(&self, label: &str) -> ApiResult<()> {
        if self.fail_fetches.load(Ordering::SeqCst) {
            return Err(ApiError::Status {
                endpoint: label.to_string(),
                status: 503,
                body: String::new(),
            });
        }
        Ok(())
    }

    fn not_found(label: String) -> ApiError {
        ApiError::Status {
            endpoint: label,
            status: 404,
            body: String::new(),
        }
    }

    fn set_status(&self, status: BookingStatus) {
        if let Some(b) = self.booking.lock().unwrap().as_mut() {
            b.status = status;
        }
    }
}

#[async_trait]
impl CampsiteApi for MockApi {
    async fn fetch_booking(&self, booking_id: i64) -> ApiResult<Booking> {
        let label = format!("GET /apis/v1/bookings/{booking_id}");
        self.record(label.clone(), None);
        self.fetch(&label)?;
        self.booking
            .lock()
            .unwrap()
            .clone()
            .filter(|b| b.id == booking_id)
            .ok_or_else(|| Self::not_found(label))
    }

    async fn fetch_customer(&self, customer_id: i64) -> ApiResult<Customer> {
        self.record(format!("GET /apis/v1/customers/{customer_id}"), None);
        Ok(Customer {
            id: customer_id,
            full_name: Some("Phạm Minh Châu".to_string()),
            email: Some("chau@example.com".to_string()),
            phone: None,
        })
    }

    async fn fetch_service(&self, service_id: i64) -> ApiResult<ServiceInfo> {
        self.record(format!("GET /apis/v1/services/{service_id}"), None);
        Ok(ServiceInfo {
            id: service_id,
            name: Some("Lều ven hồ".to_string()),
            image_url: Some(format!("https://img.example.com/services/{service_id}.jpg")),
            location: None,
        })
    }

    async fn update_internal_notes(&self, booking_id: i64, notes: &str) -> ApiResult<()> {
        let label = format!("PUT /apis/v1/bookings/{booking_id}/internal-notes");
        self.record(label.clone(), Some(notes.to_string()));
        self.mutation(&label)?;
        if let Some(b) = self.booking.lock().unwrap().as_mut() {
            b.internal_notes = Some(notes.to_string());
        }
        Ok(())
    }

    async fn update_status(
        &self,
        booking_id: i64,
        status: BookingStatus,
    ) -> ApiResult<Option<BookingStatus>> {
        let label = format!("PUT /apis/v1/bookings/{booking_id}/status?status={status}");
        self.record(label.clone(), None);
        self.mutation(&label)?;
        self.set_status(status);
        Ok(Some(status))
    }

    async fn check_in(&self, booking_id: i64) -> ApiResult<()> {
        let label = format!("PUT /apis/v1/bookings/{booking_id}/checkin");
        self.record(label.clone(), None);
        self.mutation(&label)?;
        self.set_status(BookingStatus::InProgress);
        Ok(())
    }

    async fn check_out(&self, booking_id: i64) -> ApiResult<()> {
        let label = format!("PUT /apis/v1/bookings/{booking_id}/checkout");
        self.record(label.clone(), None);
        self.mutation(&label)?;
        self.set_status(BookingStatus::Completed);
        Ok(())
    }

    async fn fetch_availability(&self, service_id: i64) -> ApiResult<Vec<AvailabilityRecord>> {
        let label = format!("GET /apis/v1/services/{service_id}/availability");
        self.record(label.clone(), None);
        self.fetch(&label)?;
        self.availability
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| Self::not_found(label))
    }

    async fn update_availability(
        &self,
        service_id: i64,
        availability_id: i64,
        body: &UpdateSlotsRequest,
    ) -> ApiResult<()> {
        let label = format!("PUT /apis/v1/services/{service_id}/availability/{availability_id}");
        self.record(label.clone(), serde_json::to_string(body).ok());
        self.mutation(&label)?;
        if let Some(records) = self.availability.lock().unwrap().as_mut() {
            for r in records.iter_mut().filter(|r| r.id == availability_id) {
                r.total_slots = body.total_slots;
            }
        }
        Ok(())
    }

    async fn create_availability(&self, service_id: i64, body: &CreateDayRequest) -> ApiResult<()> {
        let label = format!("POST /apis/v1/services/{service_id}/availability");
        self.record(label.clone(), serde_json::to_string(body).ok());
        self.mutation(&label)?;
        let mut guard = self.availability.lock().unwrap();
        let records = guard.get_or_insert_with(Vec::new);
        let id = records.iter().map(|r| r.id).max().unwrap_or(0) + 1;
        records.push(AvailabilityRecord {
            id,
            date: body.date,
            total_slots: body.total_slots,
            booked_slots: 0,
        });
        Ok(())
    }

    async fn create_availability_batch(
        &self,
        service_id: i64,
        body: &CreateRangeRequest,
    ) -> ApiResult<()> {
        let label = format!("POST /apis/v1/services/{service_id}/availability/batch");
        self.record(label.clone(), serde_json::to_string(body).ok());
        self.mutation(&label)?;
        let mut guard = self.availability.lock().unwrap();
        let records = guard.get_or_insert_with(Vec::new);
        let mut date = body.start_date;
        while date <= body.end_date {
            let id = records.iter().map(|r| r.id).max().unwrap_or(0) + 1;
            records.push(AvailabilityRecord {
                id,
                date,
                total_slots: body.total_slots,
                booked_slots: 0,
            });
            date += Duration::days(1);
        }
        Ok(())
    }

    async fn fetch_staff(&self) -> ApiResult<Vec<Staff>> {
        self.record("GET /apis/v1/staff".to_string(), None);
        Ok(self.staff.lock().unwrap().clone())
    }
}
