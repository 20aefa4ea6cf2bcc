#[cfg(test)]
pub mod mock;
pub mod rest;

use async_trait::async_trait;

use crate::models::{
    AvailabilityRecord, Booking, BookingStatus, CreateDayRequest, CreateRangeRequest, Customer,
    ServiceInfo, Staff, UpdateSlotsRequest,
};

/// Failure of a single backend call. Every variant carries the endpoint
/// (`METHOD /path`) it came from.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("request to {endpoint} failed: {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{endpoint} returned HTTP {status}: {body}")]
    Status {
        endpoint: String,
        status: u16,
        body: String,
    },

    #[error("unexpected response shape from {endpoint}: {source}")]
    DataShape {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },
}

impl ApiError {
    pub fn endpoint(&self) -> &str {
        match self {
            ApiError::Transport { endpoint, .. }
            | ApiError::Status { endpoint, .. }
            | ApiError::DataShape { endpoint, .. } => endpoint,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::Status { status: 404, .. })
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

/// The campsite REST backend as seen by the console.
#[async_trait]
pub trait CampsiteApi: Send + Sync {
    async fn fetch_booking(&self, booking_id: i64) -> ApiResult<Booking>;

    async fn fetch_customer(&self, customer_id: i64) -> ApiResult<Customer>;

    async fn fetch_service(&self, service_id: i64) -> ApiResult<ServiceInfo>;

    async fn update_internal_notes(&self, booking_id: i64, notes: &str) -> ApiResult<()>;

    /// Returns the status echoed back by the server, if the response carried one.
    async fn update_status(
        &self,
        booking_id: i64,
        status: BookingStatus,
    ) -> ApiResult<Option<BookingStatus>>;

    async fn check_in(&self, booking_id: i64) -> ApiResult<()>;

    async fn check_out(&self, booking_id: i64) -> ApiResult<()>;

    async fn fetch_availability(&self, service_id: i64) -> ApiResult<Vec<AvailabilityRecord>>;

    async fn update_availability(
        &self,
        service_id: i64,
        availability_id: i64,
        body: &UpdateSlotsRequest,
    ) -> ApiResult<()>;

    async fn create_availability(&self, service_id: i64, body: &CreateDayRequest) -> ApiResult<()>;

    async fn create_availability_batch(
        &self,
        service_id: i64,
        body: &CreateRangeRequest,
    ) -> ApiResult<()>;

    async fn fetch_staff(&self) -> ApiResult<Vec<Staff>>;
}
