use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use super::{ApiError, ApiResult, CampsiteApi};
use crate::models::{
    AvailabilityRecord, Booking, BookingStatus, CreateDayRequest, CreateRangeRequest, Customer,
    ServiceInfo, Staff, UpdateSlotsRequest,
};

const API_PREFIX: &str = "/apis/v1";

#[derive(Deserialize)]
struct StatusAck {
    #[serde(default)]
    status: Option<BookingStatus>,
}

pub struct RestBackend {
    base_url: String,
    token: Option<String>,
    client: reqwest::Client,
}

impl RestBackend {
    pub fn new(
        base_url: &str,
        token: Option<String>,
        timeout: Option<Duration>,
    ) -> anyhow::Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().context("failed to build backend HTTP client")?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> (String, RequestBuilder) {
        let endpoint = format!("{method} {API_PREFIX}{path}");
        let mut req = self
            .client
            .request(method, format!("{}{API_PREFIX}{path}", self.base_url));
        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }
        (endpoint, req)
    }

    async fn send(&self, endpoint: &str, req: RequestBuilder) -> ApiResult<String> {
        tracing::debug!(endpoint, "backend request");

        let resp = req.send().await.map_err(|source| ApiError::Transport {
            endpoint: endpoint.to_string(),
            source,
        })?;

        let status = resp.status();
        let body = resp.text().await.map_err(|source| ApiError::Transport {
            endpoint: endpoint.to_string(),
            source,
        })?;

        if !status.is_success() {
            tracing::warn!(endpoint, status = status.as_u16(), "backend returned error status");
            return Err(ApiError::Status {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        Ok(body)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        let (endpoint, req) = self.request(Method::GET, path);
        let body = self.send(&endpoint, req).await?;
        decode(&endpoint, &body)
    }
}

fn decode<T: DeserializeOwned>(endpoint: &str, body: &str) -> ApiResult<T> {
    serde_json::from_str(body).map_err(|source| ApiError::DataShape {
        endpoint: endpoint.to_string(),
        source,
    })
}

#[async_trait]
impl CampsiteApi for RestBackend {
    async fn fetch_booking(&self, booking_id: i64) -> ApiResult<Booking> {
        self.get_json(&format!("/bookings/{booking_id}")).await
    }

    async fn fetch_customer(&self, customer_id: i64) -> ApiResult<Customer> {
        self.get_json(&format!("/customers/{customer_id}")).await
    }

    async fn fetch_service(&self, service_id: i64) -> ApiResult<ServiceInfo> {
        self.get_json(&format!("/services/{service_id}")).await
    }

    async fn update_internal_notes(&self, booking_id: i64, notes: &str) -> ApiResult<()> {
        let (endpoint, req) =
            self.request(Method::PUT, &format!("/bookings/{booking_id}/internal-notes"));
        let req = req
            .header(CONTENT_TYPE, "text/plain")
            .body(notes.to_string());
        self.send(&endpoint, req).await?;
        Ok(())
    }

    async fn update_status(
        &self,
        booking_id: i64,
        status: BookingStatus,
    ) -> ApiResult<Option<BookingStatus>> {
        let (endpoint, req) = self.request(Method::PUT, &format!("/bookings/{booking_id}/status"));
        let req = req.query(&[("status", status.as_str())]);
        let body = self.send(&endpoint, req).await?;

        if body.trim().is_empty() {
            return Ok(None);
        }
        let ack: StatusAck = decode(&endpoint, &body)?;
        Ok(ack.status)
    }

    async fn check_in(&self, booking_id: i64) -> ApiResult<()> {
        let (endpoint, req) = self.request(Method::PUT, &format!("/bookings/{booking_id}/checkin"));
        self.send(&endpoint, req).await?;
        Ok(())
    }

    async fn check_out(&self, booking_id: i64) -> ApiResult<()> {
        let (endpoint, req) =
            self.request(Method::PUT, &format!("/bookings/{booking_id}/checkout"));
        self.send(&endpoint, req).await?;
        Ok(())
    }

    async fn fetch_availability(&self, service_id: i64) -> ApiResult<Vec<AvailabilityRecord>> {
        self.get_json(&format!("/services/{service_id}/availability"))
            .await
    }

    async fn update_availability(
        &self,
        service_id: i64,
        availability_id: i64,
        body: &UpdateSlotsRequest,
    ) -> ApiResult<()> {
        let (endpoint, req) = self.request(
            Method::PUT,
            &format!("/services/{service_id}/availability/{availability_id}"),
        );
        self.send(&endpoint, req.json(body)).await?;
        Ok(())
    }

    async fn create_availability(&self, service_id: i64, body: &CreateDayRequest) -> ApiResult<()> {
        let (endpoint, req) =
            self.request(Method::POST, &format!("/services/{service_id}/availability"));
        self.send(&endpoint, req.json(body)).await?;
        Ok(())
    }

    async fn create_availability_batch(
        &self,
        service_id: i64,
        body: &CreateRangeRequest,
    ) -> ApiResult<()> {
        let (endpoint, req) = self.request(
            Method::POST,
            &format!("/services/{service_id}/availability/batch"),
        );
        self.send(&endpoint, req.json(body)).await?;
        Ok(())
    }

    async fn fetch_staff(&self) -> ApiResult<Vec<Staff>> {
        self.get_json("/staff").await
    }
}
