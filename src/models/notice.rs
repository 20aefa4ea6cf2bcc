use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    /// Blocking; stays until the operator dismisses it.
    Alert,
    /// Self-dismissing after its lifetime.
    Banner,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    Success,
    Info,
    Error,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Notice {
    pub kind: NoticeKind,
    pub level: NoticeLevel,
    pub message: String,
    pub booking_id: Option<i64>,
    pub service_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl Notice {
    pub fn alert(level: NoticeLevel, message: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            kind: NoticeKind::Alert,
            level,
            message: message.into(),
            booking_id: None,
            service_id: None,
            created_at: now,
            expires_at: None,
        }
    }

    pub fn banner(
        level: NoticeLevel,
        message: impl Into<String>,
        now: DateTime<Utc>,
        ttl: Duration,
    ) -> Self {
        Self {
            kind: NoticeKind::Banner,
            level,
            message: message.into(),
            booking_id: None,
            service_id: None,
            created_at: now,
            expires_at: Some(now + ttl),
        }
    }

    pub fn for_booking(mut self, booking_id: i64) -> Self {
        self.booking_id = Some(booking_id);
        self
    }

    pub fn for_service(mut self, service_id: i64) -> Self {
        self.service_id = Some(service_id);
        self
    }

    pub fn is_visible_at(&self, now: DateTime<Utc>) -> bool {
        match self.expires_at {
            Some(expires_at) => now < expires_at,
            None => true,
        }
    }
}
