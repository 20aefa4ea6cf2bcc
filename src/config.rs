use std::env;

#[derive(Clone, Debug, PartialEq)]
pub enum StaffSource {
    Static,
    Backend,
}

impl StaffSource {
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "backend" => StaffSource::Backend,
            _ => StaffSource::Static,
        }
    }
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub port: u16,
    pub backend_url: String,
    pub backend_token: Option<String>,
    pub backend_timeout_secs: Option<u64>,
    pub admin_token: String,
    pub staff_source: StaffSource,
    pub notice_ttl_secs: i64,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3000),
            backend_url: env::var("BACKEND_URL")
                .unwrap_or_else(|_| "http://localhost:8080".to_string()),
            backend_token: env::var("BACKEND_TOKEN").ok().filter(|t| !t.is_empty()),
            backend_timeout_secs: env::var("BACKEND_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok()),
            admin_token: env::var("ADMIN_TOKEN").unwrap_or_else(|_| "changeme".to_string()),
            staff_source: env::var("STAFF_DIRECTORY")
                .map(|v| StaffSource::parse(&v))
                .unwrap_or(StaffSource::Static),
            notice_ttl_secs: env::var("NOTICE_TTL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3),
        }
    }
}
