use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tracing_subscriber::EnvFilter;

use campsite_console::config::{AppConfig, StaffSource};
use campsite_console::routes;
use campsite_console::services::backend::rest::RestBackend;
use campsite_console::services::backend::CampsiteApi;
use campsite_console::services::notices::Notifier;
use campsite_console::services::staff::{
    BackendStaffDirectory, StaffDirectory, StaticStaffDirectory,
};
use campsite_console::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::from_env();

    let backend = RestBackend::new(
        &config.backend_url,
        config.backend_token.clone(),
        config.backend_timeout_secs.map(Duration::from_secs),
    )?;
    tracing::info!("using campsite backend at {}", backend.base_url());
    let api: Arc<dyn CampsiteApi> = Arc::new(backend);

    let staff: Box<dyn StaffDirectory> = match config.staff_source {
        StaffSource::Backend => {
            tracing::info!("staff directory: backend");
            Box::new(BackendStaffDirectory::new(api.clone()))
        }
        StaffSource::Static => {
            tracing::info!("staff directory: static roster");
            Box::new(StaticStaffDirectory::default())
        }
    };

    let state = Arc::new(AppState {
        config: config.clone(),
        api,
        staff,
        notifier: Notifier::default(),
        assignments: Mutex::new(HashMap::new()),
    });

    let app = routes::router(state);

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("starting console on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
