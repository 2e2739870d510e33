//! Dashboard entry point: loads settings and data, then serves the pages.

mod server;

use std::io;
use std::sync::Arc;

use actix_web::web;
use mockable::DefaultClock;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use dashboard::domain::{DataState, DataStatus};
use dashboard::inbound::http::health::HealthState;
use dashboard::inbound::http::state::HttpState;
use dashboard::render::select_visuals;
use dashboard::settings::DashboardSettings;
use farm_data::load_or_generate;
use server::{CookiePolicy, ServerConfig, create_server};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = DashboardSettings::load_from_iter(std::env::args_os())
        .map_err(|e| io::Error::other(format!("failed to load settings: {e}")))?;
    let bind_addr = settings.bind_addr().map_err(io::Error::other)?;
    let data_dir = settings.data_dir().map_err(io::Error::other)?;
    let options = settings.store_options().map_err(io::Error::other)?;
    let key = settings.session_key().map_err(io::Error::other)?;

    let data = Arc::new(DataState::new());
    if let DataStatus::Ready { source, seed, .. } =
        data.initialize(|| load_or_generate(&data_dir, &options))
    {
        info!(data_dir = %data_dir, source = source.as_str(), seed, "data store loaded");
    }

    let visuals = select_visuals(settings.visuals());
    info!(visuals = visuals.name(), bind_addr = %bind_addr, "starting dashboard");

    let http_state = HttpState::new(data, Arc::new(DefaultClock), visuals);
    let health_state = web::Data::new(HealthState::new());
    let config = ServerConfig::new(
        key,
        CookiePolicy::lax(settings.cookie_secure),
        bind_addr,
        http_state,
    );
    create_server(health_state, config)?.await
}
