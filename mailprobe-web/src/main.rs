//! Mailprobe web server entry point.

use std::time::Duration;

use actix_web::{middleware::from_fn, web, App, HttpServer};
use anyhow::Context;
use mailprobe_region::RegionClassifier;
use mailprobe_toolbox::ProbeService;
use mailprobe_web::{logging, middleware::client_context, routes, AppConfig, AppState};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load()?;
    let _log_guard = logging::init(&config.log)?;

    tracing::info!("Starting mailprobe v{}", env!("CARGO_PKG_VERSION"));

    let classifier = match RegionClassifier::open(config.region.clone()) {
        Ok(classifier) => Some(classifier),
        Err(e) => {
            tracing::warn!("Region detection disabled, all clients get English: {e}");
            None
        }
    };

    let ttl = config.client_cache_ttl();
    let state = web::Data::new(AppState::new(ProbeService::new(), classifier, ttl));
    spawn_client_cache_purge(state.clone(), ttl);

    let host = config.server.host.as_str();
    let port = config.server.port;
    tracing::info!("Listening on {host}:{port}");

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(from_fn(client_context))
            .configure(routes::configure)
    })
    .bind((host, port))
    .with_context(|| format!("failed to bind {host}:{port}"))?
    .run()
    .await
    .context("server terminated with an error")
}

/// Periodically drop expired client verdicts.
fn spawn_client_cache_purge(state: web::Data<AppState>, ttl: Duration) {
    let period = ttl.max(Duration::from_secs(60));
    actix_web::rt::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.tick().await;
        loop {
            interval.tick().await;
            state.client_regions.purge_expired();
            tracing::debug!("Client region cache: {} entries", state.client_regions.len());
        }
    });
}
