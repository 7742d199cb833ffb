use actix_web::middleware::{NormalizePath, TrailingSlash};
use actix_web::{web, App, HttpServer};
use anyhow::Context;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use watch_service::config::{Config, LogConfig, LogFormat};
use watch_service::engine::RedisWatchEngine;
use watch_service::{handlers, WatchStore};

fn init_tracing(log: &LogConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,actix_web=info".into());

    match log.format {
        LogFormat::Json => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .json()
            .init(),
        LogFormat::Pretty => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env().context("Failed to load configuration")?;
    init_tracing(&config.log);

    info!(
        quota_limit = config.quota.limit,
        key_prefix = %config.redis.key_prefix,
        "Starting watch-service"
    );

    let engine = RedisWatchEngine::connect(&config.redis)
        .await
        .context("Failed to connect to Redis")?;
    let store = WatchStore::new(
        Arc::new(engine),
        config.redis.key_prefix.as_str(),
        config.quota.limit,
    );
    let store = web::Data::new(store);

    let bind_addr = config.server.bind_addr();
    let mut server = HttpServer::new(move || {
        App::new()
            .app_data(store.clone())
            .wrap(NormalizePath::new(TrailingSlash::Trim))
            .wrap(tracing_actix_web::TracingLogger::default())
            .configure(handlers::configure)
    })
    .keep_alive(Duration::from_secs(config.server.keep_alive_secs))
    .client_request_timeout(Duration::from_secs(config.server.request_timeout_secs))
    .shutdown_timeout(config.server.shutdown_timeout_secs);

    if let Some(workers) = config.server.workers {
        server = server.workers(workers);
    }

    info!("HTTP server listening on {}", bind_addr);

    server
        .bind(&bind_addr)
        .with_context(|| format!("Failed to bind on {bind_addr}"))?
        .run()
        .await
        .context("HTTP server error")?;

    info!("watch-service stopped");
    Ok(())
}
