// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Configurator Server - catalog proxy for the 3D product configurator.
//!
//! Keeps the catalog credential server-side and fronts the two catalog
//! reads the browser needs with a disk cache. It supports:
//!
//! - Cached model list and model structure with stale-while-revalidate
//! - Uncached catalog search
//! - A usage ledger of catalog-backed requests
//!
//! # Endpoints
//!
//! - `GET /health` - Upstream catalog health
//! - `GET /models?limit&offset` - Model list
//! - `GET /models/search?q&limit` - Catalog search
//! - `GET /model/:id` - Model metadata with material and texture lists
//! - `GET /usage` - Recorded requests and credits

use anyhow::Context;
use axum::http::{HeaderValue, Method};
use configurator_core::Catalog;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

mod config;
mod error;
mod routes;
mod services;
mod types;

use config::Config;
use services::{DiskCache, SketchfabCatalog, UsageLedger};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<dyn Catalog>,
    pub cache: Arc<DiskCache>,
    pub usage: Arc<UsageLedger>,
    pub config: Arc<Config>,
}

fn cors_layer(config: &Config) -> CorsLayer {
    if config.cors_origins.iter().any(|origin| origin == "*") {
        return CorsLayer::permissive();
    }
    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET])
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug,configurator_server=debug".into()),
        )
        .pretty()
        .init();

    let config = Config::from_env();

    tracing::info!(
        port = config.port,
        cache_dir = %config.cache_dir,
        catalog = %config.catalog_base_url,
        models_ttl_secs = config.models_cache_ttl_secs,
        model_ttl_secs = config.model_cache_ttl_secs,
        usage_max_entries = config.usage_max_entries,
        "Starting Configurator Server"
    );
    if config.api_key.is_none() {
        tracing::warn!("SKETCHFAB_API_KEY is not set; catalog requests will be unauthenticated");
    }

    let catalog = SketchfabCatalog::new(&config.catalog_base_url, config.api_key.clone(), config.request_timeout())
        .context("Failed to build catalog client")?;

    // Initialize cache
    let cache = Arc::new(DiskCache::new(&config.cache_dir).await);

    let state = AppState {
        catalog: Arc::new(catalog),
        cache,
        usage: Arc::new(UsageLedger::new(config.usage_max_entries)),
        config: Arc::new(config.clone()),
    };

    // Build router
    let app = routes::router(state)
        // Middleware
        .layer(CompressionLayer::new()) // Compress responses (gzip)
        .layer(TimeoutLayer::new(config.request_timeout()))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&config));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}
