// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Server configuration loaded from environment variables.

use crate::services::cache::CachePolicy;
use crate::services::usage::DEFAULT_MAX_ENTRIES;
use std::time::Duration;

/// Server configuration.
#[derive(Clone)]
pub struct Config {
    /// Port to listen on.
    pub port: u16,
    /// Upstream catalog API root.
    pub catalog_base_url: String,
    /// Catalog credential. Never leaves the server.
    pub api_key: Option<String>,
    /// Directory for cache storage.
    pub cache_dir: String,
    /// Freshness of cached model lists (seconds).
    pub models_cache_ttl_secs: u64,
    /// Freshness of cached single-model structures (seconds).
    pub model_cache_ttl_secs: u64,
    /// Window after the TTL in which a stale model list is still served.
    pub models_stale_secs: u64,
    /// Window after the TTL in which a stale model structure is still served.
    pub model_stale_secs: u64,
    /// Page size when the client sends no `limit`.
    pub default_page_limit: u32,
    /// Request timeout in seconds (also applied to upstream calls).
    pub request_timeout_secs: u64,
    /// Allowed CORS origins (comma-separated, or "*" for all in development).
    pub cors_origins: Vec<String>,
    /// Usage entries kept in memory; older ones are dropped.
    pub usage_max_entries: usize,
}

fn env_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|value| value.trim().parse().ok())
        .unwrap_or(default)
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            port: env_or("PORT", 8080),
            catalog_base_url: std::env::var("CATALOG_BASE_URL")
                .unwrap_or_else(|_| "https://api.sketchfab.com/v3".into())
                .trim_end_matches('/')
                .to_string(),
            api_key: std::env::var("SKETCHFAB_API_KEY")
                .ok()
                .filter(|key| !key.trim().is_empty()),
            cache_dir: std::env::var("CACHE_DIR").unwrap_or_else(|_| "./.cache".into()),
            models_cache_ttl_secs: env_or("MODELS_CACHE_TTL_SECS", 3600),
            model_cache_ttl_secs: env_or("MODEL_CACHE_TTL_SECS", 1800),
            models_stale_secs: env_or("MODELS_STALE_SECS", 60),
            model_stale_secs: env_or("MODEL_STALE_SECS", 30),
            default_page_limit: env_or("DEFAULT_PAGE_LIMIT", 50),
            request_timeout_secs: env_or("REQUEST_TIMEOUT_SECS", 30),
            cors_origins: std::env::var("CORS_ORIGINS")
                .unwrap_or_else(|_| {
                    // Default: allow common development origins
                    "http://localhost:3000,http://localhost:5173,http://127.0.0.1:3000,http://127.0.0.1:5173".into()
                })
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            usage_max_entries: env_or("USAGE_MAX_ENTRIES", DEFAULT_MAX_ENTRIES),
        }
    }

    pub fn models_policy(&self) -> CachePolicy {
        CachePolicy::new(
            Duration::from_secs(self.models_cache_ttl_secs),
            Duration::from_secs(self.models_stale_secs),
        )
    }

    pub fn model_policy(&self) -> CachePolicy {
        CachePolicy::new(
            Duration::from_secs(self.model_cache_ttl_secs),
            Duration::from_secs(self.model_stale_secs),
        )
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

// Hand-written so the credential never ends up in logs.
impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("port", &self.port)
            .field("catalog_base_url", &self.catalog_base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("cache_dir", &self.cache_dir)
            .field("models_cache_ttl_secs", &self.models_cache_ttl_secs)
            .field("model_cache_ttl_secs", &self.model_cache_ttl_secs)
            .field("models_stale_secs", &self.models_stale_secs)
            .field("model_stale_secs", &self.model_stale_secs)
            .field("default_page_limit", &self.default_page_limit)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("cors_origins", &self.cors_origins)
            .field("usage_max_entries", &self.usage_max_entries)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
