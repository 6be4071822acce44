// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! HTTP routes.

pub mod health;
pub mod models;
pub mod usage;

use crate::AppState;
use axum::{routing::get, Router};

/// Build the API router (middleware is layered on in `main`).
pub fn router(state: AppState) -> Router {
    Router::new()
        // Root endpoint - API information
        .route("/", get(health::info))
        .route("/health", get(health::check))
        // Catalog endpoints
        .route("/models", get(models::list))
        .route("/models/search", get(models::search))
        .route("/model/:id", get(models::structure))
        .route("/usage", get(usage::summary))
        .with_state(state)
}
