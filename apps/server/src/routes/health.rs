// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Health check endpoint.

use crate::types::HealthResponse;
use crate::AppState;
use axum::{extract::State, Json};
use serde::Serialize;

/// API information response.
#[derive(Debug, Serialize)]
pub struct ApiInfoResponse {
    pub service: &'static str,
    pub version: &'static str,
    pub description: &'static str,
    pub endpoints: Vec<EndpointInfo>,
}

/// Endpoint information.
#[derive(Debug, Serialize)]
pub struct EndpointInfo {
    pub method: &'static str,
    pub path: &'static str,
    pub description: &'static str,
}

/// GET /health - Whether the upstream catalog accepts our credential.
pub async fn check(State(state): State<AppState>) -> Json<HealthResponse> {
    let healthy = state.catalog.health_check().await;
    if !healthy {
        tracing::warn!("Catalog health check reported unhealthy");
    }
    Json(HealthResponse {
        status: if healthy { "ok" } else { "error" },
        timestamp: chrono::Utc::now(),
        ok: healthy,
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// GET / - API information endpoint.
pub async fn info() -> Json<ApiInfoResponse> {
    Json(ApiInfoResponse {
        service: "configurator-server",
        version: env!("CARGO_PKG_VERSION"),
        description: "Catalog proxy for the 3D product configurator",
        endpoints: vec![
            EndpointInfo {
                method: "GET",
                path: "/health",
                description: "Upstream catalog health",
            },
            EndpointInfo {
                method: "GET",
                path: "/models",
                description: "Model list (limit, offset)",
            },
            EndpointInfo {
                method: "GET",
                path: "/models/search",
                description: "Catalog search (q, limit)",
            },
            EndpointInfo {
                method: "GET",
                path: "/model/:id",
                description: "Model metadata with materials and textures",
            },
            EndpointInfo {
                method: "GET",
                path: "/usage",
                description: "Catalog requests and credits used",
            },
        ],
    })
}
