// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Response types for the API.

use crate::services::usage::UsageEntry;
use chrono::{DateTime, Utc};
use configurator_core::{Material, Model, Texture};
use serde::{Deserialize, Serialize};

/// `GET /models` and `GET /models/search`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelsResponse {
    pub results: Vec<Model>,
    pub ok: bool,
}

/// Model metadata plus the material and texture lists.
///
/// The lists are empty here: the live lists come from the viewer once the
/// model is bound.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelStructure {
    pub model: Model,
    #[serde(default)]
    pub materials: Vec<Material>,
    #[serde(default)]
    pub textures: Vec<Texture>,
}

/// `GET /model/:id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelStructureResponse {
    #[serde(flatten)]
    pub structure: ModelStructure,
    pub ok: bool,
}

/// `GET /health`.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: DateTime<Utc>,
    pub ok: bool,
    pub version: &'static str,
}

/// `GET /usage`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageResponse {
    pub entries: Vec<UsageEntry>,
    pub total_credits: u64,
    pub ok: bool,
}
