// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Catalog endpoints: model list, search and single-model structure.

use crate::error::ApiError;
use crate::services::{DiskCache, UsageAction};
use crate::types::{
    clamp_limit, ModelStructure, ModelStructureResponse, ModelsResponse, PageQuery, SearchQuery, DEFAULT_SEARCH_LIMIT,
};
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    http::header,
    response::IntoResponse,
    Json,
};
use configurator_core::{Model, Page};
use serde_json::json;

/// GET /models - Account model list (cached, stale-while-revalidate).
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let page = Page::new(
        clamp_limit(query.limit, state.config.default_page_limit),
        query.offset.unwrap_or(0),
    );
    let policy = state.config.models_policy();
    let key = DiskCache::generate_key(&["models", &page.limit.to_string(), &page.offset.to_string()]);

    let catalog = state.catalog.clone();
    let results: Vec<Model> = state
        .cache
        .fetch_with_revalidate(&key, policy, move || async move {
            catalog.list_models(page).await.map_err(ApiError::from)
        })
        .await?;

    state
        .usage
        .record(UsageAction::ModelsFetch, json!({ "modelCount": results.len() }));

    Ok((
        [(header::CACHE_CONTROL, policy.cache_control())],
        Json(ModelsResponse { results, ok: true }),
    ))
}

/// GET /models/search - Public catalog search (not cached).
pub async fn search(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<ModelsResponse>, ApiError> {
    let text = query
        .q
        .as_deref()
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .ok_or(ApiError::MissingParam("q"))?;
    let limit = clamp_limit(query.limit, DEFAULT_SEARCH_LIMIT);

    let results = state.catalog.search_models(text, limit).await?;
    tracing::debug!(query = %text, count = results.len(), "Search complete");

    state.usage.record(
        UsageAction::Search,
        json!({ "query": text, "resultCount": results.len() }),
    );

    Ok(Json(ModelsResponse { results, ok: true }))
}

/// GET /model/:id - Model metadata with material and texture lists (cached).
pub async fn structure(
    State(state): State<AppState>,
    Path(model_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let policy = state.config.model_policy();
    let key = DiskCache::generate_key(&["model", &model_id]);

    let catalog = state.catalog.clone();
    let id = model_id.clone();
    let structure: ModelStructure = state
        .cache
        .fetch_with_revalidate(&key, policy, move || async move {
            let found = catalog.get_model(&id).await;
            match found {
                Ok(Some(model)) => Ok(ModelStructure {
                    model,
                    materials: Vec::new(),
                    textures: Vec::new(),
                }),
                Ok(None) => Err(ApiError::ModelNotFound(id)),
                Err(e) => Err(ApiError::from(e)),
            }
        })
        .await?;

    state.usage.record(
        UsageAction::MaterialsFetch,
        json!({ "modelId": model_id, "materialCount": structure.materials.len() }),
    );

    Ok((
        [(header::CACHE_CONTROL, policy.cache_control())],
        Json(ModelStructureResponse { structure, ok: true }),
    ))
}
