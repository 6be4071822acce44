// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Asset catalog contract.
//!
//! Implementations talk to the remote catalog and may fail. The
//! `*_or_empty` helpers are what the configurator uses: a failed catalog
//! read is logged and degrades to an empty list or `None`.

use crate::model::{Model, Page};
use futures::future::BoxFuture;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum CatalogError {
    #[error("Catalog request failed: {0}")]
    Transport(String),

    #[error("Catalog returned status {0}")]
    Status(u16),

    #[error("Invalid catalog response: {0}")]
    Decode(String),
}

/// Read access to the remote model catalog.
pub trait Catalog: Send + Sync {
    fn list_models(&self, page: Page) -> BoxFuture<'_, Result<Vec<Model>, CatalogError>>;

    /// `Ok(None)` when the catalog has no such model.
    fn get_model<'a>(&'a self, model_id: &'a str) -> BoxFuture<'a, Result<Option<Model>, CatalogError>>;

    fn search_models<'a>(&'a self, query: &'a str, limit: u32) -> BoxFuture<'a, Result<Vec<Model>, CatalogError>>;

    fn health_check(&self) -> BoxFuture<'_, bool>;
}

pub async fn list_models_or_empty(catalog: &dyn Catalog, page: Page) -> Vec<Model> {
    match catalog.list_models(page).await {
        Ok(models) => models,
        Err(err) => {
            tracing::warn!(error = %err, limit = page.limit, offset = page.offset, "Model list unavailable");
            Vec::new()
        }
    }
}

pub async fn get_model_or_none(catalog: &dyn Catalog, model_id: &str) -> Option<Model> {
    match catalog.get_model(model_id).await {
        Ok(model) => model,
        Err(err) => {
            tracing::warn!(error = %err, model_id, "Model metadata unavailable");
            None
        }
    }
}

pub async fn search_models_or_empty(catalog: &dyn Catalog, query: &str, limit: u32) -> Vec<Model> {
    match catalog.search_models(query, limit).await {
        Ok(models) => models,
        Err(err) => {
            tracing::warn!(error = %err, query, "Model search unavailable");
            Vec::new()
        }
    }
}
