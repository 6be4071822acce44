// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Sketchfab REST catalog client.

use configurator_core::{Catalog, CatalogError, Model, Page};
use futures::future::BoxFuture;
use futures::FutureExt;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{StatusCode, Url};
use serde::Deserialize;
use std::time::Duration;

/// Catalog backed by the Sketchfab v3 API, authenticated with the
/// server-held token.
pub struct SketchfabCatalog {
    base_url: Url,
    api_key: Option<String>,
    http: reqwest::Client,
}

/// Catalog uids are short alphanumeric tokens. Anything else never reaches
/// the upstream, so a crafted id cannot address another endpoint.
fn is_valid_model_id(model_id: &str) -> bool {
    !model_id.is_empty()
        && model_id.len() <= 64
        && model_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

#[derive(Debug, Deserialize)]
struct ResultsPage {
    #[serde(default)]
    results: Vec<Model>,
}

impl SketchfabCatalog {
    /// Create a new catalog client.
    pub fn new(base_url: &str, api_key: Option<String>, timeout: Duration) -> Result<Self, CatalogError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CatalogError::Transport(format!("Client setup failed: {e}")))?;

        let base_url = Url::parse(base_url.trim_end_matches('/'))
            .map_err(|e| CatalogError::Transport(format!("Invalid catalog URL: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(CatalogError::Transport(format!("Invalid catalog URL: {base_url}")));
        }

        Ok(Self {
            base_url,
            api_key,
            http,
        })
    }

    /// Build authorization headers.
    fn auth_headers(&self) -> Result<HeaderMap, CatalogError> {
        let mut headers = HeaderMap::new();
        if let Some(key) = &self.api_key {
            headers.insert(
                AUTHORIZATION,
                HeaderValue::from_str(&format!("Token {}", key))
                    .map_err(|e| CatalogError::Transport(format!("Invalid token header: {e}")))?,
            );
        }
        Ok(headers)
    }

    /// Endpoint URL under the API root. Each segment is percent-encoded, so
    /// `/` inside a segment cannot change the path.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn get(&self, url: Url, query: &[(&str, String)]) -> Result<reqwest::Response, CatalogError> {
        tracing::debug!(url = %url, "Catalog request");
        self.http
            .get(url)
            .headers(self.auth_headers()?)
            .query(query)
            .send()
            .await
            .map_err(|e| CatalogError::Transport(e.to_string()))
    }

    async fn results(&self, url: Url, query: &[(&str, String)]) -> Result<Vec<Model>, CatalogError> {
        let resp = self.get(url, query).await?;
        if !resp.status().is_success() {
            return Err(CatalogError::Status(resp.status().as_u16()));
        }
        let page: ResultsPage = resp
            .json()
            .await
            .map_err(|e| CatalogError::Decode(e.to_string()))?;
        Ok(page.results)
    }
}

impl Catalog for SketchfabCatalog {
    fn list_models(&self, page: Page) -> BoxFuture<'_, Result<Vec<Model>, CatalogError>> {
        async move {
            self.results(
                self.endpoint(&["me", "models"]),
                &[("count", page.limit.to_string()), ("offset", page.offset.to_string())],
            )
            .await
        }
        .boxed()
    }

    fn get_model<'a>(&'a self, model_id: &'a str) -> BoxFuture<'a, Result<Option<Model>, CatalogError>> {
        async move {
            if !is_valid_model_id(model_id) {
                tracing::warn!(model_id, "Rejecting malformed model id");
                return Ok(None);
            }
            let resp = self.get(self.endpoint(&["models", model_id]), &[]).await?;
            match resp.status() {
                StatusCode::NOT_FOUND => Ok(None),
                status if status.is_success() => resp
                    .json::<Model>()
                    .await
                    .map(Some)
                    .map_err(|e| CatalogError::Decode(e.to_string())),
                status => Err(CatalogError::Status(status.as_u16())),
            }
        }
        .boxed()
    }

    fn search_models<'a>(&'a self, query: &'a str, limit: u32) -> BoxFuture<'a, Result<Vec<Model>, CatalogError>> {
        async move {
            self.results(
                self.endpoint(&["search"]),
                &[
                    ("type", "models".to_string()),
                    ("q", query.to_string()),
                    ("count", limit.to_string()),
                ],
            )
            .await
        }
        .boxed()
    }

    fn health_check(&self) -> BoxFuture<'_, bool> {
        async move {
            match self.get(self.endpoint(&["me"]), &[]).await {
                Ok(resp) => resp.status().is_success(),
                Err(e) => {
                    tracing::warn!(error = %e, "Catalog health check failed");
                    false
                }
            }
        }
        .boxed()
    }
}
