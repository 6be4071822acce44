// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Configurator facade: catalog, selection store, viewer session and
//! channel registry wired together the way the sidebar and viewer use them.
//!
//! The facade is a cheaply cloneable handle; overlapping model selections
//! may be in flight at once and only the current bind reconciles the
//! selection.

use crate::catalog::{self, Catalog};
use crate::channel::{self, ChannelView, TextureChannel, PRIMARY_CHANNEL};
use crate::error::Result;
use crate::material::{Material, Rgb, Texture};
use crate::model::{Model, Page};
use crate::registry::{ChangeOutcome, ChannelRegistry};
use crate::selection::{Selection, SelectionStore};
use crate::session::{BindOutcome, SessionState, ViewerSession};
use parking_lot::Mutex;
use std::sync::Arc;

#[derive(Clone)]
pub struct Configurator {
    catalog: Arc<dyn Catalog>,
    store: Arc<Mutex<SelectionStore>>,
    registry: ChannelRegistry,
    models: Arc<Mutex<Vec<Model>>>,
}

impl Configurator {
    pub fn new(catalog: Arc<dyn Catalog>, session: ViewerSession, store: SelectionStore) -> Self {
        Self {
            catalog,
            store: Arc::new(Mutex::new(store)),
            registry: ChannelRegistry::new(session),
            models: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn models(&self) -> Vec<Model> {
        self.models.lock().clone()
    }

    pub fn selection(&self) -> Selection {
        self.store.lock().selection().clone()
    }

    pub fn registry(&self) -> &ChannelRegistry {
        &self.registry
    }

    pub fn session(&self) -> &ViewerSession {
        self.registry.session()
    }

    /// Whether the view should show loading placeholders.
    pub fn is_loading(&self) -> bool {
        self.session().state() == SessionState::Initializing
    }

    /// Replace the model list. When nothing is selected yet the first model
    /// is selected; returns the model id that should be bound, if any.
    pub async fn load_models(&self, page: Page) -> Option<String> {
        let models = catalog::list_models_or_empty(self.catalog.as_ref(), page).await;
        tracing::info!(count = models.len(), "Loaded model list");
        let first = models.first().map(|m| m.uid.clone());
        *self.models.lock() = models;

        let mut store = self.store.lock();
        if store.model_id().is_none() {
            if let Some(first) = first {
                tracing::debug!(model_id = %first, "Auto-selecting first model");
                store.select_model(first);
            }
        }
        store.model_id().map(str::to_string)
    }

    pub async fn search_models(&self, query: &str, limit: u32) -> Vec<Model> {
        catalog::search_models_or_empty(self.catalog.as_ref(), query, limit).await
    }

    /// Select `model_id` and bind it to the viewer session.
    pub async fn select_model(&self, model_id: &str) -> Result<BindOutcome> {
        self.store.lock().select_model(model_id);
        self.bind_selected().await
    }

    /// Bind whatever model is currently selected (e.g. one restored from storage).
    ///
    /// With nothing selected the session is torn down and the outcome is
    /// [`BindOutcome::Unbound`].
    pub async fn bind_selected(&self) -> Result<BindOutcome> {
        let Some(model_id) = self.model_id() else {
            self.session().teardown();
            return Ok(BindOutcome::Unbound);
        };
        let outcome = self.session().bind(&model_id).await?;
        if let BindOutcome::Ready { .. } = outcome {
            self.reconcile_selection();
        }
        Ok(outcome)
    }

    pub fn clear_model(&self) {
        self.store.lock().clear_model();
        self.session().teardown();
    }

    /// Select a material from the current snapshot. Unknown ids are ignored.
    pub fn select_material(&self, material_id: &str) -> bool {
        if self.registry.material(material_id).is_none() {
            tracing::warn!(material_id, "Cannot select unknown material");
            return false;
        }
        self.store.lock().select_material(material_id)
    }

    /// Select a texture for the selected material; ignored without one.
    pub fn select_texture(&self, texture_id: &str) -> bool {
        self.store.lock().select_texture(texture_id)
    }

    /// Drop a material selection that no longer exists in the snapshot.
    pub fn reconcile_selection(&self) {
        let mut store = self.store.lock();
        if let Some(material_id) = store.material_id() {
            if self.registry.material(material_id).is_none() {
                tracing::debug!(material_id, "Selected material not in snapshot, clearing");
                store.clear_material();
            }
        }
    }

    pub fn materials(&self) -> Vec<Material> {
        self.registry.materials()
    }

    pub fn textures(&self) -> Vec<Texture> {
        self.registry.textures()
    }

    pub fn selected_material(&self) -> Option<Material> {
        self.material_id().and_then(|id| self.registry.material(&id))
    }

    pub fn channel_view(&self, channel: &str) -> Option<ChannelView> {
        let material_id = self.material_id()?;
        self.registry.channel_view(&material_id, channel)
    }

    /// View of the primary channel; `None` hides the color/texture toggle.
    pub fn primary_view(&self) -> Option<ChannelView> {
        self.channel_view(PRIMARY_CHANNEL)
    }

    pub fn texture_channels(&self) -> Vec<TextureChannel> {
        self.material_id()
            .map(|id| self.registry.texture_channels(&id))
            .unwrap_or_default()
    }

    pub fn color_channels(&self) -> Vec<&'static str> {
        self.selected_material()
            .map(|material| channel::available_color_channels(&material))
            .unwrap_or_default()
    }

    pub async fn change_color(&self, channel: &str, rgb: Rgb) -> ChangeOutcome {
        let Some(material_id) = self.material_id() else {
            tracing::warn!(channel, "No material selected");
            return ChangeOutcome::NotReady;
        };
        self.registry.change_color(&material_id, channel, rgb).await
    }

    /// Bind `texture_uid` to `channel` and, once applied, select it if the
    /// same material is still selected.
    pub async fn change_texture(&self, channel: &str, texture_uid: &str) -> ChangeOutcome {
        let Some(material_id) = self.material_id() else {
            tracing::warn!(channel, "No material selected");
            return ChangeOutcome::NotReady;
        };
        let outcome = self
            .registry
            .change_texture(&material_id, channel, texture_uid)
            .await;
        if outcome.is_applied() {
            let mut store = self.store.lock();
            if store.material_id() == Some(material_id.as_str()) {
                store.select_texture(texture_uid);
            }
        }
        outcome
    }

    fn model_id(&self) -> Option<String> {
        self.store.lock().model_id().map(str::to_string)
    }

    fn material_id(&self) -> Option<String> {
        self.store.lock().material_id().map(str::to_string)
    }
}
