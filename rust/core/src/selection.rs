// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Selection store.
//!
//! Holds which model, material and texture are selected. Selection narrows
//! top-down: changing or clearing the model clears material and texture,
//! changing or clearing the material clears the texture. Only the model id
//! is persisted.

use crate::error::Result;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Fixed key of the persisted selection entry.
pub const STORAGE_KEY: &str = "configurator-storage";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Selection {
    pub selected_model_id: Option<String>,
    pub selected_material_id: Option<String>,
    pub selected_texture_id: Option<String>,
}

/// The persisted subset of [`Selection`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedSelection {
    pub selected_model_id: Option<String>,
}

/// Key-value backend for the persisted selection.
pub trait SelectionStorage: Send + Sync {
    fn load(&self) -> Result<Option<PersistedSelection>>;
    fn save(&self, state: &PersistedSelection) -> Result<()>;
}

/// Stores the entry in an on-disk content cache.
#[derive(Debug, Clone)]
pub struct DiskStorage {
    dir: PathBuf,
}

impl DiskStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl SelectionStorage for DiskStorage {
    fn load(&self) -> Result<Option<PersistedSelection>> {
        match cacache::read_sync(&self.dir, STORAGE_KEY) {
            Ok(data) => Ok(Some(serde_json::from_slice(&data)?)),
            Err(cacache::Error::EntryNotFound(_, _)) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, state: &PersistedSelection) -> Result<()> {
        let data = serde_json::to_vec(state)?;
        cacache::write_sync(&self.dir, STORAGE_KEY, data)?;
        Ok(())
    }
}

/// In-process storage, used when nothing should outlive the process.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entry: Mutex<Option<PersistedSelection>>,
}

impl SelectionStorage for MemoryStorage {
    fn load(&self) -> Result<Option<PersistedSelection>> {
        Ok(self.entry.lock().clone())
    }

    fn save(&self, state: &PersistedSelection) -> Result<()> {
        *self.entry.lock() = Some(state.clone());
        Ok(())
    }
}

/// Synchronous selection container with optional persistence.
#[derive(Default)]
pub struct SelectionStore {
    selection: Selection,
    storage: Option<Box<dyn SelectionStorage>>,
}

impl SelectionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store backed by `storage`, restoring the persisted model id.
    ///
    /// An unreadable entry is logged and ignored; material and texture
    /// always start cleared.
    pub fn with_storage(storage: Box<dyn SelectionStorage>) -> Self {
        let restored = match storage.load() {
            Ok(entry) => entry.and_then(|e| e.selected_model_id),
            Err(err) => {
                tracing::warn!(error = %err, "Failed to restore selection");
                None
            }
        };
        if let Some(model_id) = &restored {
            tracing::debug!(model_id = %model_id, "Restored selected model");
        }
        Self {
            selection: Selection {
                selected_model_id: restored,
                ..Selection::default()
            },
            storage: Some(storage),
        }
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn model_id(&self) -> Option<&str> {
        self.selection.selected_model_id.as_deref()
    }

    pub fn material_id(&self) -> Option<&str> {
        self.selection.selected_material_id.as_deref()
    }

    pub fn texture_id(&self) -> Option<&str> {
        self.selection.selected_texture_id.as_deref()
    }

    pub fn select_model(&mut self, model_id: impl Into<String>) {
        self.selection = Selection {
            selected_model_id: Some(model_id.into()),
            selected_material_id: None,
            selected_texture_id: None,
        };
        self.persist();
    }

    /// Select a material of the selected model. Ignored (returns false)
    /// when no model is selected.
    pub fn select_material(&mut self, material_id: impl Into<String>) -> bool {
        let material_id = material_id.into();
        if self.selection.selected_model_id.is_none() {
            tracing::warn!(material_id = %material_id, "Cannot select a material without a model");
            return false;
        }
        self.selection.selected_material_id = Some(material_id);
        self.selection.selected_texture_id = None;
        true
    }

    /// Select a texture for the selected material. Ignored (returns false)
    /// when no material is selected.
    pub fn select_texture(&mut self, texture_id: impl Into<String>) -> bool {
        let texture_id = texture_id.into();
        if self.selection.selected_material_id.is_none() {
            tracing::warn!(texture_id = %texture_id, "Cannot select a texture without a material");
            return false;
        }
        self.selection.selected_texture_id = Some(texture_id);
        true
    }

    pub fn clear_model(&mut self) {
        self.reset();
    }

    pub fn clear_material(&mut self) {
        self.selection.selected_material_id = None;
        self.selection.selected_texture_id = None;
    }

    pub fn clear_texture(&mut self) {
        self.selection.selected_texture_id = None;
    }

    pub fn reset(&mut self) {
        self.selection = Selection::default();
        self.persist();
    }

    fn persist(&self) {
        let Some(storage) = &self.storage else {
            return;
        };
        let entry = PersistedSelection {
            selected_model_id: self.selection.selected_model_id.clone(),
        };
        if let Err(err) = storage.save(&entry) {
            tracing::warn!(error = %err, "Failed to persist selection");
        }
    }
}
