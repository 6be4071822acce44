// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Channel registry: the single write path for channel appearance.
//!
//! Every mutation builds the updated material, sends it to the viewer and
//! only after the viewer acknowledges it replaces that material in the
//! session snapshot (matched by state-set id). The acknowledgement is
//! applied only if the bind that issued the call is still current.
//!
//! Failures never escape as errors: each mutation resolves to a
//! [`ChangeOutcome`] the caller uses to keep the previous state visible.

use crate::channel::{self, ChannelView, TextureChannel};
use crate::error::Error;
use crate::material::{Material, Rgb, Texture, TextureRef};
use crate::session::{ReadyHandle, ViewerSession};

/// Result of a registry mutation.
#[derive(Debug, Clone, PartialEq)]
pub enum ChangeOutcome<T = Material> {
    /// The viewer acknowledged and the local snapshot was updated.
    Applied(T),
    /// No ready viewer session (user acted before readiness).
    NotReady,
    /// The material id is not in the current snapshot.
    UnknownMaterial,
    /// The material has no such channel.
    NotConfigurable,
    /// The acknowledgement arrived after a newer bind; nothing was applied.
    Stale,
    /// The viewer reported an error or did not answer in time.
    Failed(Error),
}

impl<T> ChangeOutcome<T> {
    pub fn is_applied(&self) -> bool {
        matches!(self, ChangeOutcome::Applied(_))
    }

    pub fn applied(self) -> Option<T> {
        match self {
            ChangeOutcome::Applied(value) => Some(value),
            _ => None,
        }
    }
}

/// Copy of `material` with `channel` switched to `rgb` in color mode.
///
/// Any bound texture is cleared so the mode flips deterministically.
/// Returns `None` if the channel does not exist.
pub fn with_color(material: &Material, channel: &str, rgb: Rgb) -> Option<Material> {
    let mut updated = material.clone();
    let ch = updated.channels.get_mut(channel)?;
    ch.color = Some(rgb);
    ch.texture = None;
    Some(updated)
}

/// Copy of `material` with `channel` bound to `texture_uid`.
///
/// Sampling settings on an existing texture reference are kept and the
/// color is left as-is (texture takes priority when classified).
pub fn with_texture(material: &Material, channel: &str, texture_uid: &str) -> Option<Material> {
    let mut updated = material.clone();
    let ch = updated.channels.get_mut(channel)?;
    match ch.texture.as_mut() {
        Some(texture) => texture.uid = texture_uid.to_string(),
        None => ch.texture = Some(TextureRef::new(texture_uid)),
    }
    Some(updated)
}

/// Reads and mutates material channels through an injected session.
#[derive(Clone)]
pub struct ChannelRegistry {
    session: ViewerSession,
}

impl ChannelRegistry {
    pub fn new(session: ViewerSession) -> Self {
        Self { session }
    }

    pub fn session(&self) -> &ViewerSession {
        &self.session
    }

    pub fn materials(&self) -> Vec<Material> {
        self.session
            .snapshot()
            .map(|snap| snap.materials)
            .unwrap_or_default()
    }

    pub fn textures(&self) -> Vec<Texture> {
        self.session
            .snapshot()
            .map(|snap| snap.textures)
            .unwrap_or_default()
    }

    pub fn material(&self, material_id: &str) -> Option<Material> {
        self.session
            .snapshot()
            .and_then(|snap| snap.material(material_id).cloned())
    }

    /// Classify `channel` of the material as it is in the snapshot right now.
    pub fn channel_view(&self, material_id: &str, channel: &str) -> Option<ChannelView> {
        let snap = self.session.snapshot()?;
        let material = snap.material(material_id)?;
        channel::derive_channel_view(material, channel, &snap.textures)
    }

    pub fn texture_channels(&self, material_id: &str) -> Vec<TextureChannel> {
        self.material(material_id)
            .map(|material| channel::list_texture_channels(&material))
            .unwrap_or_default()
    }

    pub async fn change_color(&self, material_id: &str, channel: &str, rgb: Rgb) -> ChangeOutcome {
        self.apply("change_color", material_id, channel, |material| {
            with_color(material, channel, rgb)
        })
        .await
    }

    pub async fn change_texture(&self, material_id: &str, channel: &str, texture_uid: &str) -> ChangeOutcome {
        self.apply("change_texture", material_id, channel, |material| {
            with_texture(material, channel, texture_uid)
        })
        .await
    }

    /// Upload a new texture image; the texture list is refreshed on success.
    pub async fn add_texture(&self, url: &str) -> ChangeOutcome<String> {
        let Some(handle) = self.ready("add_texture") else {
            return ChangeOutcome::NotReady;
        };
        match handle.client.add_texture(url).await {
            Ok(uid) => self.after_texture_upload(&handle, uid).await,
            Err(err) => {
                tracing::error!(url, error = %err, "Failed to add texture");
                ChangeOutcome::Failed(err)
            }
        }
    }

    /// Replace the image behind an existing texture uid.
    pub async fn update_texture(&self, url: &str, texture_uid: &str) -> ChangeOutcome<String> {
        let Some(handle) = self.ready("update_texture") else {
            return ChangeOutcome::NotReady;
        };
        match handle.client.update_texture(url, texture_uid).await {
            Ok(uid) => self.after_texture_upload(&handle, uid).await,
            Err(err) => {
                tracing::error!(url, texture_uid, error = %err, "Failed to update texture");
                ChangeOutcome::Failed(err)
            }
        }
    }

    /// Re-read the material list from the viewer and replace the snapshot's list.
    pub async fn refresh_materials(&self) -> ChangeOutcome<usize> {
        let Some(handle) = self.ready("refresh_materials") else {
            return ChangeOutcome::NotReady;
        };
        match handle.client.material_list().await {
            Ok(materials) => {
                let count = materials.len();
                if self
                    .session
                    .update_snapshot(handle.generation, |snap| snap.materials = materials)
                {
                    ChangeOutcome::Applied(count)
                } else {
                    ChangeOutcome::Stale
                }
            }
            Err(err) => {
                tracing::error!(error = %err, "Failed to refresh materials");
                ChangeOutcome::Failed(err)
            }
        }
    }

    async fn after_texture_upload(&self, handle: &ReadyHandle, uid: String) -> ChangeOutcome<String> {
        match handle.client.texture_list().await {
            Ok(textures) => {
                if self
                    .session
                    .update_snapshot(handle.generation, |snap| snap.textures = textures)
                {
                    ChangeOutcome::Applied(uid)
                } else {
                    ChangeOutcome::Stale
                }
            }
            Err(err) => {
                tracing::error!(error = %err, "Failed to refresh textures");
                ChangeOutcome::Failed(err)
            }
        }
    }

    fn ready(&self, op: &'static str) -> Option<ReadyHandle> {
        let handle = self.session.ready_handle();
        if handle.is_none() {
            tracing::warn!(op, "Viewer not ready, ignoring");
        }
        handle
    }

    async fn apply<F>(&self, op: &'static str, material_id: &str, channel: &str, build: F) -> ChangeOutcome
    where
        F: FnOnce(&Material) -> Option<Material>,
    {
        let Some(handle) = self.ready(op) else {
            return ChangeOutcome::NotReady;
        };
        let Some(current) = self.session.snapshot().and_then(|snap| snap.material(material_id).cloned()) else {
            tracing::warn!(op, material_id, "Unknown material");
            return ChangeOutcome::UnknownMaterial;
        };
        let Some(updated) = build(&current) else {
            tracing::warn!(op, material_id, channel, "Channel not present on material");
            return ChangeOutcome::NotConfigurable;
        };

        if let Err(err) = handle.client.set_material(updated.clone()).await {
            tracing::error!(op, material_id, channel, error = %err, "Viewer rejected material update");
            return ChangeOutcome::Failed(err);
        }

        let replaced = {
            let updated = updated.clone();
            let mut found = false;
            let current_bind = self.session.update_snapshot(handle.generation, |snap| {
                found = snap.replace_material(updated);
            });
            current_bind && found
        };

        if replaced {
            tracing::debug!(op, material_id, channel, "Material updated");
            ChangeOutcome::Applied(updated)
        } else {
            tracing::debug!(op, material_id, "Dropping acknowledgement of superseded bind");
            ChangeOutcome::Stale
        }
    }
}
