// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Channel classification.
//!
//! Decides, for one channel of one material, whether it is currently
//! texture-driven, color-driven or unset. A non-empty texture uid always
//! wins over a color; the color is only a display fallback.
//!
//! Views are plain values computed on demand from the current material and
//! texture list. Nothing here is cached, so a material change can never
//! show the previous material's mode.

use crate::material::{Material, Rgb, Texture};
use serde::Serialize;

/// Channel with the dedicated color/texture toggle.
pub const PRIMARY_CHANNEL: &str = "AlbedoPBR";

/// Secondary channels offered for plain color edits, in display order.
pub const SECONDARY_COLOR_CHANNELS: [&str; 3] = ["DiffusePBR", "SpecularColor", "DiffuseColor"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelMode {
    Texture,
    Color,
    Unset,
}

/// Texture bound to a channel, resolved against the enumerated texture list.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TextureBinding {
    Known { texture: Texture },
    /// The viewer reported a uid that is not in the texture list.
    Unknown { uid: String },
}

impl TextureBinding {
    pub fn uid(&self) -> &str {
        match self {
            TextureBinding::Known { texture } => &texture.uid,
            TextureBinding::Unknown { uid } => uid,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            TextureBinding::Known { texture } => texture.display_name(),
            TextureBinding::Unknown { .. } => "unknown texture",
        }
    }
}

/// Classified state of one configurable channel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChannelView {
    pub channel: String,
    pub mode: ChannelMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_color: Option<Rgb>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_texture: Option<TextureBinding>,
}

/// Entry of the generic texture-channel list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextureChannel {
    pub name: String,
    pub current_texture_uid: String,
}

/// Classify `channel` on `material`.
///
/// Returns `None` when the material has no such channel; callers suppress
/// the channel's UI in that case.
pub fn derive_channel_view(material: &Material, channel: &str, textures: &[Texture]) -> Option<ChannelView> {
    let ch = material.channel(channel)?;

    let view = if let Some(uid) = ch.texture_uid() {
        let binding = match textures.iter().find(|tex| tex.uid == uid) {
            Some(texture) => TextureBinding::Known {
                texture: texture.clone(),
            },
            None => TextureBinding::Unknown { uid: uid.to_string() },
        };
        ChannelView {
            channel: channel.to_string(),
            mode: ChannelMode::Texture,
            active_color: None,
            active_texture: Some(binding),
        }
    } else if let Some(color) = ch.color {
        ChannelView {
            channel: channel.to_string(),
            mode: ChannelMode::Color,
            active_color: Some(color),
            active_texture: None,
        }
    } else {
        ChannelView {
            channel: channel.to_string(),
            mode: ChannelMode::Unset,
            active_color: None,
            active_texture: None,
        }
    };

    Some(view)
}

/// Channels with a bound texture, in channel-map order, primary channel excluded.
pub fn list_texture_channels(material: &Material) -> Vec<TextureChannel> {
    material
        .channels
        .iter()
        .filter(|(name, _)| *name != PRIMARY_CHANNEL)
        .filter_map(|(name, ch)| {
            ch.texture_uid().map(|uid| TextureChannel {
                name: name.to_string(),
                current_texture_uid: uid.to_string(),
            })
        })
        .collect()
}

/// Secondary color channels present on the material and not texture-bound.
pub fn available_color_channels(material: &Material) -> Vec<&'static str> {
    SECONDARY_COLOR_CHANNELS
        .iter()
        .copied()
        .filter(|name| {
            material
                .channel(name)
                .is_some_and(|ch| ch.texture_uid().is_none())
        })
        .collect()
}

/// Swatch offered by the color pickers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ColorOption {
    pub name: &'static str,
    pub color: Rgb,
    pub hex: &'static str,
}

pub const PALETTE: [ColorOption; 8] = [
    ColorOption { name: "Nero", color: [0.1, 0.1, 0.1], hex: "#1a1a1a" },
    ColorOption { name: "Marrone", color: [0.36, 0.25, 0.2], hex: "#5c4033" },
    ColorOption { name: "Grigio", color: [0.42, 0.45, 0.5], hex: "#6b7280" },
    ColorOption { name: "Blu", color: [0.12, 0.25, 0.69], hex: "#1e40af" },
    ColorOption { name: "Rosso", color: [0.7, 0.15, 0.15], hex: "#b32626" },
    ColorOption { name: "Verde", color: [0.15, 0.5, 0.25], hex: "#268040" },
    ColorOption { name: "Beige", color: [0.83, 0.65, 0.46], hex: "#d4a574" },
    ColorOption { name: "Bianco", color: [0.9, 0.9, 0.9], hex: "#e6e6e6" },
];

/// Palette entry whose color matches `color` exactly.
pub fn palette_match(color: &Rgb) -> Option<&'static ColorOption> {
    PALETTE.iter().find(|opt| &opt.color == color)
}
