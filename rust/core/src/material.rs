// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Materials, channels and textures as reported by the embedded viewer.
//!
//! The JSON shape is owned by the viewer, so field names follow it
//! (`stateSetID`, `enable`, `UVTransforms`, ...). Fields this crate does not
//! model are kept in `extra` maps and written back untouched, which keeps a
//! `setMaterial` round trip lossless.

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::fmt;

/// Normalized RGB triple, each component in `[0, 1]`.
pub type Rgb = [f64; 3];

/// Sync key of a material with the viewer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StateSetId {
    Number(i64),
    Text(String),
}

impl fmt::Display for StateSetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StateSetId::Number(n) => write!(f, "{}", n),
            StateSetId::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for StateSetId {
    fn from(value: i64) -> Self {
        StateSetId::Number(value)
    }
}

impl From<&str> for StateSetId {
    fn from(value: &str) -> Self {
        StateSetId::Text(value.to_string())
    }
}

/// One shading definition on the bound model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "stateSetID")]
    pub state_set_id: StateSetId,
    #[serde(default)]
    pub channels: ChannelMap,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Material {
    pub fn new(id: impl Into<String>, name: impl Into<String>, state_set_id: impl Into<StateSetId>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            state_set_id: state_set_id.into(),
            channels: ChannelMap::default(),
            extra: Map::new(),
        }
    }

    /// Builder-style channel insertion.
    pub fn with_channel(mut self, name: impl Into<String>, channel: Channel) -> Self {
        self.channels.insert(name, channel);
        self
    }

    pub fn channel(&self, name: &str) -> Option<&Channel> {
        self.channels.get(name)
    }
}

/// Channel map that keeps the order in which the viewer reported channels.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ChannelMap {
    entries: Vec<(String, Channel)>,
}

impl ChannelMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&Channel> {
        self.entries.iter().find(|(key, _)| key == name).map(|(_, ch)| ch)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Channel> {
        self.entries
            .iter_mut()
            .find(|(key, _)| key == name)
            .map(|(_, ch)| ch)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Insert or replace a channel. Replacing keeps the original position.
    pub fn insert(&mut self, name: impl Into<String>, channel: Channel) -> Option<Channel> {
        let name = name.into();
        match self.get_mut(&name) {
            Some(existing) => Some(std::mem::replace(existing, channel)),
            None => {
                self.entries.push((name, channel));
                None
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Channel)> {
        self.entries.iter().map(|(name, ch)| (name.as_str(), ch))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }
}

impl FromIterator<(String, Channel)> for ChannelMap {
    fn from_iter<I: IntoIterator<Item = (String, Channel)>>(iter: I) -> Self {
        let mut map = ChannelMap::new();
        for (name, channel) in iter {
            map.insert(name, channel);
        }
        map
    }
}

impl Serialize for ChannelMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, channel) in &self.entries {
            map.serialize_entry(name, channel)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for ChannelMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ChannelMapVisitor;

        impl<'de> Visitor<'de> for ChannelMapVisitor {
            type Value = ChannelMap;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of channel name to channel")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<ChannelMap, A::Error> {
                let mut map = ChannelMap {
                    entries: Vec::with_capacity(access.size_hint().unwrap_or(0)),
                };
                while let Some((name, channel)) = access.next_entry::<String, Channel>()? {
                    map.insert(name, channel);
                }
                Ok(map)
            }
        }

        deserializer.deserialize_map(ChannelMapVisitor)
    }
}

/// A single color/texture slot of a material.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Channel {
    #[serde(rename = "enable", default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub factor: Option<f64>,
    /// Present only in color mode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<Rgb>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color_factor: Option<f64>,
    /// Present only in texture mode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub texture: Option<TextureRef>,
    /// Passed through unmodified.
    #[serde(rename = "UVTransforms", default, skip_serializing_if = "Option::is_none")]
    pub uv_transform: Option<UvTransform>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Channel {
    pub fn with_color(color: Rgb) -> Self {
        Self {
            enabled: Some(true),
            color: Some(color),
            ..Default::default()
        }
    }

    pub fn with_texture(uid: impl Into<String>) -> Self {
        Self {
            enabled: Some(true),
            texture: Some(TextureRef::new(uid)),
            ..Default::default()
        }
    }

    /// Uid of the bound texture, if it is a non-empty string.
    pub fn texture_uid(&self) -> Option<&str> {
        self.texture
            .as_ref()
            .map(|tex| tex.uid.as_str())
            .filter(|uid| !uid.is_empty())
    }
}

/// Reference from a channel to a texture, plus its sampling settings.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextureRef {
    #[serde(default)]
    pub uid: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mag_filter: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_filter: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wrap_s: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wrap_t: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tex_coord_unit: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub internal_format: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TextureRef {
    pub fn new(uid: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct UvTransform {
    #[serde(default)]
    pub offset: [f64; 2],
    #[serde(default)]
    pub rotation: f64,
    #[serde(default)]
    pub scale: [f64; 2],
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Reusable image asset owned by the bound model.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Texture {
    pub uid: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub images: Vec<TextureImage>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TextureImage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
    pub url: String,
    #[serde(default)]
    pub width: u32,
    #[serde(default)]
    pub height: u32,
}

impl Texture {
    pub fn new(uid: impl Into<String>, name: Option<&str>) -> Self {
        Self {
            uid: uid.into(),
            name: name.map(str::to_string),
            images: Vec::new(),
        }
    }

    /// Name to show on a swatch: the texture name, else a uid prefix.
    pub fn display_name(&self) -> &str {
        match self.name.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ => {
                let end = self
                    .uid
                    .char_indices()
                    .nth(12)
                    .map(|(idx, _)| idx)
                    .unwrap_or(self.uid.len());
                &self.uid[..end]
            }
        }
    }

    pub fn thumbnail_url(&self) -> Option<&str> {
        self.images.first().map(|img| img.url.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VIEWER_MATERIAL: &str = r#"{
        "id": "mat-1",
        "name": "Leather",
        "stateSetID": 7,
        "shadeless": false,
        "channels": {
            "SpecularPBR": {"enable": true, "factor": 0.5},
            "AlbedoPBR": {
                "enable": true,
                "factor": 1,
                "color": [0.5, 0.4, 0.3],
                "texture": {"uid": "tex-9", "magFilter": "LINEAR", "wrapS": "REPEAT", "texCoordUnit": 0, "flipY": true},
                "UVTransforms": {"offset": [0, 0], "rotation": 0, "scale": [1, 1]}
            },
            "NormalMap": {"enable": false, "texture": {"uid": ""}}
        }
    }"#;

    #[test]
    fn test_parse_viewer_material() {
        let material: Material = serde_json::from_str(VIEWER_MATERIAL).unwrap();
        assert_eq!(material.state_set_id, StateSetId::Number(7));
        assert_eq!(material.channels.len(), 3);

        let albedo = material.channel("AlbedoPBR").unwrap();
        assert_eq!(albedo.enabled, Some(true));
        assert_eq!(albedo.color, Some([0.5, 0.4, 0.3]));
        assert_eq!(albedo.texture_uid(), Some("tex-9"));
        let texture = albedo.texture.as_ref().unwrap();
        assert_eq!(texture.mag_filter.as_deref(), Some("LINEAR"));
        assert_eq!(texture.wrap_s.as_deref(), Some("REPEAT"));
        assert_eq!(texture.extra.get("flipY"), Some(&Value::Bool(true)));

        // Empty uid is not a bound texture
        assert_eq!(material.channel("NormalMap").unwrap().texture_uid(), None);
    }

    #[test]
    fn test_channel_order_preserved() {
        let material: Material = serde_json::from_str(VIEWER_MATERIAL).unwrap();
        let names: Vec<&str> = material.channels.names().collect();
        assert_eq!(names, vec!["SpecularPBR", "AlbedoPBR", "NormalMap"]);
    }

    #[test]
    fn test_unknown_fields_survive_round_trip() {
        let material: Material = serde_json::from_str(VIEWER_MATERIAL).unwrap();
        let written = serde_json::to_value(&material).unwrap();
        assert_eq!(written["shadeless"], Value::Bool(false));
        assert_eq!(written["stateSetID"], Value::from(7));
        assert_eq!(written["channels"]["AlbedoPBR"]["texture"]["flipY"], Value::Bool(true));
        assert_eq!(written["channels"]["AlbedoPBR"]["enable"], Value::Bool(true));
        assert!(written["channels"]["AlbedoPBR"]["UVTransforms"].is_object());
    }

    #[test]
    fn test_insert_replaces_in_place() {
        let mut map = ChannelMap::new();
        map.insert("A", Channel::with_color([0.1, 0.1, 0.1]));
        map.insert("B", Channel::with_color([0.2, 0.2, 0.2]));
        let previous = map.insert("A", Channel::with_texture("t"));
        assert!(previous.is_some());
        let names: Vec<&str> = map.names().collect();
        assert_eq!(names, vec!["A", "B"]);
        assert_eq!(map.get("A").unwrap().texture_uid(), Some("t"));
    }

    #[test]
    fn test_texture_display_name() {
        let named = Texture::new("0123456789abcdef", Some("Oak"));
        assert_eq!(named.display_name(), "Oak");
        let unnamed = Texture::new("0123456789abcdef", None);
        assert_eq!(unnamed.display_name(), "0123456789ab");
        let short = Texture::new("abc", Some(""));
        assert_eq!(short.display_name(), "abc");
    }

    #[test]
    fn test_string_state_set_id() {
        let material: Material =
            serde_json::from_str(r#"{"id": "m", "name": "n", "stateSetID": "set-a", "channels": {}}"#).unwrap();
        assert_eq!(material.state_set_id, StateSetId::Text("set-a".into()));
        assert_eq!(material.state_set_id.to_string(), "set-a");
    }
}
