// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Catalog models.
//!
//! A [`Model`] is the coarse metadata the remote catalog returns for one
//! 3D asset. It is immutable once fetched; the list is replaced wholesale
//! whenever the catalog is refreshed.

use serde::{Deserialize, Serialize};

/// Remote 3D asset as listed by the catalog.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Model {
    /// Opaque catalog identifier.
    pub uid: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Single direct thumbnail, when the catalog provides one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<Thumbnail>,
    /// Thumbnail set at several resolutions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnails: Option<Thumbnails>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub viewer_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embed_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_downloadable: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub view_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub like_count: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Thumbnail {
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Thumbnails {
    #[serde(default)]
    pub images: Vec<ThumbnailImage>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThumbnailImage {
    pub url: String,
    #[serde(default)]
    pub width: u32,
    #[serde(default)]
    pub height: u32,
}

impl Model {
    /// Create a model with only an identifier and a name.
    pub fn new(uid: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            name: name.into(),
            ..Default::default()
        }
    }

    /// Pick the thumbnail to show in the model list.
    ///
    /// A direct thumbnail wins. Otherwise the medium-sized entry of the
    /// thumbnail set is used (middle element once sorted by width).
    pub fn thumbnail_url(&self) -> Option<&str> {
        if let Some(thumb) = &self.thumbnail {
            if !thumb.url.is_empty() {
                return Some(&thumb.url);
            }
        }

        let images = &self.thumbnails.as_ref()?.images;
        if images.is_empty() {
            return None;
        }

        let mut sorted: Vec<&ThumbnailImage> = images.iter().collect();
        sorted.sort_by_key(|img| img.width);
        let medium = sorted[sorted.len() / 2];
        if !medium.url.is_empty() {
            Some(&medium.url)
        } else {
            sorted.first().map(|img| img.url.as_str()).filter(|url| !url.is_empty())
        }
    }
}

/// Page request for the model list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub limit: u32,
    pub offset: u32,
}

impl Page {
    pub const DEFAULT_LIMIT: u32 = 50;

    pub fn new(limit: u32, offset: u32) -> Self {
        Self { limit, offset }
    }
}

impl Default for Page {
    fn default() -> Self {
        Self {
            limit: Self::DEFAULT_LIMIT,
            offset: 0,
        }
    }
}
