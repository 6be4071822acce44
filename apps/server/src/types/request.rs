// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Query parameters accepted by the API.

use serde::Deserialize;

/// Search page size when the client sends no `limit`.
pub const DEFAULT_SEARCH_LIMIT: u32 = 24;

/// Upper bound on any page size forwarded upstream.
pub const MAX_LIMIT: u32 = 100;

/// `?limit&offset` for the model list.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

/// `?q&limit` for catalog search.
#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
    pub limit: Option<u32>,
}

/// Clamp a requested page size to `1..=MAX_LIMIT`, with `0` meaning the default.
pub fn clamp_limit(requested: Option<u32>, default: u32) -> u32 {
    match requested {
        None | Some(0) => default.clamp(1, MAX_LIMIT),
        Some(limit) => limit.min(MAX_LIMIT),
    }
}
