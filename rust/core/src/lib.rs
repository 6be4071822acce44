// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # Configurator Core
//!
//! State behind a browser-side 3D product configurator: pick a model from
//! the catalog, inspect the material channels the embedded viewer reports,
//! and swap colors or textures on the live render.
//!
//! ## Overview
//!
//! - **Channel Registry**: classifies channels as texture-, color-driven or
//!   unset and is the only write path for channel edits
//! - **Viewer Session**: one viewer resource per bound model, with stale
//!   callbacks of superseded binds discarded by generation
//! - **Selection Store**: model ⊇ material ⊇ texture selection, model id
//!   persisted across reloads
//! - **Catalog**: contract for the remote model catalog
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use configurator_core::{Configurator, Page, SelectionStore, SessionConfig, ViewerSession, PRIMARY_CHANNEL};
//!
//! let session = ViewerSession::new(runtime, SessionConfig::default());
//! let configurator = Configurator::new(catalog, session, SelectionStore::new());
//!
//! if let Some(model_id) = configurator.load_models(Page::default()).await {
//!     configurator.select_model(&model_id).await?;
//! }
//! configurator.select_material("mat1");
//! let outcome = configurator.change_color(PRIMARY_CHANNEL, [0.1, 0.1, 0.1]).await;
//! ```

pub mod catalog;
pub mod channel;
pub mod configurator;
pub mod error;
pub mod material;
pub mod model;
pub mod registry;
pub mod selection;
pub mod session;
pub mod viewer;

pub use catalog::{get_model_or_none, list_models_or_empty, search_models_or_empty, Catalog, CatalogError};
pub use channel::{
    available_color_channels, derive_channel_view, list_texture_channels, palette_match, ChannelMode, ChannelView,
    ColorOption, TextureBinding, TextureChannel, PALETTE, PRIMARY_CHANNEL, SECONDARY_COLOR_CHANNELS,
};
pub use configurator::Configurator;
pub use error::{Error, Result};
pub use material::{Channel, ChannelMap, Material, Rgb, StateSetId, Texture, TextureImage, TextureRef, UvTransform};
pub use model::{Model, Page, Thumbnail, ThumbnailImage, Thumbnails};
pub use registry::{with_color, with_texture, ChangeOutcome, ChannelRegistry};
pub use selection::{
    DiskStorage, MemoryStorage, PersistedSelection, Selection, SelectionStorage, SelectionStore, STORAGE_KEY,
};
pub use session::{BindOutcome, MaterialSnapshot, ReadyHandle, SessionConfig, SessionState, ViewerSession};
pub use viewer::{
    embed_url, Callback, EmbedOptions, InitOptions, Listener, ViewerApi, ViewerClient, ViewerEvent, ViewerFault,
    ViewerRuntime,
};
