// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Contract of the external viewer runtime and its async adapter.
//!
//! The embedded viewer speaks in single-shot callbacks. [`ViewerRuntime`]
//! and [`ViewerApi`] describe that contract as-is; [`ViewerClient`] turns
//! each call into an `async fn` backed by a oneshot channel, so nothing
//! above the session ever handles a raw callback.

use crate::error::{Error, Result};
use crate::material::{Material, Texture};
use parking_lot::Mutex;
use serde::Serialize;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;

/// Error argument passed by the viewer to a callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewerFault(pub String);

impl fmt::Display for ViewerFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for ViewerFault {}

/// Single-shot completion callback.
pub type Callback<T> = Box<dyn FnOnce(std::result::Result<T, ViewerFault>) + Send + 'static>;

/// Event listener; may be invoked more than once.
pub type Listener = Box<dyn Fn() + Send + Sync + 'static>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewerEvent {
    ViewerReady,
}

impl ViewerEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            ViewerEvent::ViewerReady => "viewerready",
        }
    }
}

/// Handle to one live viewer resource.
pub trait ViewerApi: Send + Sync {
    fn start(&self);
    fn stop(&self);
    fn get_material_list(&self, callback: Callback<Vec<Material>>);
    fn set_material(&self, material: Material, callback: Callback<()>);
    fn get_texture_list(&self, callback: Callback<Vec<Texture>>);
    fn add_texture(&self, url: &str, callback: Callback<String>);
    fn update_texture(&self, url: &str, texture_uid: &str, callback: Callback<String>);
    fn add_event_listener(&self, event: ViewerEvent, listener: Listener);
}

/// Injected viewer script: creates viewer resources bound to a model.
pub trait ViewerRuntime: Send + Sync {
    /// Whether the external script has finished loading.
    fn is_loaded(&self) -> bool;

    fn init(&self, model_id: &str, options: &InitOptions, callback: Callback<Arc<dyn ViewerApi>>);
}

/// Options handed to the runtime's `init`. Defaults hide all viewer chrome.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InitOptions {
    pub autostart: u8,
    pub autospin: f32,
    pub ui_controls: u8,
    pub ui_infos: u8,
    pub ui_inspector: u8,
    pub ui_stop: u8,
    pub ui_help: u8,
    pub ui_settings: u8,
    pub ui_watermark: u8,
    pub ui_watermark_link: u8,
    pub ui_hint: u8,
    pub ui_annotations: u8,
    pub ui_vr: u8,
    pub ui_fullscreen: u8,
    pub ui_ar: u8,
    pub transparent: u8,
    pub preload: u8,
}

impl Default for InitOptions {
    fn default() -> Self {
        Self {
            autostart: 1,
            autospin: 0.1,
            ui_controls: 0,
            ui_infos: 0,
            ui_inspector: 0,
            ui_stop: 0,
            ui_help: 0,
            ui_settings: 0,
            ui_watermark: 0,
            ui_watermark_link: 0,
            ui_hint: 0,
            ui_annotations: 0,
            ui_vr: 0,
            ui_fullscreen: 0,
            ui_ar: 0,
            transparent: 0,
            preload: 1,
        }
    }
}

/// Options for the plain embed URL (no API access).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmbedOptions {
    pub autostart: bool,
    pub autospin: bool,
    pub hide_stop: bool,
}

impl Default for EmbedOptions {
    fn default() -> Self {
        Self {
            autostart: true,
            autospin: true,
            hide_stop: false,
        }
    }
}

/// Embed URL for a model.
pub fn embed_url(model_id: &str, options: &EmbedOptions) -> String {
    let mut params = Vec::new();
    if options.autostart {
        params.push("autostart=1");
    }
    if options.autospin {
        params.push("autospin=1");
    }
    if options.hide_stop {
        params.push("ui_stop=0");
    }

    let base = format!("https://sketchfab.com/models/{}/embed", model_id);
    if params.is_empty() {
        base
    } else {
        format!("{}?{}", base, params.join("&"))
    }
}

/// Async adapter over a [`ViewerApi`] handle.
#[derive(Clone)]
pub struct ViewerClient {
    api: Arc<dyn ViewerApi>,
    call_timeout: Option<Duration>,
}

impl fmt::Debug for ViewerClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewerClient")
            .field("call_timeout", &self.call_timeout)
            .finish_non_exhaustive()
    }
}

impl ViewerClient {
    pub fn new(api: Arc<dyn ViewerApi>, call_timeout: Option<Duration>) -> Self {
        Self { api, call_timeout }
    }

    pub fn start(&self) {
        self.api.start();
    }

    pub fn stop(&self) {
        self.api.stop();
    }

    pub async fn material_list(&self) -> Result<Vec<Material>> {
        self.call("getMaterialList", |cb| self.api.get_material_list(cb))
            .await
    }

    pub async fn set_material(&self, material: Material) -> Result<()> {
        self.call("setMaterial", |cb| self.api.set_material(material, cb))
            .await
    }

    pub async fn texture_list(&self) -> Result<Vec<Texture>> {
        self.call("getTextureList", |cb| self.api.get_texture_list(cb))
            .await
    }

    pub async fn add_texture(&self, url: &str) -> Result<String> {
        self.call("addTexture", |cb| self.api.add_texture(url, cb)).await
    }

    /// Replace the image behind `texture_uid`. Resolves to the uid the viewer
    /// reports, falling back to the requested one when it reports none.
    pub async fn update_texture(&self, url: &str, texture_uid: &str) -> Result<String> {
        let uid = self
            .call("updateTexture", |cb| self.api.update_texture(url, texture_uid, cb))
            .await?;
        if uid.is_empty() {
            Ok(texture_uid.to_string())
        } else {
            Ok(uid)
        }
    }

    /// Register for the ready event. The listener is attached immediately,
    /// so call this before [`ViewerClient::start`]; the returned future
    /// resolves once the event fires.
    pub fn ready(&self, timeout: Option<Duration>) -> impl Future<Output = Result<()>> + Send + 'static {
        let (tx, rx) = oneshot::channel::<()>();
        let slot = Mutex::new(Some(tx));
        self.api.add_event_listener(
            ViewerEvent::ViewerReady,
            Box::new(move || {
                if let Some(tx) = slot.lock().take() {
                    let _ = tx.send(());
                }
            }),
        );
        await_with_timeout(rx, timeout, "viewerready")
    }

    async fn call<T, F>(&self, op: &'static str, issue: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(Callback<T>),
    {
        let (tx, rx) = oneshot::channel();
        issue(Box::new(move |result| {
            let _ = tx.send(result);
        }));

        tracing::debug!(op, "Viewer call issued");
        match await_with_timeout(rx, self.call_timeout, op).await? {
            Ok(value) => Ok(value),
            Err(fault) => Err(Error::Viewer {
                op,
                message: fault.0,
            }),
        }
    }
}

/// Await a oneshot receiver, optionally bounded by a timeout.
pub(crate) async fn await_with_timeout<T>(
    rx: oneshot::Receiver<T>,
    timeout: Option<Duration>,
    op: &'static str,
) -> Result<T> {
    let received = match timeout {
        Some(limit) => tokio::time::timeout(limit, rx)
            .await
            .map_err(|_| Error::Timeout(op))?,
        None => rx.await,
    };
    received.map_err(|_| Error::CallbackDropped(op))
}
