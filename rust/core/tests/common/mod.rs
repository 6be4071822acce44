// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Scripted viewer runtime and static catalog shared by the integration tests.

#![allow(dead_code)]

use configurator_core::{
    Callback, Catalog, CatalogError, Channel, InitOptions, Listener, Material, Model, Page, Texture, TextureImage,
    ViewerApi, ViewerEvent, ViewerFault, ViewerRuntime,
};
use futures::future::BoxFuture;
use futures::FutureExt;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

#[derive(Clone, Default)]
pub struct Scene {
    pub materials: Vec<Material>,
    pub textures: Vec<Texture>,
}

/// Viewer runtime whose `init` either completes immediately or is held
/// until the test releases it.
#[derive(Default)]
pub struct FakeRuntime {
    loaded: AtomicBool,
    hold_inits: AtomicBool,
    scenes: Mutex<HashMap<String, Scene>>,
    pending: Mutex<Vec<(String, Callback<Arc<dyn ViewerApi>>)>>,
    viewers: Mutex<Vec<Arc<FakeViewer>>>,
}

impl FakeRuntime {
    pub fn new() -> Self {
        let runtime = Self::default();
        runtime.loaded.store(true, Ordering::SeqCst);
        runtime
    }

    /// Runtime whose `init` callbacks wait for [`FakeRuntime::release`].
    pub fn held() -> Self {
        let runtime = Self::new();
        runtime.hold_inits.store(true, Ordering::SeqCst);
        runtime
    }

    pub fn with_scene(self, model_id: &str, materials: Vec<Material>, textures: Vec<Texture>) -> Self {
        self.scenes
            .lock()
            .insert(model_id.to_string(), Scene { materials, textures });
        self
    }

    pub fn set_loaded(&self, loaded: bool) {
        self.loaded.store(loaded, Ordering::SeqCst);
    }

    pub fn pending_count(&self) -> usize {
        self.pending.lock().len()
    }

    /// Complete the held `init` for `model_id`.
    pub fn release(&self, model_id: &str) {
        let callback = {
            let mut pending = self.pending.lock();
            let idx = pending
                .iter()
                .position(|(id, _)| id == model_id)
                .expect("no pending init for model");
            pending.remove(idx).1
        };
        self.complete(model_id, callback);
    }

    pub fn viewers(&self) -> Vec<Arc<FakeViewer>> {
        self.viewers.lock().clone()
    }

    pub fn viewer_for(&self, model_id: &str) -> Arc<FakeViewer> {
        self.viewers
            .lock()
            .iter()
            .rev()
            .find(|v| v.model_id == model_id)
            .cloned()
            .expect("no viewer for model")
    }

    /// Viewers started and not stopped.
    pub fn live_count(&self) -> usize {
        self.viewers.lock().iter().filter(|v| v.is_live()).count()
    }

    fn complete(&self, model_id: &str, callback: Callback<Arc<dyn ViewerApi>>) {
        let scene = self.scenes.lock().get(model_id).cloned();
        match scene {
            Some(scene) => {
                let viewer = Arc::new(FakeViewer::new(model_id, scene));
                self.viewers.lock().push(viewer.clone());
                callback(Ok(viewer));
            }
            None => callback(Err(ViewerFault(format!("model {} not found", model_id)))),
        }
    }
}

impl ViewerRuntime for FakeRuntime {
    fn is_loaded(&self) -> bool {
        self.loaded.load(Ordering::SeqCst)
    }

    fn init(&self, model_id: &str, _options: &InitOptions, callback: Callback<Arc<dyn ViewerApi>>) {
        if self.hold_inits.load(Ordering::SeqCst) {
            self.pending.lock().push((model_id.to_string(), callback));
        } else {
            self.complete(model_id, callback);
        }
    }
}

/// One viewer resource. Ready fires on `start`.
pub struct FakeViewer {
    pub model_id: String,
    materials: Mutex<Vec<Material>>,
    textures: Mutex<Vec<Texture>>,
    received: Mutex<Vec<Material>>,
    listeners: Mutex<Vec<Listener>>,
    held_acks: Mutex<Vec<Callback<()>>>,
    started: AtomicBool,
    stopped: AtomicBool,
    fail_set_material: AtomicBool,
    hold_acks: AtomicBool,
    material_list_calls: AtomicUsize,
    texture_list_calls: AtomicUsize,
    next_texture: AtomicUsize,
}

impl FakeViewer {
    fn new(model_id: &str, scene: Scene) -> Self {
        Self {
            model_id: model_id.to_string(),
            materials: Mutex::new(scene.materials),
            textures: Mutex::new(scene.textures),
            received: Mutex::new(Vec::new()),
            listeners: Mutex::new(Vec::new()),
            held_acks: Mutex::new(Vec::new()),
            started: AtomicBool::new(false),
            stopped: AtomicBool::new(false),
            fail_set_material: AtomicBool::new(false),
            hold_acks: AtomicBool::new(false),
            material_list_calls: AtomicUsize::new(0),
            texture_list_calls: AtomicUsize::new(0),
            next_texture: AtomicUsize::new(1),
        }
    }

    pub fn is_live(&self) -> bool {
        self.started.load(Ordering::SeqCst) && !self.stopped.load(Ordering::SeqCst)
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }

    pub fn received(&self) -> Vec<Material> {
        self.received.lock().clone()
    }

    pub fn fail_set_material(&self) {
        self.fail_set_material.store(true, Ordering::SeqCst);
    }

    pub fn hold_acks(&self) {
        self.hold_acks.store(true, Ordering::SeqCst);
    }

    pub fn held_ack_count(&self) -> usize {
        self.held_acks.lock().len()
    }

    pub fn release_acks(&self) {
        let acks: Vec<_> = self.held_acks.lock().drain(..).collect();
        for ack in acks {
            ack(Ok(()));
        }
    }

    pub fn material_list_calls(&self) -> usize {
        self.material_list_calls.load(Ordering::SeqCst)
    }

    pub fn texture_list_calls(&self) -> usize {
        self.texture_list_calls.load(Ordering::SeqCst)
    }

    pub fn replace_materials(&self, materials: Vec<Material>) {
        *self.materials.lock() = materials;
    }
}

impl ViewerApi for FakeViewer {
    fn start(&self) {
        self.started.store(true, Ordering::SeqCst);
        for listener in self.listeners.lock().iter() {
            listener();
        }
    }

    fn stop(&self) {
        self.stopped.store(true, Ordering::SeqCst);
    }

    fn get_material_list(&self, callback: Callback<Vec<Material>>) {
        self.material_list_calls.fetch_add(1, Ordering::SeqCst);
        callback(Ok(self.materials.lock().clone()));
    }

    fn set_material(&self, material: Material, callback: Callback<()>) {
        self.received.lock().push(material.clone());
        if self.fail_set_material.load(Ordering::SeqCst) {
            callback(Err(ViewerFault("material rejected".into())));
            return;
        }
        {
            let mut materials = self.materials.lock();
            if let Some(slot) = materials
                .iter_mut()
                .find(|m| m.state_set_id == material.state_set_id)
            {
                *slot = material;
            }
        }
        if self.hold_acks.load(Ordering::SeqCst) {
            self.held_acks.lock().push(callback);
        } else {
            callback(Ok(()));
        }
    }

    fn get_texture_list(&self, callback: Callback<Vec<Texture>>) {
        self.texture_list_calls.fetch_add(1, Ordering::SeqCst);
        callback(Ok(self.textures.lock().clone()));
    }

    fn add_texture(&self, url: &str, callback: Callback<String>) {
        let uid = format!("uploaded-{}", self.next_texture.fetch_add(1, Ordering::SeqCst));
        self.textures.lock().push(Texture {
            uid: uid.clone(),
            name: None,
            images: vec![TextureImage {
                uid: None,
                url: url.to_string(),
                width: 512,
                height: 512,
            }],
        });
        callback(Ok(uid));
    }

    fn update_texture(&self, url: &str, texture_uid: &str, callback: Callback<String>) {
        let mut textures = self.textures.lock();
        match textures.iter_mut().find(|t| t.uid == texture_uid) {
            Some(texture) => {
                texture.images = vec![TextureImage {
                    uid: None,
                    url: url.to_string(),
                    width: 512,
                    height: 512,
                }];
                drop(textures);
                callback(Ok(texture_uid.to_string()));
            }
            None => {
                drop(textures);
                callback(Err(ViewerFault(format!("texture {} not found", texture_uid))));
            }
        }
    }

    fn add_event_listener(&self, event: ViewerEvent, listener: Listener) {
        assert_eq!(event, ViewerEvent::ViewerReady);
        self.listeners.lock().push(listener);
    }
}

/// Catalog serving a fixed model list.
pub struct StaticCatalog {
    pub models: Vec<Model>,
    pub offline: bool,
}

impl StaticCatalog {
    pub fn new(ids: &[&str]) -> Self {
        Self {
            models: ids.iter().map(|id| Model::new(*id, id.to_uppercase())).collect(),
            offline: false,
        }
    }

    pub fn offline() -> Self {
        Self {
            models: Vec::new(),
            offline: true,
        }
    }
}

impl Catalog for StaticCatalog {
    fn list_models(&self, page: Page) -> BoxFuture<'_, Result<Vec<Model>, CatalogError>> {
        async move {
            if self.offline {
                return Err(CatalogError::Transport("offline".into()));
            }
            Ok(self
                .models
                .iter()
                .skip(page.offset as usize)
                .take(page.limit as usize)
                .cloned()
                .collect())
        }
        .boxed()
    }

    fn get_model<'a>(&'a self, model_id: &'a str) -> BoxFuture<'a, Result<Option<Model>, CatalogError>> {
        async move {
            if self.offline {
                return Err(CatalogError::Status(503));
            }
            Ok(self.models.iter().find(|m| m.uid == model_id).cloned())
        }
        .boxed()
    }

    fn search_models<'a>(&'a self, query: &'a str, limit: u32) -> BoxFuture<'a, Result<Vec<Model>, CatalogError>> {
        async move {
            if self.offline {
                return Err(CatalogError::Status(503));
            }
            let query = query.to_lowercase();
            Ok(self
                .models
                .iter()
                .filter(|m| m.name.to_lowercase().contains(&query))
                .take(limit as usize)
                .cloned()
                .collect())
        }
        .boxed()
    }

    fn health_check(&self) -> BoxFuture<'_, bool> {
        async move { !self.offline }.boxed()
    }
}

pub fn color_material(id: &str, state_set_id: i64, color: [f64; 3]) -> Material {
    Material::new(id, id.to_uppercase(), state_set_id).with_channel("AlbedoPBR", Channel::with_color(color))
}

pub fn textured_material(id: &str, state_set_id: i64, texture_uid: &str) -> Material {
    Material::new(id, id.to_uppercase(), state_set_id)
        .with_channel("AlbedoPBR", Channel::with_texture(texture_uid))
        .with_channel("NormalMap", Channel::with_texture("normal-1"))
}

/// Yield until `condition` holds, giving spawned tasks a chance to run.
pub async fn settle<F: Fn() -> bool>(condition: F) {
    for _ in 0..200 {
        if condition() {
            return;
        }
        tokio::task::yield_now().await;
    }
    panic!("condition not reached");
}
