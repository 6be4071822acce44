// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Viewer session: lifecycle of the single embedded viewer resource.
//!
//! ```text
//! Uninitialized --bind--> Initializing --viewerready--> Ready
//!                              |                          |
//!                              +------ bind / teardown ---+--> TornDown
//! ```
//!
//! Every bind takes a new generation number. Work started by an older bind
//! checks its generation before touching state; when it has been superseded
//! the result is discarded and any viewer resource it produced is stopped.
//! At most one viewer resource is live per session.

use crate::error::{Error, Result};
use crate::material::{Material, Texture};
use crate::viewer::{await_with_timeout, InitOptions, ViewerApi, ViewerClient, ViewerRuntime};
use parking_lot::Mutex;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{oneshot, watch};

/// Session tunables.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Interval between checks for the viewer runtime script.
    pub poll_interval: Duration,
    /// Give up waiting for the runtime after this many checks (`None` = never).
    pub max_poll_attempts: Option<u32>,
    /// Bound on `init` plus the ready event.
    pub ready_timeout: Option<Duration>,
    /// Bound on each viewer call round trip.
    pub call_timeout: Option<Duration>,
    pub init_options: InitOptions,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(100),
            max_poll_attempts: Some(300),
            ready_timeout: Some(Duration::from_secs(60)),
            call_timeout: Some(Duration::from_secs(15)),
            init_options: InitOptions::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Uninitialized,
    Initializing,
    Ready,
    /// Initialization failed for the current bind; rebinding retries.
    Failed,
    TornDown,
}

/// Materials and textures published when a bind reaches `Ready`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MaterialSnapshot {
    pub generation: u64,
    pub model_id: String,
    pub materials: Vec<Material>,
    pub textures: Vec<Texture>,
}

impl MaterialSnapshot {
    pub fn material(&self, id: &str) -> Option<&Material> {
        self.materials.iter().find(|m| m.id == id)
    }

    /// Replace the entry sharing `updated`'s state-set id. Other entries are
    /// left untouched. Returns false when no entry matches.
    pub fn replace_material(&mut self, updated: Material) -> bool {
        match self
            .materials
            .iter_mut()
            .find(|m| m.state_set_id == updated.state_set_id)
        {
            Some(slot) => {
                *slot = updated;
                true
            }
            None => false,
        }
    }
}

/// Result of a bind that did not fail.
#[derive(Debug, Clone, PartialEq)]
pub enum BindOutcome {
    Ready { generation: u64, materials: usize, textures: usize },
    /// A newer bind or a teardown took over; nothing was applied.
    Superseded,
    /// Nothing was selected to bind; the session was torn down.
    Unbound,
}

/// Viewer client plus the generation it belongs to.
#[derive(Debug, Clone)]
pub struct ReadyHandle {
    pub generation: u64,
    pub client: ViewerClient,
}

#[derive(Default)]
struct SessionInner {
    generation: u64,
    model_id: Option<String>,
    client: Option<ViewerClient>,
    snapshot: Option<MaterialSnapshot>,
}

/// Owned handle to one viewer session. Cloning shares the session.
#[derive(Clone)]
pub struct ViewerSession {
    runtime: Arc<dyn ViewerRuntime>,
    config: Arc<SessionConfig>,
    inner: Arc<Mutex<SessionInner>>,
    state_tx: Arc<watch::Sender<SessionState>>,
}

impl ViewerSession {
    pub fn new(runtime: Arc<dyn ViewerRuntime>, config: SessionConfig) -> Self {
        let (state_tx, _) = watch::channel(SessionState::Uninitialized);
        Self {
            runtime,
            config: Arc::new(config),
            inner: Arc::new(Mutex::new(SessionInner::default())),
            state_tx: Arc::new(state_tx),
        }
    }

    pub fn state(&self) -> SessionState {
        *self.state_tx.borrow()
    }

    /// Receiver notified on every state transition.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state_tx.subscribe()
    }

    pub fn generation(&self) -> u64 {
        self.inner.lock().generation
    }

    pub fn model_id(&self) -> Option<String> {
        self.inner.lock().model_id.clone()
    }

    /// Copy of the current snapshot, if the session is ready.
    pub fn snapshot(&self) -> Option<MaterialSnapshot> {
        self.inner.lock().snapshot.clone()
    }

    /// Client and generation of the ready bind, `None` otherwise.
    pub fn ready_handle(&self) -> Option<ReadyHandle> {
        let inner = self.inner.lock();
        match (&inner.client, &inner.snapshot) {
            (Some(client), Some(_)) => Some(ReadyHandle {
                generation: inner.generation,
                client: client.clone(),
            }),
            _ => None,
        }
    }

    /// Apply `update` to the snapshot if `generation` is still current.
    /// Returns false when the bind was superseded or is not ready.
    pub fn update_snapshot<F>(&self, generation: u64, update: F) -> bool
    where
        F: FnOnce(&mut MaterialSnapshot),
    {
        let mut inner = self.inner.lock();
        if inner.generation != generation {
            return false;
        }
        match inner.snapshot.as_mut() {
            Some(snapshot) => {
                update(snapshot);
                true
            }
            None => false,
        }
    }

    /// Bind `model_id`, tearing down whatever was bound before.
    ///
    /// Resolves once the viewer is ready and the material and texture lists
    /// have been fetched and published, or with [`BindOutcome::Superseded`]
    /// if a newer bind took over in the meantime.
    pub async fn bind(&self, model_id: &str) -> Result<BindOutcome> {
        let generation = {
            let mut inner = self.inner.lock();
            inner.generation += 1;
            if let Some(previous) = inner.client.take() {
                tracing::debug!(model_id = ?inner.model_id, "Stopping previous viewer");
                previous.stop();
            }
            inner.model_id = Some(model_id.to_string());
            inner.snapshot = None;
            inner.generation
        };
        self.set_state(SessionState::Initializing);
        tracing::info!(model_id, generation, "Binding viewer");

        match self.initialize(model_id, generation).await {
            Ok(outcome) => Ok(outcome),
            Err(err) => {
                if !self.is_current(generation) {
                    tracing::debug!(model_id, generation, error = %err, "Ignoring failure of superseded bind");
                    return Ok(BindOutcome::Superseded);
                }
                {
                    let mut inner = self.inner.lock();
                    if let Some(client) = inner.client.take() {
                        client.stop();
                    }
                }
                self.set_state(SessionState::Failed);
                tracing::error!(model_id, generation, error = %err, "Viewer initialization failed");
                Err(err)
            }
        }
    }

    /// Stop the live viewer and invalidate any in-flight bind.
    pub fn teardown(&self) {
        {
            let mut inner = self.inner.lock();
            inner.generation += 1;
            if let Some(client) = inner.client.take() {
                client.stop();
            }
            inner.model_id = None;
            inner.snapshot = None;
        }
        self.set_state(SessionState::TornDown);
        tracing::info!("Viewer session torn down");
    }

    async fn initialize(&self, model_id: &str, generation: u64) -> Result<BindOutcome> {
        if !self.wait_for_runtime(generation).await? {
            return Ok(BindOutcome::Superseded);
        }

        let api = self.init_viewer(model_id).await?;
        let client = ViewerClient::new(api, self.config.call_timeout);

        {
            let mut inner = self.inner.lock();
            if inner.generation != generation {
                drop(inner);
                tracing::debug!(model_id, generation, "Stopping viewer of superseded bind");
                client.stop();
                return Ok(BindOutcome::Superseded);
            }
            inner.client = Some(client.clone());
        }

        let ready = client.ready(self.config.ready_timeout);
        client.start();
        ready.await?;

        if !self.is_current(generation) {
            return Ok(BindOutcome::Superseded);
        }
        tracing::info!(model_id, generation, "Viewer ready");

        let materials = client.material_list().await.unwrap_or_else(|err| {
            tracing::error!(model_id, error = %err, "Failed to load materials");
            Vec::new()
        });
        let textures = client.texture_list().await.unwrap_or_else(|err| {
            tracing::error!(model_id, error = %err, "Failed to load textures");
            Vec::new()
        });

        let counts = (materials.len(), textures.len());
        {
            let mut inner = self.inner.lock();
            if inner.generation != generation {
                return Ok(BindOutcome::Superseded);
            }
            inner.snapshot = Some(MaterialSnapshot {
                generation,
                model_id: model_id.to_string(),
                materials,
                textures,
            });
        }
        self.set_state(SessionState::Ready);
        tracing::info!(
            model_id,
            generation,
            materials = counts.0,
            textures = counts.1,
            "Published material snapshot"
        );

        Ok(BindOutcome::Ready {
            generation,
            materials: counts.0,
            textures: counts.1,
        })
    }

    /// Poll until the runtime script is loaded. Returns false if superseded.
    async fn wait_for_runtime(&self, generation: u64) -> Result<bool> {
        let mut attempts = 0u32;
        while !self.runtime.is_loaded() {
            if !self.is_current(generation) {
                return Ok(false);
            }
            attempts += 1;
            if let Some(max) = self.config.max_poll_attempts {
                if attempts > max {
                    return Err(Error::RuntimeUnavailable { attempts: max });
                }
            }
            tokio::time::sleep(self.config.poll_interval).await;
        }
        Ok(self.is_current(generation))
    }

    async fn init_viewer(&self, model_id: &str) -> Result<Arc<dyn ViewerApi>> {
        let (tx, rx) = oneshot::channel();
        self.runtime.init(
            model_id,
            &self.config.init_options,
            Box::new(move |result| {
                let _ = tx.send(result);
            }),
        );
        await_with_timeout(rx, self.config.ready_timeout, "init")
            .await?
            .map_err(|fault| Error::InitFailed(fault.0))
    }

    fn is_current(&self, generation: u64) -> bool {
        self.inner.lock().generation == generation
    }

    fn set_state(&self, state: SessionState) {
        self.state_tx.send_replace(state);
    }
}
