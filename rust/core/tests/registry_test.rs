// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Channel edits through the registry against a scripted viewer.

mod common;

use common::{color_material, settle, textured_material, FakeRuntime};
use configurator_core::{
    ChangeOutcome, ChannelMode, ChannelRegistry, Error, Material, SessionConfig, Texture, TextureBinding,
    ViewerSession, PRIMARY_CHANNEL,
};
use std::sync::Arc;

fn materials() -> Vec<Material> {
    vec![
        color_material("seat", 3, [0.5, 0.5, 0.5]),
        textured_material("frame", 7, "oak"),
        color_material("legs", 11, [0.9, 0.9, 0.9]),
    ]
}

fn textures() -> Vec<Texture> {
    vec![Texture::new("oak", Some("Oak")), Texture::new("steel", Some("Steel"))]
}

async fn ready_registry() -> (Arc<FakeRuntime>, ChannelRegistry) {
    let runtime = Arc::new(
        FakeRuntime::new()
            .with_scene("chair", materials(), textures())
            .with_scene("table", vec![color_material("top", 1, [0.2, 0.2, 0.2])], Vec::new()),
    );
    let session = ViewerSession::new(runtime.clone(), SessionConfig::default());
    session.bind("chair").await.unwrap();
    (runtime, ChannelRegistry::new(session))
}

#[tokio::test]
async fn test_mutation_before_ready_is_a_no_op() {
    let runtime = Arc::new(FakeRuntime::new().with_scene("chair", materials(), textures()));
    let registry = ChannelRegistry::new(ViewerSession::new(runtime.clone(), SessionConfig::default()));

    let outcome = registry.change_color("seat", PRIMARY_CHANNEL, [0.1, 0.1, 0.1]).await;
    assert_eq!(outcome, ChangeOutcome::NotReady);
    assert_eq!(registry.change_texture("seat", PRIMARY_CHANNEL, "oak").await, ChangeOutcome::NotReady);
    assert_eq!(registry.add_texture("https://img/a.png").await, ChangeOutcome::NotReady);
    assert!(runtime.viewers().is_empty());
}

#[tokio::test]
async fn test_change_color_from_texture_mode() {
    let (runtime, registry) = ready_registry().await;
    assert_eq!(
        registry.channel_view("frame", PRIMARY_CHANNEL).unwrap().mode,
        ChannelMode::Texture
    );

    let outcome = registry.change_color("frame", PRIMARY_CHANNEL, [0.7, 0.15, 0.15]).await;
    let applied = outcome.applied().unwrap();

    let sent = runtime.viewer_for("chair").received();
    assert_eq!(sent, vec![applied.clone()]);
    let channel = sent[0].channel(PRIMARY_CHANNEL).unwrap();
    assert_eq!(channel.color, Some([0.7, 0.15, 0.15]));
    assert!(channel.texture.is_none());

    let view = registry.channel_view("frame", PRIMARY_CHANNEL).unwrap();
    assert_eq!(view.mode, ChannelMode::Color);
    assert_eq!(view.active_color, Some([0.7, 0.15, 0.15]));
}

#[tokio::test]
async fn test_change_texture_is_a_targeted_replace() {
    let (_runtime, registry) = ready_registry().await;
    let before = registry.materials();

    let outcome = registry.change_texture("frame", PRIMARY_CHANNEL, "steel").await;
    assert!(outcome.is_applied());

    let after = registry.materials();
    assert_eq!(after.len(), before.len());
    assert_eq!(after[0], before[0]);
    assert_eq!(after[2], before[2]);
    assert_eq!(after[1].channel(PRIMARY_CHANNEL).unwrap().texture_uid(), Some("steel"));
    // Other channels of the edited material are untouched
    assert_eq!(after[1].channel("NormalMap"), before[1].channel("NormalMap"));
}

#[tokio::test]
async fn test_change_texture_from_color_mode() {
    let (_runtime, registry) = ready_registry().await;

    registry.change_texture("seat", PRIMARY_CHANNEL, "oak").await;
    let view = registry.channel_view("seat", PRIMARY_CHANNEL).unwrap();
    assert_eq!(view.mode, ChannelMode::Texture);
    assert_eq!(view.active_texture.unwrap().label(), "Oak");

    // The color stays on the channel, hidden behind the texture
    let seat = registry.material("seat").unwrap();
    assert_eq!(seat.channel(PRIMARY_CHANNEL).unwrap().color, Some([0.5, 0.5, 0.5]));
}

#[tokio::test]
async fn test_change_color_is_idempotent() {
    let (_runtime, registry) = ready_registry().await;

    registry.change_color("seat", PRIMARY_CHANNEL, [0.1, 0.1, 0.1]).await;
    let once = registry.materials();
    registry.change_color("seat", PRIMARY_CHANNEL, [0.1, 0.1, 0.1]).await;
    assert_eq!(registry.materials(), once);
}

#[tokio::test]
async fn test_unknown_material_and_missing_channel() {
    let (runtime, registry) = ready_registry().await;

    assert_eq!(
        registry.change_color("ghost", PRIMARY_CHANNEL, [0.0, 0.0, 0.0]).await,
        ChangeOutcome::UnknownMaterial
    );
    assert_eq!(
        registry.change_color("seat", "SpecularPBR", [0.0, 0.0, 0.0]).await,
        ChangeOutcome::NotConfigurable
    );
    assert!(registry.channel_view("seat", "SpecularPBR").is_none());
    assert!(runtime.viewer_for("chair").received().is_empty());
}

#[tokio::test]
async fn test_viewer_error_keeps_previous_state() {
    let (runtime, registry) = ready_registry().await;
    runtime.viewer_for("chair").fail_set_material();
    let before = registry.materials();

    let outcome = registry.change_color("seat", PRIMARY_CHANNEL, [0.1, 0.1, 0.1]).await;
    assert_eq!(
        outcome,
        ChangeOutcome::Failed(Error::Viewer {
            op: "setMaterial",
            message: "material rejected".into()
        })
    );
    assert_eq!(registry.materials(), before);
}

#[tokio::test]
async fn test_acknowledgement_after_rebind_is_dropped() {
    let (runtime, registry) = ready_registry().await;
    let chair = runtime.viewer_for("chair");
    chair.hold_acks();

    let editing = registry.clone();
    let edit = tokio::spawn(async move { editing.change_color("seat", PRIMARY_CHANNEL, [0.1, 0.1, 0.1]).await });
    settle(|| chair.held_ack_count() == 1).await;

    registry.session().bind("table").await.unwrap();
    chair.release_acks();

    assert_eq!(edit.await.unwrap(), ChangeOutcome::Stale);
    let snapshot = registry.session().snapshot().unwrap();
    assert_eq!(snapshot.model_id, "table");
    assert_eq!(snapshot.materials.len(), 1);
    assert_eq!(snapshot.materials[0].id, "top");
}

#[tokio::test]
async fn test_unacknowledged_change_leaves_snapshot_alone() {
    let (runtime, registry) = ready_registry().await;
    let chair = runtime.viewer_for("chair");
    chair.hold_acks();
    let before = registry.materials();

    let editing = registry.clone();
    let _edit = tokio::spawn(async move { editing.change_color("seat", PRIMARY_CHANNEL, [0.1, 0.1, 0.1]).await });
    settle(|| chair.held_ack_count() == 1).await;

    assert_eq!(registry.materials(), before);
}

#[tokio::test]
async fn test_unknown_texture_reference_renders_as_unknown() {
    let (_runtime, registry) = ready_registry().await;
    registry.change_texture("seat", PRIMARY_CHANNEL, "not-enumerated").await;

    let view = registry.channel_view("seat", PRIMARY_CHANNEL).unwrap();
    assert_eq!(view.mode, ChannelMode::Texture);
    assert_eq!(
        view.active_texture,
        Some(TextureBinding::Unknown {
            uid: "not-enumerated".into()
        })
    );
}

#[tokio::test]
async fn test_texture_channels_exclude_primary() {
    let (_runtime, registry) = ready_registry().await;
    let channels = registry.texture_channels("frame");
    assert_eq!(channels.len(), 1);
    assert_eq!(channels[0].name, "NormalMap");
    assert_eq!(channels[0].current_texture_uid, "normal-1");
}

#[tokio::test]
async fn test_add_and_update_texture_refresh_list() {
    let (_runtime, registry) = ready_registry().await;

    let uid = registry.add_texture("https://img/fabric.png").await.applied().unwrap();
    assert_eq!(uid, "uploaded-1");
    let textures = registry.textures();
    assert_eq!(textures.len(), 3);
    assert_eq!(textures[2].thumbnail_url(), Some("https://img/fabric.png"));

    let updated = registry.update_texture("https://img/oak-v2.png", "oak").await;
    assert_eq!(updated, ChangeOutcome::Applied("oak".to_string()));
    assert_eq!(registry.textures()[0].thumbnail_url(), Some("https://img/oak-v2.png"));

    let missing = registry.update_texture("https://img/x.png", "ghost").await;
    assert!(matches!(missing, ChangeOutcome::Failed(Error::Viewer { op: "updateTexture", .. })));
}

#[tokio::test]
async fn test_refresh_materials() {
    let (runtime, registry) = ready_registry().await;
    runtime
        .viewer_for("chair")
        .replace_materials(vec![color_material("only", 99, [0.0, 0.0, 0.0])]);

    assert_eq!(registry.refresh_materials().await, ChangeOutcome::Applied(1));
    assert_eq!(registry.materials()[0].id, "only");
}
