use bevy::asset::AssetMetaCheck;
use bevy::diagnostic::FrameTimeDiagnosticsPlugin;
use bevy::prelude::*;
use bevy_common_assets::json::JsonAssetPlugin;
use constants::scene::BACKGROUND_COLOUR;

use crate::engine::annotations::markers::{
    MarkerAssets, refresh_annotation_markers, setup_marker_assets,
};
use crate::engine::camera::rig::CameraRig;
use crate::engine::camera::{
    CameraCommand, advance_camera, camera_input, handle_camera_commands, switch_camera_rig,
    sync_pointer_capture,
};
use crate::engine::core::app_state::{ViewerCommand, ViewerLifecycle, ViewerState, viewer_running};
use crate::engine::core::viewer_config::{
    ViewerConfig, ViewerConfigLoader, ViewerConfigReady, apply_viewer_config, start_viewer_config_load,
};
use crate::engine::core::window_config::create_window_config;
use crate::engine::lighting::environment::{
    EnvironmentState, start_environment_load, watch_environment_load,
};
use crate::engine::lighting::night_lights::refresh_night_lights;
use crate::engine::lighting::refresh_lighting;
use crate::engine::lighting::sun::hex_colour;
use crate::engine::loading::model_loader::{PendingModelLoad, poll_model_load, refresh_model};
use crate::engine::scene::orchestrator::{
    SceneEntities, SceneRefresh, apply_viewer_commands, request_startup_refreshes,
};
use crate::engine::scene::stage::setup_stage;
use crate::engine::systems::fps_tracking::fps_notification_system;
use crate::engine::systems::teardown::{TeardownRequest, handle_teardown, teardown_on_exit};
use crate::engine::systems::viewport::handle_viewport_resize;
use crate::rpc::web_rpc::WebRpcPlugin;
use crate::tools::annotation_placement::{
    PlacementActionEvent, PlacementClick, PlacementTool, handle_placement_action_events,
    handle_viewport_clicks, place_annotations,
};
use crate::tools::shortcuts::handle_viewer_shortcuts;

#[cfg(not(target_arch = "wasm32"))]
use crate::engine::systems::fps_tracking::{fps_text_update_system, spawn_fps_overlay};

/// Per-frame stages. Input is turned into commands, commands update the
/// application state, the scene is refreshed from that state, the camera is
/// integrated, and finally everything queued for the host is flushed.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewerSet {
    Input,
    ApplyState,
    Refresh,
    Camera,
    Output,
}

pub fn create_app() -> App {
    let mut app = App::new();

    app.add_plugins(create_default_plugins())
        .add_plugins(FrameTimeDiagnosticsPlugin::default())
        // Registers ViewerConfig as a loadable asset type from JSON files.
        .add_plugins(JsonAssetPlugin::<ViewerConfig>::new(&["json"]))
        .add_plugins(ViewerPlugin);

    app
}

/// Everything the viewer adds on top of Bevy's default plugins.
pub struct ViewerPlugin;

impl Plugin for ViewerPlugin {
    fn build(&self, app: &mut App) {
        app.configure_sets(
            Update,
            (
                ViewerSet::Input,
                ViewerSet::ApplyState,
                ViewerSet::Refresh,
                ViewerSet::Camera,
                ViewerSet::Output,
            )
                .chain(),
        );
        for set in [
            ViewerSet::Input,
            ViewerSet::ApplyState,
            ViewerSet::Refresh,
            ViewerSet::Camera,
        ] {
            app.configure_sets(Update, set.run_if(viewer_running));
        }

        app.add_plugins(WebRpcPlugin);

        // Initialise resources early
        app.init_resource::<ViewerState>()
            .init_resource::<ViewerLifecycle>()
            .init_resource::<SceneEntities>()
            .init_resource::<EnvironmentState>()
            .init_resource::<MarkerAssets>()
            .init_resource::<PendingModelLoad>()
            .init_resource::<CameraRig>()
            .init_resource::<PlacementTool>()
            .init_resource::<ViewerConfigLoader>()
            .insert_resource(ClearColor(hex_colour(BACKGROUND_COLOUR)))
            .add_event::<ViewerCommand>()
            .add_event::<ViewerConfigReady>()
            .add_event::<SceneRefresh>()
            .add_event::<CameraCommand>()
            .add_event::<PlacementActionEvent>()
            .add_event::<PlacementClick>()
            .add_event::<TeardownRequest>();

        app.add_systems(
            Startup,
            (
                log_startup_banner,
                setup_stage,
                setup_marker_assets,
                start_environment_load,
                start_viewer_config_load,
                request_startup_refreshes,
            )
                .chain(),
        );

        app.add_systems(
            Update,
            (
                apply_viewer_config,
                handle_viewer_shortcuts, // Native shortcuts or no-op for WASM
                camera_input,
                handle_placement_action_events,
                handle_viewport_clicks,
                place_annotations,
            )
                .chain()
                .in_set(ViewerSet::Input),
        )
        .add_systems(
            Update,
            (watch_environment_load, apply_viewer_commands).in_set(ViewerSet::ApplyState),
        )
        .add_systems(
            Update,
            (
                refresh_lighting,
                refresh_night_lights,
                refresh_annotation_markers,
                (refresh_model, poll_model_load).chain(),
                switch_camera_rig,
                handle_viewport_resize,
            )
                .in_set(ViewerSet::Refresh),
        )
        .add_systems(
            Update,
            (handle_camera_commands, advance_camera, sync_pointer_capture)
                .chain()
                .in_set(ViewerSet::Camera),
        )
        .add_systems(
            Update,
            (
                (teardown_on_exit, handle_teardown).chain(),
                fps_notification_system.run_if(viewer_running),
            )
                .in_set(ViewerSet::Output),
        );

        #[cfg(not(target_arch = "wasm32"))]
        {
            app.add_systems(Startup, spawn_native_overlays).add_systems(
                Update,
                fps_text_update_system
                    .in_set(ViewerSet::Output)
                    .run_if(viewer_running),
            );
        }
    }
}

fn log_startup_banner() {
    info!("=== MODEL VIEWER ENGINE ===");
    #[cfg(target_arch = "wasm32")]
    info!("Waiting for host RPC messages");
    #[cfg(not(target_arch = "wasm32"))]
    info!("Shortcuts: P place, Esc cancel, H annotations, N night lights, C camera, R reset, [ ] time, Del remove last");
}

#[cfg(not(target_arch = "wasm32"))]
fn spawn_native_overlays(mut commands: Commands) {
    spawn_fps_overlay(&mut commands);
}

fn create_default_plugins() -> impl PluginGroup {
    let window_config = WindowPlugin {
        primary_window: Some(create_window_config()),
        ..default()
    };

    let asset_config = AssetPlugin {
        meta_check: AssetMetaCheck::Never,
        ..default()
    };

    DefaultPlugins.set(window_config).set(asset_config)
}
