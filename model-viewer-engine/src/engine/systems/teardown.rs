use crate::engine::camera::rig::CameraRig;
use crate::engine::core::app_state::ViewerLifecycle;
use crate::engine::lighting::environment::{EnvironmentState, EnvironmentStatus};
use crate::engine::loading::model_loader::PendingModelLoad;
use crate::engine::scene::orchestrator::SceneEntities;
use bevy::prelude::*;
use bevy::window::{CursorGrabMode, PrimaryWindow};

/// Ask the viewer to release everything it owns. `exit` also stops the app.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct TeardownRequest {
    pub exit: bool,
}

/// Despawn derived scene content, drop the panorama and any model task,
/// release the pointer and stop frame systems. Safe to request repeatedly.
pub fn handle_teardown(
    mut requests: EventReader<TeardownRequest>,
    mut commands: Commands,
    mut lifecycle: ResMut<ViewerLifecycle>,
    mut scene: ResMut<SceneEntities>,
    mut environment: ResMut<EnvironmentState>,
    mut pending: ResMut<PendingModelLoad>,
    mut rig: ResMut<CameraRig>,
    mut windows: Query<&mut Window, With<PrimaryWindow>>,
    environment_lights: Query<Entity, With<EnvironmentMapLight>>,
    mut exit_writer: EventWriter<AppExit>,
) {
    let Some(exit) = requests
        .read()
        .fold(None, |exit, request| Some(exit.unwrap_or(false) || request.exit))
    else {
        return;
    };
    if *lifecycle == ViewerLifecycle::TornDown {
        debug!("Teardown already complete");
        return;
    }

    let scene = &mut *scene;
    let despawned = scene
        .model
        .take()
        .into_iter()
        .chain(scene.night_lights.drain(..))
        .chain(scene.markers.drain().map(|(_, entity)| entity));
    let mut count = 0;
    for entity in despawned {
        commands.entity(entity).despawn();
        count += 1;
    }

    for camera in &environment_lights {
        commands.entity(camera).remove::<EnvironmentMapLight>();
    }
    environment.handle = Handle::default();
    environment.cubemap = Handle::default();
    environment.status = EnvironmentStatus::Released;
    pending.cancel();
    rig.release();

    if let Ok(mut window) = windows.single_mut() {
        window.cursor_options.grab_mode = CursorGrabMode::None;
        window.cursor_options.visible = true;
    }

    *lifecycle = ViewerLifecycle::TornDown;
    info!("Viewer torn down ({} entities released)", count);

    if exit {
        exit_writer.write(AppExit::Success);
    }
}

/// The app is closing on its own (window closed); release resources too.
pub fn teardown_on_exit(
    mut app_exits: EventReader<AppExit>,
    mut requests: EventWriter<TeardownRequest>,
) {
    if app_exits.read().next().is_some() {
        requests.write(TeardownRequest { exit: false });
    }
}
