#[cfg(not(target_arch = "wasm32"))]
use crate::engine::camera::CameraCommand;
#[cfg(not(target_arch = "wasm32"))]
use crate::engine::core::app_state::{ViewerCommand, ViewerState};
#[cfg(not(target_arch = "wasm32"))]
use crate::tools::annotation_placement::{ActionSource, PlacementAction, PlacementActionEvent};
#[cfg(not(target_arch = "wasm32"))]
use bevy::prelude::*;

/// Keyboard stand-ins for the host UI (native builds only).
#[cfg(not(target_arch = "wasm32"))]
pub fn handle_viewer_shortcuts(
    keyboard: Res<ButtonInput<KeyCode>>,
    state: Res<ViewerState>,
    mut viewer_commands: EventWriter<ViewerCommand>,
    mut placement_events: EventWriter<PlacementActionEvent>,
    mut camera_commands: EventWriter<CameraCommand>,
) {
    if keyboard.just_pressed(KeyCode::KeyP) {
        placement_events.write(PlacementActionEvent {
            action: PlacementAction::Start,
            source: ActionSource::Keyboard,
        });
    }

    if keyboard.just_pressed(KeyCode::Escape) {
        placement_events.write(PlacementActionEvent {
            action: PlacementAction::Cancel,
            source: ActionSource::Keyboard,
        });
    }

    if keyboard.just_pressed(KeyCode::KeyH) {
        viewer_commands.write(ViewerCommand::ToggleAnnotations);
    }

    if keyboard.just_pressed(KeyCode::KeyN) {
        viewer_commands.write(ViewerCommand::ToggleNightLights);
    }

    if keyboard.just_pressed(KeyCode::KeyC) {
        viewer_commands.write(ViewerCommand::SetCameraMode(state.camera_mode.toggled()));
    }

    if keyboard.just_pressed(KeyCode::KeyR) {
        camera_commands.write(CameraCommand::Reset);
    }

    if keyboard.just_pressed(KeyCode::BracketLeft) {
        viewer_commands.write(ViewerCommand::SetTimeOfDay(state.time_of_day - 1.0));
    }

    if keyboard.just_pressed(KeyCode::BracketRight) {
        viewer_commands.write(ViewerCommand::SetTimeOfDay(state.time_of_day + 1.0));
    }

    if keyboard.just_pressed(KeyCode::Delete) {
        if let Some(last) = state.annotations.last() {
            viewer_commands.write(ViewerCommand::DeleteAnnotation(last.id.clone()));
        }
    }
}

/// Placeholder system for WASM builds where the host UI drives everything.
#[cfg(target_arch = "wasm32")]
pub fn handle_viewer_shortcuts() {
    // No keyboard shortcuts in WASM builds - the viewer is controlled via RPC only.
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;

    fn shortcut_app() -> App {
        let mut app = App::new();
        app.add_event::<ViewerCommand>()
            .add_event::<PlacementActionEvent>()
            .add_event::<CameraCommand>()
            .init_resource::<ButtonInput<KeyCode>>()
            .insert_resource(ViewerState {
                time_of_day: 23.5,
                ..default()
            })
            .add_systems(Update, handle_viewer_shortcuts);
        app
    }

    fn press(app: &mut App, key: KeyCode) -> Vec<ViewerCommand> {
        app.world_mut()
            .resource_mut::<ButtonInput<KeyCode>>()
            .press(key);
        app.update();
        let events = app.world().resource::<Events<ViewerCommand>>();
        events.get_cursor().read(events).cloned().collect()
    }

    #[test]
    fn bracket_keys_step_the_clock() {
        let mut app = shortcut_app();
        let commands = press(&mut app, KeyCode::BracketRight);
        assert!(matches!(
            commands.as_slice(),
            [ViewerCommand::SetTimeOfDay(hour)] if (*hour - 24.5).abs() < 1e-6
        ));
    }

    #[test]
    fn camera_key_toggles_mode() {
        let mut app = shortcut_app();
        let commands = press(&mut app, KeyCode::KeyC);
        assert!(matches!(
            commands.as_slice(),
            [ViewerCommand::SetCameraMode(crate::engine::core::app_state::CameraMode::FirstPerson)]
        ));
    }
}
