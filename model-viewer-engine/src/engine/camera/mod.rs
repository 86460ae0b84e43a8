//! Camera mode state machine.
//!
//! `CameraRig` holds whichever of the two control schemes is active. Systems
//! here switch it when the camera mode changes, route mouse and keyboard input
//! into it, integrate it once per frame and mirror its pointer capture onto the
//! primary window.

/// Pointer-locked walk controls.
pub mod first_person;

/// Damped orbit controls around a target.
pub mod orbit;

/// Tagged union over the two rigs.
pub mod rig;

use crate::engine::camera::rig::CameraRig;
use crate::engine::core::app_state::ViewerState;
use crate::engine::scene::orchestrator::{SceneRefresh, refresh_requested};
use crate::rpc::web_rpc::WebRpcInterface;
use bevy::core_pipeline::tonemapping::Tonemapping;
use bevy::input::ButtonState;
use bevy::input::keyboard::KeyboardInput;
use bevy::input::mouse::{MouseMotion, MouseScrollUnit, MouseWheel};
use bevy::prelude::*;
use bevy::window::{CursorGrabMode, PrimaryWindow};
use constants::camera::{
    CAMERA_FAR, CAMERA_FOV_DEGREES, CAMERA_NEAR, DEFAULT_CAMERA_POSITION, DEFAULT_CAMERA_TARGET,
    ORBIT_PIXELS_PER_LINE,
};

/// Marker for the single viewer camera.
#[derive(Component)]
pub struct ViewerCamera;

/// Requests against the camera that do not change application state.
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub enum CameraCommand {
    Reset,
    Frame { eye: Vec3, target: Vec3 },
    Capture,
    Release,
}

pub fn spawn_viewer_camera(commands: &mut Commands) {
    commands.spawn((
        Camera3d::default(),
        Tonemapping::AcesFitted,
        Projection::Perspective(PerspectiveProjection {
            fov: CAMERA_FOV_DEGREES.to_radians(),
            near: CAMERA_NEAR,
            far: CAMERA_FAR,
            ..default()
        }),
        Transform::from_translation(DEFAULT_CAMERA_POSITION)
            .looking_at(DEFAULT_CAMERA_TARGET, Vec3::Y),
        ViewerCamera,
        Name::new("ViewerCamera"),
    ));
}

/// Swap the rig when the camera mode property changes.
pub fn switch_camera_rig(
    mut refreshes: EventReader<SceneRefresh>,
    state: Res<ViewerState>,
    mut rig: ResMut<CameraRig>,
    camera_query: Query<&Transform, With<ViewerCamera>>,
) {
    if !refresh_requested(&mut refreshes, SceneRefresh::CameraRig) {
        return;
    }
    let Ok(transform) = camera_query.single() else {
        return;
    };

    rig.switch_to(state.camera_mode, transform);
    info!("Camera mode: {}", state.camera_mode.as_str());
}

pub fn handle_camera_commands(
    mut camera_commands: EventReader<CameraCommand>,
    mut rig: ResMut<CameraRig>,
    mut camera_query: Query<&mut Transform, With<ViewerCamera>>,
) {
    let Ok(mut transform) = camera_query.single_mut() else {
        camera_commands.clear();
        return;
    };

    for command in camera_commands.read() {
        match *command {
            CameraCommand::Reset => rig.reset(&mut transform),
            CameraCommand::Frame { eye, target } => rig.frame(eye, target, &mut transform),
            CameraCommand::Capture => {
                rig.capture();
            }
            CameraCommand::Release => {
                rig.release();
            }
        }
    }
}

/// Feed mouse and keyboard input into whichever rig is active.
pub fn camera_input(
    mut rig: ResMut<CameraRig>,
    mouse_button: Res<ButtonInput<MouseButton>>,
    mut mouse_motion: EventReader<MouseMotion>,
    mut scroll_events: EventReader<MouseWheel>,
    mut key_events: EventReader<KeyboardInput>,
) {
    let mouse_delta: Vec2 = mouse_motion.read().map(|m| m.delta).sum();

    let scroll_lines: f32 = scroll_events
        .read()
        .map(|ev| match ev.unit {
            MouseScrollUnit::Line => ev.y,
            MouseScrollUnit::Pixel => ev.y * ORBIT_PIXELS_PER_LINE,
        })
        .sum();

    match &mut *rig {
        CameraRig::Orbit(orbit) => {
            key_events.clear();
            if mouse_button.pressed(MouseButton::Left) && mouse_delta != Vec2::ZERO {
                orbit.rotate(mouse_delta);
            }
            if scroll_lines.abs() > f32::EPSILON {
                orbit.zoom(scroll_lines);
            }
        }
        CameraRig::FirstPerson(walk) => {
            for event in key_events.read() {
                if event.key_code == KeyCode::Escape && event.state == ButtonState::Pressed {
                    walk.release();
                    continue;
                }
                walk.key(event.key_code, event.state == ButtonState::Pressed);
            }
            if mouse_delta != Vec2::ZERO {
                walk.look(mouse_delta);
            }
        }
    }
}

pub fn advance_camera(
    time: Res<Time>,
    mut rig: ResMut<CameraRig>,
    mut camera_query: Query<&mut Transform, With<ViewerCamera>>,
) {
    if let Ok(mut transform) = camera_query.single_mut() {
        rig.advance(&mut transform, time.delta_secs());
    }
}

/// Lock and hide the cursor while the rig holds capture; free it otherwise.
pub fn sync_pointer_capture(
    rig: Res<CameraRig>,
    mut windows: Query<&mut Window, With<PrimaryWindow>>,
    mut rpc_interface: ResMut<WebRpcInterface>,
    mut reported: Local<bool>,
) {
    let captured = rig.is_captured();

    if let Ok(mut window) = windows.single_mut() {
        let grab_mode = if captured {
            CursorGrabMode::Locked
        } else {
            CursorGrabMode::None
        };
        if window.cursor_options.grab_mode != grab_mode {
            window.cursor_options.grab_mode = grab_mode;
            window.cursor_options.visible = !captured;
        }
    }

    if *reported != captured {
        *reported = captured;
        rpc_interface.send_notification(
            "pointer_capture_changed",
            serde_json::json!({ "captured": captured }),
        );
    }
}
