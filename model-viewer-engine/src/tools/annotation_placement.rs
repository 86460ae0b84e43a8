use crate::engine::annotations::store::Annotation;
use crate::engine::camera::rig::CameraRig;
use crate::engine::camera::{CameraCommand, ViewerCamera};
use crate::engine::core::app_state::ViewerCommand;
use crate::rpc::web_rpc::WebRpcInterface;
use bevy::picking::mesh_picking::ray_cast::{
    MeshRayCast, MeshRayCastSettings, RayCastVisibility,
};
use bevy::prelude::*;
use bevy::window::PrimaryWindow;

/// Whether the next click drops an annotation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PlacementState {
    #[default]
    Idle,
    Placing,
}

/// Result of routing one click through the placement tool.
#[derive(Debug, Clone, PartialEq)]
pub enum ClickOutcome {
    /// Not placing; the click belongs to the camera controls.
    NotPlacing,
    /// Placing, but the ray hit nothing. Still placing.
    Missed,
    Placed(Annotation),
}

/// One-shot annotation placement tool.
#[derive(Resource, Default, Debug)]
pub struct PlacementTool {
    state: PlacementState,
}

impl PlacementTool {
    pub fn state(&self) -> PlacementState {
        self.state
    }

    pub fn is_placing(&self) -> bool {
        self.state == PlacementState::Placing
    }

    /// Returns true if the state changed.
    pub fn start(&mut self) -> bool {
        std::mem::replace(&mut self.state, PlacementState::Placing) != PlacementState::Placing
    }

    /// Returns true if the state changed.
    pub fn cancel(&mut self) -> bool {
        std::mem::replace(&mut self.state, PlacementState::Idle) != PlacementState::Idle
    }

    /// Consume a click given the nearest surface point under the cursor.
    pub fn resolve_click(&mut self, hit: Option<Vec3>) -> ClickOutcome {
        if !self.is_placing() {
            return ClickOutcome::NotPlacing;
        }
        match hit {
            Some(point) => {
                self.state = PlacementState::Idle;
                ClickOutcome::Placed(Annotation::at(point))
            }
            None => ClickOutcome::Missed,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlacementAction {
    Start,
    Cancel,
}

/// Source of a placement request, kept for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionSource {
    Rpc,
    Keyboard,
}

#[derive(Event, Debug, Clone, Copy)]
pub struct PlacementActionEvent {
    pub action: PlacementAction,
    pub source: ActionSource,
}

fn notify_placement_state(rpc_interface: &mut WebRpcInterface, tool: &PlacementTool) {
    rpc_interface.send_notification(
        "placement_state_changed",
        serde_json::json!({ "placing": tool.is_placing() }),
    );
}

pub fn handle_placement_action_events(
    mut events: EventReader<PlacementActionEvent>,
    mut tool: ResMut<PlacementTool>,
    mut rpc_interface: ResMut<WebRpcInterface>,
) {
    for event in events.read() {
        let changed = match event.action {
            PlacementAction::Start => tool.start(),
            PlacementAction::Cancel => tool.cancel(),
        };
        if changed {
            info!("Annotation placement {:?} via {:?}", event.action, event.source);
            notify_placement_state(&mut rpc_interface, &tool);
        }
    }
}

/// A left click while placing, with the view ray under the cursor.
#[derive(Event, Debug, Clone, Copy)]
pub struct PlacementClick {
    pub ray: Option<Ray3d>,
}

/// Left clicks either feed the placement tool, request pointer capture in
/// first-person, or fall through to the orbit controls.
pub fn handle_viewport_clicks(
    mouse_button: Res<ButtonInput<MouseButton>>,
    windows: Query<&Window, With<PrimaryWindow>>,
    camera_query: Query<(&Camera, &GlobalTransform), With<ViewerCamera>>,
    rig: Res<CameraRig>,
    tool: Res<PlacementTool>,
    mut clicks: EventWriter<PlacementClick>,
    mut camera_commands: EventWriter<CameraCommand>,
) {
    if !mouse_button.just_pressed(MouseButton::Left) {
        return;
    }

    if !tool.is_placing() {
        if matches!(*rig, CameraRig::FirstPerson(_)) && !rig.is_captured() {
            camera_commands.write(CameraCommand::Capture);
        }
        return;
    }

    let Ok(window) = windows.single() else {
        return;
    };
    let Ok((camera, camera_transform)) = camera_query.single() else {
        return;
    };

    // A captured pointer always aims through the centre of the view.
    let cursor = if rig.is_captured() {
        Some(window.size() * 0.5)
    } else {
        window.cursor_position()
    };
    let ray = cursor.and_then(|cursor| camera.viewport_to_world(camera_transform, cursor).ok());
    clicks.write(PlacementClick { ray });
}

/// Drop an annotation at the nearest visible surface along each click ray.
pub fn place_annotations(
    mut clicks: EventReader<PlacementClick>,
    mut ray_cast: MeshRayCast,
    mut tool: ResMut<PlacementTool>,
    mut viewer_commands: EventWriter<ViewerCommand>,
    mut rpc_interface: ResMut<WebRpcInterface>,
) {
    for click in clicks.read() {
        let hit = click.ray.and_then(|ray| {
            let settings = MeshRayCastSettings::default()
                .with_visibility(RayCastVisibility::Visible)
                .never_early_exit();
            ray_cast
                .cast_ray(ray, &settings)
                .first()
                .map(|(_, hit)| hit.point)
        });

        match tool.resolve_click(hit) {
            ClickOutcome::Placed(annotation) => {
                info!(
                    "Annotation {} placed at {:?}",
                    annotation.id,
                    annotation.position()
                );
                rpc_interface.send_notification(
                    "annotation_added",
                    serde_json::json!({ "annotation": &annotation }),
                );
                viewer_commands.write(ViewerCommand::AddAnnotation(annotation));
                notify_placement_state(&mut rpc_interface, &tool);
            }
            ClickOutcome::Missed => debug!("Placement click hit nothing"),
            ClickOutcome::NotPlacing => {}
        }
    }
}
