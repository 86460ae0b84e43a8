use crate::engine::core::app_state::{ViewerCommand, ViewerProperty, ViewerState};
use crate::engine::core::viewer_config::ViewerConfigReady;
use crate::rpc::web_rpc::WebRpcInterface;
use bevy::prelude::*;
use std::collections::HashMap;

/// Independent, idempotent rebuilds of a managed slice of the scene.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SceneRefresh {
    Lighting,
    NightLights,
    AnnotationMarkers,
    Model,
    CameraRig,
}

impl SceneRefresh {
    /// Refreshes run once at startup so the scene matches the initial state.
    pub const STARTUP: [SceneRefresh; 3] = [
        SceneRefresh::Lighting,
        SceneRefresh::NightLights,
        SceneRefresh::AnnotationMarkers,
    ];
}

/// Refreshes a property change is responsible for. Nothing else is rebuilt.
///
/// Time of day drives the derived night flag, so it also refreshes the night
/// lights.
pub fn refreshes_for(property: ViewerProperty) -> &'static [SceneRefresh] {
    match property {
        ViewerProperty::Annotations | ViewerProperty::ShowAnnotations => {
            &[SceneRefresh::AnnotationMarkers]
        }
        ViewerProperty::TimeOfDay => &[SceneRefresh::Lighting, SceneRefresh::NightLights],
        ViewerProperty::NightLightsEnabled => &[SceneRefresh::NightLights],
        ViewerProperty::ModelFile => &[SceneRefresh::Model],
        ViewerProperty::CameraMode => &[SceneRefresh::CameraRig],
    }
}

/// Derived scene entities. Only orchestrator refresh systems write here; the
/// rest of the engine reads.
#[derive(Resource, Default, Debug)]
pub struct SceneEntities {
    pub(crate) night_lights: Vec<Entity>,
    pub(crate) markers: HashMap<String, Entity>,
    pub(crate) model: Option<Entity>,
}

impl SceneEntities {
    pub fn night_light_count(&self) -> usize {
        self.night_lights.len()
    }

    pub fn marker_ids(&self) -> impl Iterator<Item = &str> {
        self.markers.keys().map(String::as_str)
    }

    pub fn marker(&self, id: &str) -> Option<Entity> {
        self.markers.get(id).copied()
    }

    pub fn model(&self) -> Option<Entity> {
        self.model
    }
}

fn queue_refreshes(pending: &mut Vec<SceneRefresh>, property: ViewerProperty) {
    for refresh in refreshes_for(property) {
        if !pending.contains(refresh) {
            pending.push(*refresh);
        }
    }
}

/// Single writer of `ViewerState`: applies the startup config (if it arrived
/// this frame), then queued commands in order, and turns every changed
/// property into its refreshes (deduplicated per frame).
///
/// The config goes first so host commands from the same frame win.
pub fn apply_viewer_commands(
    mut configs_in: EventReader<ViewerConfigReady>,
    mut commands_in: EventReader<ViewerCommand>,
    mut state: ResMut<ViewerState>,
    mut refreshes: EventWriter<SceneRefresh>,
    mut rpc_interface: ResMut<WebRpcInterface>,
) {
    let mut pending: Vec<SceneRefresh> = Vec::new();
    let mut annotations_changed = false;

    for ViewerConfigReady(config) in configs_in.read() {
        for property in state.apply_config(config) {
            queue_refreshes(&mut pending, property);
        }
    }

    for command in commands_in.read() {
        let edit = match command {
            ViewerCommand::EditAnnotation {
                id,
                title,
                description,
            } => Some(serde_json::json!({
                "id": id,
                "title": title,
                "description": description,
            })),
            _ => None,
        };

        let Some(property) = state.apply(command.clone()) else {
            debug!("Viewer command had no effect: {:?}", command);
            continue;
        };

        if let Some(edit) = edit {
            rpc_interface.send_notification("annotation_edit_requested", edit);
        }
        if property == ViewerProperty::Annotations {
            annotations_changed = true;
        }

        queue_refreshes(&mut pending, property);
    }

    if pending.is_empty() {
        return;
    }

    if annotations_changed {
        rpc_interface.send_notification(
            "annotations_changed",
            serde_json::json!({ "annotations": state.annotations.as_slice() }),
        );
    }
    rpc_interface.send_notification("viewer_state_changed", state.to_json());

    for refresh in pending {
        refreshes.write(refresh);
    }
}

/// Run every startup refresh once.
pub fn request_startup_refreshes(mut refreshes: EventWriter<SceneRefresh>) {
    for refresh in SceneRefresh::STARTUP {
        refreshes.write(refresh);
    }
}

/// True when a refresh of this kind is queued this frame.
pub(crate) fn refresh_requested(events: &mut EventReader<SceneRefresh>, kind: SceneRefresh) -> bool {
    // Drain everything so the reader never carries stale events into the next frame.
    events.read().fold(false, |found, refresh| found || *refresh == kind)
}
