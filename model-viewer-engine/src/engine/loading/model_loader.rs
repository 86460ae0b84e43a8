use crate::engine::camera::CameraCommand;
use crate::engine::core::app_state::ViewerState;
use crate::engine::lighting::sun::hex_colour;
use crate::engine::loading::model_format::ModelLoadError;
use crate::engine::loading::model_parser::{ParsedModel, parse_model};
use crate::engine::scene::orchestrator::{SceneEntities, SceneRefresh, refresh_requested};
use crate::rpc::web_rpc::WebRpcInterface;
use bevy::prelude::*;
use bevy::tasks::{AsyncComputeTaskPool, Task, block_on, futures_lite::future};
use constants::camera::MODEL_FRAMING_DISTANCE_FACTOR;
use constants::scene::MODEL_BASE_COLOUR;

/// Root entity of the currently displayed model.
#[derive(Component)]
pub struct LoadedModel;

struct ModelTask {
    name: String,
    task: Task<Result<ParsedModel, ModelLoadError>>,
}

/// At most one parse in flight. Starting another drops the previous task.
#[derive(Resource, Default)]
pub struct PendingModelLoad {
    current: Option<ModelTask>,
}

impl PendingModelLoad {
    pub fn is_pending(&self) -> bool {
        self.current.is_some()
    }

    pub fn cancel(&mut self) {
        if let Some(pending) = self.current.take() {
            info!("Dropping pending model load: {}", pending.name);
        }
    }
}

/// Where a freshly loaded model is placed and how the camera frames it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelPlacement {
    /// Offset that centres the model horizontally and rests it on y = 0.
    pub offset: Vec3,
    pub size: Vec3,
    pub camera_eye: Vec3,
    pub camera_target: Vec3,
}

impl ModelPlacement {
    pub fn from_bounds(min: Vec3, max: Vec3) -> Self {
        let size = max - min;
        let centre = (min + max) * 0.5;
        let distance = size.max_element() * MODEL_FRAMING_DISTANCE_FACTOR;
        Self {
            offset: Vec3::new(-centre.x, -min.y, -centre.z),
            size,
            camera_eye: Vec3::splat(distance),
            camera_target: Vec3::new(0.0, size.y * 0.5, 0.0),
        }
    }
}

/// Start parsing the selected model file off the main thread.
pub fn refresh_model(
    mut refreshes: EventReader<SceneRefresh>,
    state: Res<ViewerState>,
    mut pending: ResMut<PendingModelLoad>,
) {
    if !refresh_requested(&mut refreshes, SceneRefresh::Model) {
        return;
    }
    let Some(file) = state.model_file.as_ref() else {
        return;
    };

    if pending.is_pending() {
        pending.cancel();
    }

    let format = file.format();
    let bytes = file.bytes();
    info!(
        "Parsing {} model '{}' ({} bytes)",
        format.as_str(),
        file.name(),
        bytes.len()
    );

    let task = AsyncComputeTaskPool::get().spawn(async move { parse_model(format, &bytes) });
    pending.current = Some(ModelTask {
        name: file.name().to_string(),
        task,
    });
}

/// Swap in the parsed model once its task finishes. A failed parse leaves the
/// previous model in place.
pub fn poll_model_load(
    mut commands: Commands,
    mut pending: ResMut<PendingModelLoad>,
    mut scene: ResMut<SceneEntities>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut camera_commands: EventWriter<CameraCommand>,
    mut rpc_interface: ResMut<WebRpcInterface>,
) {
    let Some(model_task) = pending.current.as_mut() else {
        return;
    };
    let Some(result) = block_on(future::poll_once(&mut model_task.task)) else {
        return;
    };
    let Some(ModelTask { name, .. }) = pending.current.take() else {
        return;
    };

    let parsed = match result {
        Ok(parsed) => parsed,
        Err(err) => {
            warn!("Model '{}' failed to load: {}", name, err);
            rpc_interface.send_notification(
                "model_load_failed",
                serde_json::json!({ "name": name, "reason": err.to_string() }),
            );
            return;
        }
    };
    let Some((min, max)) = parsed.bounds() else {
        return;
    };

    if let Some(previous) = scene.model.take() {
        commands.entity(previous).despawn();
    }

    let placement = ModelPlacement::from_bounds(min, max);
    let material = materials.add(StandardMaterial {
        base_color: hex_colour(MODEL_BASE_COLOUR),
        double_sided: true,
        cull_mode: None,
        ..default()
    });

    let root = commands
        .spawn((
            Transform::from_translation(placement.offset),
            Visibility::default(),
            LoadedModel,
            Name::new(name.clone()),
        ))
        .with_children(|parent| {
            for mesh in &parsed.meshes {
                parent.spawn((
                    Mesh3d(meshes.add(mesh.to_mesh())),
                    MeshMaterial3d(material.clone()),
                    Name::new(mesh.name.clone()),
                ));
            }
        })
        .id();
    scene.model = Some(root);

    camera_commands.write(CameraCommand::Frame {
        eye: placement.camera_eye,
        target: placement.camera_target,
    });

    info!(
        "Model '{}' loaded: {} meshes, {} triangles, size {:?}",
        name,
        parsed.meshes.len(),
        parsed.triangle_count(),
        placement.size
    );
    rpc_interface.send_notification(
        "model_loaded",
        serde_json::json!({
            "name": name,
            "size": placement.size.to_array(),
            "triangles": parsed.triangle_count(),
        }),
    );
}
