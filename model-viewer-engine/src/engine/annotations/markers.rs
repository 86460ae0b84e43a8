use crate::engine::core::app_state::ViewerState;
use crate::engine::lighting::sun::hex_colour;
use crate::engine::scene::orchestrator::{SceneEntities, SceneRefresh, refresh_requested};
use bevy::pbr::NotShadowCaster;
use bevy::prelude::*;
use constants::scene::{
    ANNOTATION_MARKER_COLOUR, ANNOTATION_MARKER_EMISSIVE_STRENGTH, ANNOTATION_MARKER_METALLIC,
    ANNOTATION_MARKER_RADIUS, ANNOTATION_MARKER_SEGMENTS,
};

/// Visual pin for one annotation.
#[derive(Component, Debug, Clone)]
pub struct AnnotationMarker {
    pub id: String,
}

/// Shared mesh and material for every marker sphere.
#[derive(Resource, Default)]
pub struct MarkerAssets {
    pub mesh: Handle<Mesh>,
    pub material: Handle<StandardMaterial>,
}

pub fn setup_marker_assets(
    mut marker_assets: ResMut<MarkerAssets>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let colour = hex_colour(ANNOTATION_MARKER_COLOUR);
    marker_assets.mesh = meshes.add(
        Sphere::new(ANNOTATION_MARKER_RADIUS)
            .mesh()
            .uv(ANNOTATION_MARKER_SEGMENTS, ANNOTATION_MARKER_SEGMENTS),
    );
    marker_assets.material = materials.add(StandardMaterial {
        base_color: colour,
        emissive: LinearRgba::from(colour) * ANNOTATION_MARKER_EMISSIVE_STRENGTH,
        metallic: ANNOTATION_MARKER_METALLIC,
        ..default()
    });
}

/// Discard every marker and, if annotations are shown, spawn one per
/// annotation at its stored position.
pub fn refresh_annotation_markers(
    mut refreshes: EventReader<SceneRefresh>,
    mut commands: Commands,
    state: Res<ViewerState>,
    marker_assets: Res<MarkerAssets>,
    mut scene: ResMut<SceneEntities>,
) {
    if !refresh_requested(&mut refreshes, SceneRefresh::AnnotationMarkers) {
        return;
    }

    for (_, entity) in scene.markers.drain() {
        commands.entity(entity).despawn();
    }

    if !state.show_annotations {
        debug!("Annotation markers hidden");
        return;
    }

    for annotation in state.annotations.iter() {
        let entity = commands
            .spawn((
                Mesh3d(marker_assets.mesh.clone()),
                MeshMaterial3d(marker_assets.material.clone()),
                Transform::from_translation(annotation.position()),
                NotShadowCaster,
                AnnotationMarker {
                    id: annotation.id.clone(),
                },
                Name::new(format!("AnnotationMarker {}", annotation.title)),
            ))
            .id();
        scene.markers.insert(annotation.id.clone(), entity);
    }

    debug!("Annotation markers refreshed: {}", scene.markers.len());
}
