use crate::engine::camera::spawn_viewer_camera;
use crate::engine::lighting::spawn_sun;
use crate::engine::lighting::sun::hex_colour;
use bevy::prelude::*;
use constants::scene::{DEFAULT_CUBE_COLOUR, DEFAULT_CUBE_SIZE, GROUND_COLOUR, GROUND_SIZE};

#[derive(Component)]
pub struct Ground;

/// Placeholder shown before any model is loaded. It stays in the scene.
#[derive(Component)]
pub struct DefaultCube;

pub fn setup_stage(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    spawn_viewer_camera(&mut commands);
    spawn_sun(&mut commands);

    commands.spawn((
        Mesh3d(meshes.add(Plane3d::default().mesh().size(GROUND_SIZE, GROUND_SIZE))),
        MeshMaterial3d(materials.add(StandardMaterial {
            base_color: hex_colour(GROUND_COLOUR),
            perceptual_roughness: 1.0,
            ..default()
        })),
        Transform::IDENTITY,
        Ground,
        Name::new("Ground"),
    ));

    commands.spawn((
        Mesh3d(meshes.add(Cuboid::from_length(DEFAULT_CUBE_SIZE))),
        MeshMaterial3d(materials.add(StandardMaterial {
            base_color: hex_colour(DEFAULT_CUBE_COLOUR),
            ..default()
        })),
        Transform::from_xyz(0.0, DEFAULT_CUBE_SIZE * 0.5, 0.0),
        DefaultCube,
        Name::new("DefaultCube"),
    ));
}
