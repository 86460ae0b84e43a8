use crate::engine::core::app_state::ViewerState;
use crate::engine::lighting::sun::{hex_colour, night_lights_active};
use crate::engine::scene::orchestrator::{SceneEntities, SceneRefresh, refresh_requested};
use bevy::prelude::*;
use constants::lighting::{NIGHT_LIGHT_LUMENS_SCALE, NIGHT_LIGHTS, NightLightLayout};

#[derive(Component)]
pub struct NightLight;

/// Layouts of the lights that should exist for the given flags.
pub fn night_light_layouts(is_night: bool, enabled: bool) -> &'static [NightLightLayout] {
    if night_lights_active(is_night, enabled) {
        &NIGHT_LIGHTS
    } else {
        &[]
    }
}

/// Discard every night light and spawn the set the current state calls for.
pub fn refresh_night_lights(
    mut refreshes: EventReader<SceneRefresh>,
    mut commands: Commands,
    state: Res<ViewerState>,
    mut scene: ResMut<SceneEntities>,
) {
    if !refresh_requested(&mut refreshes, SceneRefresh::NightLights) {
        return;
    }

    for entity in scene.night_lights.drain(..) {
        commands.entity(entity).despawn();
    }

    for layout in night_light_layouts(state.is_night(), state.night_lights_enabled) {
        let entity = commands
            .spawn((
                PointLight {
                    color: hex_colour(layout.colour),
                    intensity: layout.intensity * NIGHT_LIGHT_LUMENS_SCALE,
                    range: layout.range,
                    ..default()
                },
                Transform::from_translation(Vec3::from_array(layout.position)),
                NightLight,
                Name::new("NightLight"),
            ))
            .id();
        scene.night_lights.push(entity);
    }

    debug!("Night lights refreshed: {} active", scene.night_lights.len());
}
