//! Day/night lighting derived from the time of day.
//!
//! Pure sun/ambient/night-light rules live in `sun`; the systems here push
//! their results into the Bevy world whenever the orchestrator requests a
//! lighting or night-light refresh.

/// Environment panorama loading; lights the scene through the camera.
pub mod environment;

/// Auxiliary point lights that exist only at night.
pub mod night_lights;

/// Equirectangular panorama to cubemap resampling.
pub mod panorama;

/// Pure sun, ambient and night-light rules.
pub mod sun;

use crate::engine::camera::ViewerCamera;
use crate::engine::core::app_state::ViewerState;
use crate::engine::lighting::sun::{ambient_params, hex_colour, sky_colour, sun_params};
use crate::engine::scene::orchestrator::{SceneRefresh, refresh_requested};
use bevy::pbr::CascadeShadowConfigBuilder;
use bevy::prelude::*;
use constants::lighting::{AMBIENT_BRIGHTNESS_SCALE, ENVIRONMENT_LIGHT_SCALE, SUN_ILLUMINANCE_LUX};
use constants::render_settings::{SUN_SHADOW_FAR, SUN_SHADOW_NEAR, SUN_SHADOWS_ENABLED};

/// Marker for the directional sun light.
#[derive(Component)]
pub struct SunLight;

pub fn spawn_sun(commands: &mut Commands) {
    commands.spawn((
        DirectionalLight {
            shadows_enabled: SUN_SHADOWS_ENABLED,
            ..default()
        },
        // One cascade over a fixed depth range keeps shadows stable as the
        // camera moves.
        CascadeShadowConfigBuilder {
            num_cascades: 1,
            minimum_distance: SUN_SHADOW_NEAR,
            maximum_distance: SUN_SHADOW_FAR,
            first_cascade_far_bound: SUN_SHADOW_FAR,
            overlap_proportion: 0.0,
        }
        .build(),
        Transform::from_xyz(5.0, 10.0, 7.5).looking_at(Vec3::ZERO, Vec3::Y),
        SunLight,
        Name::new("Sun"),
    ));
}

/// Image-based light brightness; follows the ambient level for the hour.
pub fn environment_intensity(is_night: bool) -> f32 {
    ambient_params(is_night).intensity * ENVIRONMENT_LIGHT_SCALE
}

/// Recompute sun, ambient, environment light and the sky colour.
pub fn refresh_lighting(
    mut refreshes: EventReader<SceneRefresh>,
    state: Res<ViewerState>,
    mut sun_query: Query<(&mut DirectionalLight, &mut Transform), With<SunLight>>,
    mut environment_lights: Query<&mut EnvironmentMapLight, With<ViewerCamera>>,
    mut ambient: ResMut<AmbientLight>,
    mut clear_colour: ResMut<ClearColor>,
) {
    if !refresh_requested(&mut refreshes, SceneRefresh::Lighting) {
        return;
    }

    let sun = sun_params(state.time_of_day);
    for (mut light, mut transform) in &mut sun_query {
        light.color = hex_colour(sun.colour);
        light.illuminance = sun.intensity * SUN_ILLUMINANCE_LUX;
        *transform = Transform::from_translation(sun.position).looking_at(Vec3::ZERO, Vec3::Y);
    }

    let is_night = state.is_night();
    let ambient_light = ambient_params(is_night);
    ambient.color = hex_colour(ambient_light.colour);
    ambient.brightness = ambient_light.intensity * AMBIENT_BRIGHTNESS_SCALE;

    for mut environment_light in &mut environment_lights {
        environment_light.intensity = environment_intensity(is_night);
    }
    // The panorama only lights the scene; the backdrop is always the flat sky.
    clear_colour.0 = hex_colour(sky_colour(is_night));

    debug!(
        "Lighting refreshed: hour {:.2}, sun intensity {:.3}, night {}",
        state.time_of_day, sun.intensity, is_night
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::pbr::CascadeShadowConfig;
    use constants::lighting::{AMBIENT_COLOUR_NIGHT, SKY_COLOUR_DAY, SKY_COLOUR_NIGHT};

    fn lighting_app(time_of_day: f32) -> App {
        let mut app = App::new();
        app.add_event::<SceneRefresh>()
            .insert_resource(ViewerState {
                time_of_day,
                ..default()
            })
            .insert_resource(AmbientLight::default())
            .insert_resource(ClearColor(Color::BLACK))
            .add_systems(Startup, |mut commands: Commands| spawn_sun(&mut commands))
            .add_systems(Update, refresh_lighting);
        app
    }

    fn sun_illuminance(app: &mut App) -> f32 {
        let mut query = app.world_mut().query_filtered::<&DirectionalLight, With<SunLight>>();
        query.single(app.world()).unwrap().illuminance
    }

    #[test]
    fn noon_refresh_applies_full_sun_and_day_ambient() {
        let mut app = lighting_app(12.0);
        app.world_mut().send_event(SceneRefresh::Lighting);
        app.update();

        assert!((sun_illuminance(&mut app) - SUN_ILLUMINANCE_LUX).abs() < 1.0);
        let ambient = app.world().resource::<AmbientLight>();
        assert!((ambient.brightness - 0.4 * AMBIENT_BRIGHTNESS_SCALE).abs() < 1e-3);
    }

    #[test]
    fn night_refresh_darkens_everything_and_sets_night_sky() {
        let mut app = lighting_app(22.0);
        app.world_mut().send_event(SceneRefresh::Lighting);
        app.update();

        assert_eq!(sun_illuminance(&mut app), 0.0);
        let ambient = app.world().resource::<AmbientLight>();
        assert!((ambient.brightness - 0.15 * AMBIENT_BRIGHTNESS_SCALE).abs() < 1e-3);
        assert_eq!(ambient.color, hex_colour(AMBIENT_COLOUR_NIGHT));
        assert_eq!(app.world().resource::<ClearColor>().0, hex_colour(SKY_COLOUR_NIGHT));
    }

    #[test]
    fn environment_light_follows_the_hour_and_sky_stays_flat() {
        let mut app = lighting_app(12.0);
        let camera = app
            .world_mut()
            .spawn((
                ViewerCamera,
                EnvironmentMapLight {
                    intensity: 1.0,
                    ..default()
                },
            ))
            .id();
        app.world_mut().send_event(SceneRefresh::Lighting);
        app.update();
        let day = app.world().get::<EnvironmentMapLight>(camera).map(|l| l.intensity);
        assert_eq!(day, Some(environment_intensity(false)));
        assert_eq!(app.world().resource::<ClearColor>().0, hex_colour(SKY_COLOUR_DAY));

        app.world_mut().resource_mut::<ViewerState>().time_of_day = 22.0;
        app.world_mut().send_event(SceneRefresh::Lighting);
        app.update();
        let night = app.world().get::<EnvironmentMapLight>(camera).map(|l| l.intensity);
        assert_eq!(night, Some(environment_intensity(true)));
        assert!(environment_intensity(true) < environment_intensity(false));
        assert_eq!(app.world().resource::<ClearColor>().0, hex_colour(SKY_COLOUR_NIGHT));
    }

    #[test]
    fn other_refreshes_leave_lighting_alone() {
        let mut app = lighting_app(22.0);
        app.update();
        let before = sun_illuminance(&mut app);

        app.world_mut().send_event(SceneRefresh::AnnotationMarkers);
        app.update();
        assert_eq!(sun_illuminance(&mut app), before);
    }

    #[test]
    fn sun_shadows_cover_a_fixed_depth_range() {
        let mut app = lighting_app(12.0);
        app.update();

        let mut query = app
            .world_mut()
            .query_filtered::<&CascadeShadowConfig, With<SunLight>>();
        let cascades = query.single(app.world()).expect("sun cascades");
        assert_eq!(cascades.bounds, vec![SUN_SHADOW_FAR]);
        assert_eq!(cascades.minimum_distance, SUN_SHADOW_NEAR);
    }
}
