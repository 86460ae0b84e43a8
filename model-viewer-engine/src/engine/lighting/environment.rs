use crate::engine::camera::ViewerCamera;
use crate::engine::core::app_state::ViewerState;
use crate::engine::lighting::environment_intensity;
use crate::engine::lighting::panorama::equirect_to_cubemap;
use crate::rpc::web_rpc::WebRpcInterface;
use bevy::asset::LoadState;
use bevy::prelude::*;
use constants::assets::ENVIRONMENT_HDRI_PATH;
use constants::render_settings::ENVIRONMENT_CUBEMAP_FACE_SIZE;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EnvironmentStatus {
    #[default]
    NotRequested,
    Loading,
    Applied,
    Failed,
    Released,
}

/// The single environment panorama, loaded once at startup.
#[derive(Resource, Default)]
pub struct EnvironmentState {
    pub handle: Handle<Image>,
    /// Cube-mapped copy lighting the scene.
    pub cubemap: Handle<Image>,
    pub status: EnvironmentStatus,
}

impl EnvironmentState {
    pub fn is_applied(&self) -> bool {
        self.status == EnvironmentStatus::Applied
    }
}

pub fn start_environment_load(
    asset_server: Res<AssetServer>,
    mut environment: ResMut<EnvironmentState>,
) {
    info!("Loading environment panorama from: {}", ENVIRONMENT_HDRI_PATH);
    environment.handle = asset_server.load(ENVIRONMENT_HDRI_PATH);
    environment.status = EnvironmentStatus::Loading;
}

/// Light the scene with the panorama once it arrives. A missing or broken
/// file leaves the sun and ambient light on their own.
pub fn watch_environment_load(
    mut commands: Commands,
    asset_server: Res<AssetServer>,
    state: Res<ViewerState>,
    mut environment: ResMut<EnvironmentState>,
    mut images: ResMut<Assets<Image>>,
    cameras: Query<Entity, With<ViewerCamera>>,
    mut rpc_interface: ResMut<WebRpcInterface>,
) {
    if environment.status != EnvironmentStatus::Loading {
        return;
    }

    if let Some(panorama) = images.get(&environment.handle) {
        let Some(cubemap) = equirect_to_cubemap(panorama, ENVIRONMENT_CUBEMAP_FACE_SIZE) else {
            fail_environment(
                &mut environment,
                &mut rpc_interface,
                "panorama is not a floating-point RGBA image",
            );
            return;
        };

        let cubemap = images.add(cubemap);
        for camera in &cameras {
            commands.entity(camera).insert(EnvironmentMapLight {
                diffuse_map: cubemap.clone(),
                specular_map: cubemap.clone(),
                intensity: environment_intensity(state.is_night()),
                ..default()
            });
        }
        environment.cubemap = cubemap;
        environment.status = EnvironmentStatus::Applied;
        info!("Environment panorama applied as image-based lighting");
        return;
    }

    if let Some(LoadState::Failed(err)) = asset_server.get_load_state(&environment.handle) {
        fail_environment(&mut environment, &mut rpc_interface, &err.to_string());
    }
}

fn fail_environment(
    environment: &mut EnvironmentState,
    rpc_interface: &mut WebRpcInterface,
    reason: &str,
) {
    warn!("Environment panorama unavailable, lighting without it: {}", reason);
    environment.status = EnvironmentStatus::Failed;
    rpc_interface.send_notification(
        "environment_load_failed",
        serde_json::json!({ "path": ENVIRONMENT_HDRI_PATH, "reason": reason }),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::app::TaskPoolPlugin;
    use bevy::asset::RenderAssetUsages;
    use bevy::render::render_resource::{Extent3d, TextureDimension, TextureFormat};
    use constants::lighting::{AMBIENT_INTENSITY_NIGHT, ENVIRONMENT_LIGHT_SCALE};

    fn environment_app(panorama: Image, time_of_day: f32) -> (App, Entity) {
        let mut app = App::new();
        app.add_plugins((TaskPoolPlugin::default(), AssetPlugin::default()))
            .init_asset::<Image>()
            .insert_resource(ViewerState {
                time_of_day,
                ..default()
            })
            .init_resource::<EnvironmentState>()
            .init_resource::<WebRpcInterface>()
            .add_systems(Update, watch_environment_load);

        let camera = app.world_mut().spawn(ViewerCamera).id();
        let handle = app.world_mut().resource_mut::<Assets<Image>>().add(panorama);
        let mut environment = app.world_mut().resource_mut::<EnvironmentState>();
        environment.handle = handle;
        environment.status = EnvironmentStatus::Loading;
        (app, camera)
    }

    fn panorama(format: TextureFormat, bytes_per_texel: usize) -> Image {
        Image::new(
            Extent3d {
                width: 4,
                height: 2,
                depth_or_array_layers: 1,
            },
            TextureDimension::D2,
            vec![0; 4 * 2 * bytes_per_texel],
            format,
            RenderAssetUsages::default(),
        )
    }

    #[test]
    fn loaded_panorama_lights_the_camera() {
        let (mut app, camera) = environment_app(panorama(TextureFormat::Rgba32Float, 16), 22.0);
        app.update();

        let environment = app.world().resource::<EnvironmentState>();
        assert!(environment.is_applied());
        let cubemap = environment.cubemap.clone();

        let light = app
            .world()
            .get::<EnvironmentMapLight>(camera)
            .expect("environment light on camera");
        assert_eq!(light.diffuse_map, cubemap);
        assert_eq!(light.specular_map, cubemap);
        assert!((light.intensity - AMBIENT_INTENSITY_NIGHT * ENVIRONMENT_LIGHT_SCALE).abs() < 1e-3);

        let images = app.world().resource::<Assets<Image>>();
        let image = images.get(&cubemap).expect("cubemap stored");
        assert_eq!(image.texture_descriptor.size.depth_or_array_layers, 6);
    }

    #[test]
    fn unusable_panorama_fails_and_notifies_the_host() {
        let (mut app, camera) = environment_app(panorama(TextureFormat::Rgba8UnormSrgb, 4), 12.0);
        app.update();

        assert_eq!(
            app.world().resource::<EnvironmentState>().status,
            EnvironmentStatus::Failed
        );
        assert!(app.world().get::<EnvironmentMapLight>(camera).is_none());
        assert!(
            app.world()
                .resource::<WebRpcInterface>()
                .pending_notifications()
                .any(|n| n.method == "environment_load_failed")
        );

        // Failure is terminal; later frames do nothing.
        app.update();
        assert_eq!(
            app.world()
                .resource::<WebRpcInterface>()
                .pending_notifications()
                .filter(|n| n.method == "environment_load_failed")
                .count(),
            1
        );
    }
}
