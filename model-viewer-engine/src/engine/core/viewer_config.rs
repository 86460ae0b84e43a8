use crate::engine::core::app_state::{CameraMode, ViewerCommand};
use bevy::asset::LoadState;
use bevy::prelude::*;
use constants::assets::VIEWER_CONFIG_PATH;
use serde::{Deserialize, Serialize};

/// Optional initial settings shipped next to the viewer. Missing fields keep
/// the built-in defaults.
#[derive(Asset, Debug, Clone, Default, PartialEq, Serialize, Deserialize, TypePath)]
#[serde(default)]
pub struct ViewerConfig {
    pub time_of_day: Option<f32>,
    pub show_annotations: Option<bool>,
    pub night_lights_enabled: Option<bool>,
    pub camera_mode: Option<CameraMode>,
}

impl ViewerConfig {
    /// Commands that move a default viewer to this configuration.
    pub fn commands(&self) -> Vec<ViewerCommand> {
        let mut commands = Vec::new();
        if let Some(hour) = self.time_of_day {
            commands.push(ViewerCommand::SetTimeOfDay(hour));
        }
        if let Some(show) = self.show_annotations {
            commands.push(ViewerCommand::SetShowAnnotations(show));
        }
        if let Some(enabled) = self.night_lights_enabled {
            commands.push(ViewerCommand::SetNightLightsEnabled(enabled));
        }
        if let Some(mode) = self.camera_mode {
            commands.push(ViewerCommand::SetCameraMode(mode));
        }
        commands
    }
}

/// A loaded config, handed to the state writer. Properties the host has
/// already set are skipped there.
#[derive(Event, Debug, Clone)]
pub struct ViewerConfigReady(pub ViewerConfig);

#[derive(Resource, Default)]
pub struct ViewerConfigLoader {
    handle: Option<Handle<ViewerConfig>>,
    applied: bool,
}

pub fn start_viewer_config_load(
    asset_server: Res<AssetServer>,
    mut loader: ResMut<ViewerConfigLoader>,
) {
    info!("Loading viewer config from: {}", VIEWER_CONFIG_PATH);
    loader.handle = Some(asset_server.load(VIEWER_CONFIG_PATH));
}

/// Apply the config once it arrives. A missing file just keeps the defaults.
pub fn apply_viewer_config(
    mut loader: ResMut<ViewerConfigLoader>,
    asset_server: Res<AssetServer>,
    configs: Res<Assets<ViewerConfig>>,
    mut ready: EventWriter<ViewerConfigReady>,
) {
    if loader.applied {
        return;
    }
    let Some(handle) = loader.handle.clone() else {
        return;
    };

    if let Some(config) = configs.get(&handle) {
        info!("Applying viewer config: {:?}", config);
        ready.write(ViewerConfigReady(config.clone()));
        loader.applied = true;
        return;
    }

    if let Some(LoadState::Failed(err)) = asset_server.get_load_state(&handle) {
        info!("No viewer config applied, using defaults: {}", err);
        loader.applied = true;
    }
}
