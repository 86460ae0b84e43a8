use crate::engine::annotations::store::{Annotation, AnnotationStore};
use crate::engine::core::viewer_config::ViewerConfig;
use crate::engine::lighting::sun::{is_night, normalise_time_of_day};
use crate::engine::loading::model_format::ModelFile;
use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// The two mutually exclusive camera control schemes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CameraMode {
    #[default]
    Orbit,
    FirstPerson,
}

impl CameraMode {
    pub fn from_string(s: &str) -> Option<Self> {
        match s {
            "orbit" => Some(Self::Orbit),
            "firstPerson" | "first_person" => Some(Self::FirstPerson),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Orbit => "orbit",
            Self::FirstPerson => "firstPerson",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Self::Orbit => Self::FirstPerson,
            Self::FirstPerson => Self::Orbit,
        }
    }
}

/// User-facing state properties. Each change maps to its own scene refreshes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewerProperty {
    Annotations,
    ShowAnnotations,
    TimeOfDay,
    NightLightsEnabled,
    ModelFile,
    CameraMode,
}

/// Mutations of the application state. Applied by a single system.
#[derive(Event, Debug, Clone)]
pub enum ViewerCommand {
    AddAnnotation(Annotation),
    EditAnnotation {
        id: String,
        title: String,
        description: String,
    },
    DeleteAnnotation(String),
    SetShowAnnotations(bool),
    ToggleAnnotations,
    SetTimeOfDay(f32),
    SetNightLightsEnabled(bool),
    ToggleNightLights,
    SelectModel(ModelFile),
    SetCameraMode(CameraMode),
}

impl ViewerCommand {
    /// The property this command writes, whether or not the value changes.
    pub fn property(&self) -> ViewerProperty {
        match self {
            Self::AddAnnotation(_) | Self::EditAnnotation { .. } | Self::DeleteAnnotation(_) => {
                ViewerProperty::Annotations
            }
            Self::SetShowAnnotations(_) | Self::ToggleAnnotations => ViewerProperty::ShowAnnotations,
            Self::SetTimeOfDay(_) => ViewerProperty::TimeOfDay,
            Self::SetNightLightsEnabled(_) | Self::ToggleNightLights => {
                ViewerProperty::NightLightsEnabled
            }
            Self::SelectModel(_) => ViewerProperty::ModelFile,
            Self::SetCameraMode(_) => ViewerProperty::CameraMode,
        }
    }
}

/// Top-level application state. The single source of truth the scene is
/// derived from.
#[derive(Resource, Debug, Clone)]
pub struct ViewerState {
    pub annotations: AnnotationStore,
    pub show_annotations: bool,
    pub time_of_day: f32,
    pub night_lights_enabled: bool,
    pub model_file: Option<ModelFile>,
    pub camera_mode: CameraMode,
    /// Properties some command has already written. The startup config
    /// leaves these alone.
    pub(crate) touched: HashSet<ViewerProperty>,
}

impl Default for ViewerState {
    fn default() -> Self {
        Self {
            annotations: AnnotationStore::default(),
            show_annotations: true,
            time_of_day: 12.0,
            night_lights_enabled: true,
            model_file: None,
            camera_mode: CameraMode::Orbit,
            touched: HashSet::new(),
        }
    }
}

impl ViewerState {
    pub fn is_night(&self) -> bool {
        is_night(self.time_of_day)
    }

    /// Apply a command, returning the property it changed (if any).
    pub fn apply(&mut self, command: ViewerCommand) -> Option<ViewerProperty> {
        self.touched.insert(command.property());
        match command {
            ViewerCommand::AddAnnotation(annotation) => self
                .annotations
                .add(annotation)
                .then_some(ViewerProperty::Annotations),
            ViewerCommand::EditAnnotation {
                id,
                title,
                description,
            } => self
                .annotations
                .edit(&id, &title, &description)
                .then_some(ViewerProperty::Annotations),
            ViewerCommand::DeleteAnnotation(id) => self
                .annotations
                .remove(&id)
                .then_some(ViewerProperty::Annotations),
            ViewerCommand::SetShowAnnotations(show) => {
                Self::replace(&mut self.show_annotations, show, ViewerProperty::ShowAnnotations)
            }
            ViewerCommand::ToggleAnnotations => {
                self.show_annotations = !self.show_annotations;
                Some(ViewerProperty::ShowAnnotations)
            }
            ViewerCommand::SetTimeOfDay(hour) => {
                let Some(hour) = normalise_time_of_day(hour) else {
                    warn!("Ignoring non-finite time of day {}", hour);
                    return None;
                };
                Self::replace(&mut self.time_of_day, hour, ViewerProperty::TimeOfDay)
            }
            ViewerCommand::SetNightLightsEnabled(enabled) => Self::replace(
                &mut self.night_lights_enabled,
                enabled,
                ViewerProperty::NightLightsEnabled,
            ),
            ViewerCommand::ToggleNightLights => {
                self.night_lights_enabled = !self.night_lights_enabled;
                Some(ViewerProperty::NightLightsEnabled)
            }
            ViewerCommand::SelectModel(file) => {
                // Re-selecting the same file reloads it.
                self.model_file = Some(file);
                Some(ViewerProperty::ModelFile)
            }
            ViewerCommand::SetCameraMode(mode) => {
                Self::replace(&mut self.camera_mode, mode, ViewerProperty::CameraMode)
            }
        }
    }

    /// Apply the startup config to every property nothing has written yet,
    /// returning the properties that changed.
    pub fn apply_config(&mut self, config: &ViewerConfig) -> Vec<ViewerProperty> {
        let mut changed = Vec::new();
        for command in config.commands() {
            if self.touched.contains(&command.property()) {
                debug!("Config skips {:?}, already set by the host", command.property());
                continue;
            }
            changed.extend(self.apply(command));
        }
        changed
    }

    fn replace<T: PartialEq>(slot: &mut T, value: T, property: ViewerProperty) -> Option<ViewerProperty> {
        if *slot == value {
            return None;
        }
        *slot = value;
        Some(property)
    }

    /// Snapshot sent to the host UI.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "annotations": self.annotations.as_slice(),
            "show_annotations": self.show_annotations,
            "time_of_day": self.time_of_day,
            "night_lights_enabled": self.night_lights_enabled,
            "is_night": self.is_night(),
            "model_file": self.model_file.as_ref().map(|f| f.name()),
            "camera_mode": self.camera_mode.as_str(),
        })
    }
}

/// Whether the viewer is still live. Frame systems stop once torn down.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ViewerLifecycle {
    #[default]
    Running,
    TornDown,
}

pub fn viewer_running(lifecycle: Res<ViewerLifecycle>) -> bool {
    *lifecycle == ViewerLifecycle::Running
}

#[derive(Component)]
pub struct FpsText;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_initial_viewer() {
        let state = ViewerState::default();
        assert!(state.annotations.is_empty());
        assert!(state.show_annotations);
        assert_eq!(state.time_of_day, 12.0);
        assert!(state.night_lights_enabled);
        assert!(state.model_file.is_none());
        assert_eq!(state.camera_mode, CameraMode::Orbit);
        assert!(!state.is_night());
    }

    #[test]
    fn unchanged_values_report_no_property() {
        let mut state = ViewerState::default();
        assert_eq!(state.apply(ViewerCommand::SetShowAnnotations(true)), None);
        assert_eq!(state.apply(ViewerCommand::SetTimeOfDay(12.0)), None);
        assert_eq!(state.apply(ViewerCommand::SetNightLightsEnabled(true)), None);
        assert_eq!(state.apply(ViewerCommand::SetCameraMode(CameraMode::Orbit)), None);
    }

    #[test]
    fn each_command_reports_its_property() {
        let mut state = ViewerState::default();
        assert_eq!(
            state.apply(ViewerCommand::SetTimeOfDay(22.0)),
            Some(ViewerProperty::TimeOfDay)
        );
        assert!(state.is_night());
        assert_eq!(
            state.apply(ViewerCommand::ToggleNightLights),
            Some(ViewerProperty::NightLightsEnabled)
        );
        assert!(!state.night_lights_enabled);
        assert_eq!(
            state.apply(ViewerCommand::SetCameraMode(CameraMode::FirstPerson)),
            Some(ViewerProperty::CameraMode)
        );
        assert_eq!(
            state.apply(ViewerCommand::ToggleAnnotations),
            Some(ViewerProperty::ShowAnnotations)
        );
        assert!(!state.show_annotations);
    }

    #[test]
    fn annotation_commands_on_unknown_ids_change_nothing() {
        let mut state = ViewerState::default();
        state.apply(ViewerCommand::AddAnnotation(Annotation::at(Vec3::ZERO)));
        let before = state.annotations.as_slice().to_vec();

        assert_eq!(state.apply(ViewerCommand::DeleteAnnotation("nope".into())), None);
        assert_eq!(
            state.apply(ViewerCommand::EditAnnotation {
                id: "nope".into(),
                title: "t".into(),
                description: "d".into(),
            }),
            None
        );
        assert_eq!(state.annotations.as_slice(), before.as_slice());
    }

    #[test]
    fn non_finite_time_is_ignored_and_out_of_range_wraps() {
        let mut state = ViewerState::default();
        assert_eq!(state.apply(ViewerCommand::SetTimeOfDay(f32::NAN)), None);
        assert_eq!(state.time_of_day, 12.0);

        state.apply(ViewerCommand::SetTimeOfDay(26.0));
        assert_eq!(state.time_of_day, 2.0);
        assert!(state.is_night());
    }

    #[test]
    fn selecting_a_model_records_it() {
        let mut state = ViewerState::default();
        let file = ModelFile::new("statue.OBJ", b"v 0 0 0".to_vec()).unwrap();
        assert_eq!(
            state.apply(ViewerCommand::SelectModel(file)),
            Some(ViewerProperty::ModelFile)
        );
        assert_eq!(state.model_file.as_ref().map(|f| f.name()), Some("statue.OBJ"));
    }

    #[test]
    fn config_never_overrides_host_settings() {
        let mut state = ViewerState::default();
        state.apply(ViewerCommand::SetCameraMode(CameraMode::FirstPerson));
        state.apply(ViewerCommand::SetTimeOfDay(22.0));

        let config = ViewerConfig {
            time_of_day: Some(12.0),
            show_annotations: Some(false),
            night_lights_enabled: None,
            camera_mode: Some(CameraMode::Orbit),
        };
        let changed = state.apply_config(&config);

        assert_eq!(changed, vec![ViewerProperty::ShowAnnotations]);
        assert_eq!(state.camera_mode, CameraMode::FirstPerson);
        assert_eq!(state.time_of_day, 22.0);
        assert!(!state.show_annotations);
    }

    #[test]
    fn host_setting_the_same_value_still_wins_over_config() {
        let mut state = ViewerState::default();
        assert_eq!(state.apply(ViewerCommand::SetCameraMode(CameraMode::Orbit)), None);

        let config = ViewerConfig {
            camera_mode: Some(CameraMode::FirstPerson),
            ..default()
        };
        assert!(state.apply_config(&config).is_empty());
        assert_eq!(state.camera_mode, CameraMode::Orbit);
    }

    #[test]
    fn camera_mode_strings() {
        assert_eq!(CameraMode::from_string("orbit"), Some(CameraMode::Orbit));
        assert_eq!(CameraMode::from_string("firstPerson"), Some(CameraMode::FirstPerson));
        assert_eq!(CameraMode::from_string("fly"), None);
        assert_eq!(CameraMode::Orbit.toggled(), CameraMode::FirstPerson);
        assert_eq!(
            serde_json::to_value(CameraMode::FirstPerson).unwrap(),
            serde_json::json!("firstPerson")
        );
    }
}
