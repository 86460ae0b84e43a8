use crate::engine::camera::first_person::FirstPersonRig;
use crate::engine::camera::orbit::OrbitRig;
use crate::engine::core::app_state::CameraMode;
use bevy::prelude::*;
use constants::camera::{DEFAULT_CAMERA_POSITION, DEFAULT_CAMERA_TARGET};

/// The active camera control scheme. Only one variant exists at a time, so an
/// inactive scheme cannot hold pointer capture or movement intent.
#[derive(Resource, Debug, Clone, PartialEq)]
pub enum CameraRig {
    Orbit(OrbitRig),
    FirstPerson(FirstPersonRig),
}

impl Default for CameraRig {
    fn default() -> Self {
        Self::Orbit(OrbitRig::looking_from(
            DEFAULT_CAMERA_POSITION,
            DEFAULT_CAMERA_TARGET,
        ))
    }
}

impl CameraRig {
    pub fn mode(&self) -> CameraMode {
        match self {
            Self::Orbit(_) => CameraMode::Orbit,
            Self::FirstPerson(_) => CameraMode::FirstPerson,
        }
    }

    pub fn is_captured(&self) -> bool {
        matches!(self, Self::FirstPerson(rig) if rig.is_captured())
    }

    /// Switch scheme, carrying the camera pose across. Leaving first-person
    /// drops its capture and held keys with it.
    pub fn switch_to(&mut self, mode: CameraMode, transform: &Transform) {
        if self.mode() == mode {
            return;
        }
        *self = match (&*self, mode) {
            (Self::Orbit(orbit), CameraMode::FirstPerson) => {
                Self::FirstPerson(FirstPersonRig::from_transform(transform, orbit.target))
            }
            (Self::FirstPerson(walk), CameraMode::Orbit) => {
                Self::Orbit(OrbitRig::looking_from(transform.translation, walk.orbit_target))
            }
            _ => return,
        };
    }

    /// Engage pointer capture. Only first-person can hold it.
    pub fn capture(&mut self) -> bool {
        match self {
            Self::FirstPerson(rig) => rig.capture(),
            Self::Orbit(_) => false,
        }
    }

    pub fn release(&mut self) -> bool {
        match self {
            Self::FirstPerson(rig) => rig.release(),
            Self::Orbit(_) => false,
        }
    }

    /// Orbit returns to the default pose and target; first-person only moves
    /// back to the default position.
    pub fn reset(&mut self, transform: &mut Transform) {
        match self {
            Self::Orbit(orbit) => {
                *orbit = OrbitRig::looking_from(DEFAULT_CAMERA_POSITION, DEFAULT_CAMERA_TARGET);
                *transform = orbit.transform();
            }
            Self::FirstPerson(_) => {
                transform.translation = DEFAULT_CAMERA_POSITION;
            }
        }
    }

    /// Place the camera at `eye` looking at `target`, which also becomes the
    /// orbit target.
    pub fn frame(&mut self, eye: Vec3, target: Vec3, transform: &mut Transform) {
        *transform = Transform::from_translation(eye).looking_at(target, Vec3::Y);
        match self {
            Self::Orbit(orbit) => *orbit = OrbitRig::looking_from(eye, target),
            Self::FirstPerson(walk) => {
                walk.orbit_target = target;
                walk.align_to(transform);
            }
        }
    }

    /// Advance one frame and write the result into the camera transform.
    pub fn advance(&mut self, transform: &mut Transform, dt: f32) {
        match self {
            Self::Orbit(orbit) => *transform = orbit.update(),
            Self::FirstPerson(walk) => {
                walk.integrate(&mut transform.translation, dt);
                transform.rotation = walk.rotation();
            }
        }
    }
}
