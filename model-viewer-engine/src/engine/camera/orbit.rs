use bevy::prelude::*;
use constants::camera::{
    ORBIT_DAMPING, ORBIT_MAX_DISTANCE, ORBIT_MAX_POLAR, ORBIT_MIN_DISTANCE, ORBIT_MIN_POLAR,
    ORBIT_ROTATE_SPEED, ORBIT_ZOOM_STEP,
};

/// Damped orbit around a target point, tracked in spherical coordinates
/// (polar angle measured from +Y, azimuth around Y starting at +Z).
#[derive(Debug, Clone, PartialEq)]
pub struct OrbitRig {
    pub target: Vec3,
    radius: f32,
    polar: f32,
    azimuth: f32,
    polar_velocity: f32,
    azimuth_velocity: f32,
    pending_scale: f32,
}

impl OrbitRig {
    pub fn looking_from(eye: Vec3, target: Vec3) -> Self {
        let offset = eye - target;
        let radius = offset.length();
        let (polar, azimuth) = if radius > f32::EPSILON {
            (
                (offset.y / radius).clamp(-1.0, 1.0).acos(),
                offset.x.atan2(offset.z),
            )
        } else {
            (ORBIT_MIN_POLAR, 0.0)
        };

        Self {
            target,
            radius: radius.clamp(ORBIT_MIN_DISTANCE, ORBIT_MAX_DISTANCE),
            polar: polar.clamp(ORBIT_MIN_POLAR, ORBIT_MAX_POLAR),
            azimuth,
            polar_velocity: 0.0,
            azimuth_velocity: 0.0,
            pending_scale: 1.0,
        }
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn polar(&self) -> f32 {
        self.polar
    }

    pub fn eye(&self) -> Vec3 {
        let sin_polar = self.polar.sin();
        self.target
            + Vec3::new(
                self.radius * sin_polar * self.azimuth.sin(),
                self.radius * self.polar.cos(),
                self.radius * sin_polar * self.azimuth.cos(),
            )
    }

    /// Queue a drag in pixels. Dragging right swings the camera left.
    pub fn rotate(&mut self, drag: Vec2) {
        self.azimuth_velocity -= drag.x * ORBIT_ROTATE_SPEED;
        self.polar_velocity -= drag.y * ORBIT_ROTATE_SPEED;
    }

    /// Zoom by scroll lines; positive moves closer.
    pub fn zoom(&mut self, lines: f32) {
        self.pending_scale *= (1.0 - ORBIT_ZOOM_STEP).powf(lines);
    }

    /// Advance one frame of damped motion and return the new camera transform.
    pub fn update(&mut self) -> Transform {
        self.azimuth += self.azimuth_velocity * ORBIT_DAMPING;
        self.polar = (self.polar + self.polar_velocity * ORBIT_DAMPING)
            .clamp(ORBIT_MIN_POLAR, ORBIT_MAX_POLAR);
        self.radius =
            (self.radius * self.pending_scale).clamp(ORBIT_MIN_DISTANCE, ORBIT_MAX_DISTANCE);

        self.azimuth_velocity *= 1.0 - ORBIT_DAMPING;
        self.polar_velocity *= 1.0 - ORBIT_DAMPING;
        self.pending_scale = 1.0;

        self.transform()
    }

    pub fn transform(&self) -> Transform {
        Transform::from_translation(self.eye()).looking_at(self.target, Vec3::Y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spherical_round_trip_preserves_eye() {
        let eye = Vec3::new(0.0, 2.0, 5.0);
        let rig = OrbitRig::looking_from(eye, Vec3::ZERO);
        assert!(rig.eye().distance(eye) < 1e-4);
    }

    #[test]
    fn polar_angle_stays_above_ground() {
        let mut rig = OrbitRig::looking_from(Vec3::new(0.0, 2.0, 5.0), Vec3::ZERO);
        rig.rotate(Vec2::new(0.0, -100_000.0));
        for _ in 0..200 {
            rig.update();
        }
        assert!(rig.polar() <= ORBIT_MAX_POLAR + 1e-6);
        assert!(rig.eye().y >= -1e-4);

        rig.rotate(Vec2::new(0.0, 100_000.0));
        for _ in 0..200 {
            rig.update();
        }
        assert!(rig.polar() >= ORBIT_MIN_POLAR - 1e-6);
    }

    #[test]
    fn zoom_is_bounded() {
        let mut rig = OrbitRig::looking_from(Vec3::new(0.0, 2.0, 5.0), Vec3::ZERO);
        rig.zoom(1_000.0);
        rig.update();
        assert_eq!(rig.radius(), ORBIT_MIN_DISTANCE);

        rig.zoom(-1_000.0);
        rig.update();
        assert_eq!(rig.radius(), ORBIT_MAX_DISTANCE);
    }

    #[test]
    fn rotation_decays_after_release() {
        let mut rig = OrbitRig::looking_from(Vec3::new(0.0, 2.0, 5.0), Vec3::ZERO);
        rig.rotate(Vec2::new(40.0, 0.0));
        let first = rig.update().translation;
        for _ in 0..400 {
            rig.update();
        }
        let settled = rig.update().translation;
        let later = rig.update().translation;
        assert!(first.distance(Vec3::new(0.0, 2.0, 5.0)) > 0.0);
        assert!(settled.distance(later) < 1e-4);
    }
}
