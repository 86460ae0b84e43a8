use bevy::math::EulerRot;
use bevy::prelude::*;
use constants::camera::{
    FIRST_PERSON_LOOK_SPEED, FIRST_PERSON_MAX_PITCH, FIRST_PERSON_SPEED,
    FIRST_PERSON_VELOCITY_DECAY,
};

/// Held movement keys.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MovementIntent {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
}

impl MovementIntent {
    fn slot(&mut self, key: KeyCode) -> Option<&mut bool> {
        match key {
            KeyCode::KeyW | KeyCode::ArrowUp => Some(&mut self.forward),
            KeyCode::KeyS | KeyCode::ArrowDown => Some(&mut self.backward),
            KeyCode::KeyA | KeyCode::ArrowLeft => Some(&mut self.left),
            KeyCode::KeyD | KeyCode::ArrowRight => Some(&mut self.right),
            _ => None,
        }
    }
}

/// Pointer-locked walk camera with velocity-damped movement.
#[derive(Debug, Clone, PartialEq)]
pub struct FirstPersonRig {
    yaw: f32,
    pitch: f32,
    pub velocity: Vec3,
    pub intent: MovementIntent,
    captured: bool,
    /// Where the orbit rig should aim when control returns to it.
    pub orbit_target: Vec3,
}

impl FirstPersonRig {
    /// Start from the camera's current pose, not yet captured.
    pub fn from_transform(transform: &Transform, orbit_target: Vec3) -> Self {
        let (yaw, pitch, _) = transform.rotation.to_euler(EulerRot::YXZ);
        Self {
            yaw,
            pitch: pitch.clamp(-FIRST_PERSON_MAX_PITCH, FIRST_PERSON_MAX_PITCH),
            velocity: Vec3::ZERO,
            intent: MovementIntent::default(),
            captured: false,
            orbit_target,
        }
    }

    pub fn is_captured(&self) -> bool {
        self.captured
    }

    /// Returns true if capture state changed.
    pub fn capture(&mut self) -> bool {
        !std::mem::replace(&mut self.captured, true)
    }

    /// Returns true if capture state changed. Held keys are dropped with it.
    pub fn release(&mut self) -> bool {
        self.intent = MovementIntent::default();
        std::mem::replace(&mut self.captured, false)
    }

    /// Route a movement key. Presses only count while captured; releases
    /// always clear.
    pub fn key(&mut self, key: KeyCode, pressed: bool) {
        let captured = self.captured;
        if let Some(slot) = self.intent.slot(key) {
            if !pressed {
                *slot = false;
            } else if captured {
                *slot = true;
            }
        }
    }

    /// Mouse look in pixels. Ignored unless captured.
    pub fn look(&mut self, delta: Vec2) {
        if !self.captured {
            return;
        }
        self.yaw -= delta.x * FIRST_PERSON_LOOK_SPEED;
        self.pitch = (self.pitch - delta.y * FIRST_PERSON_LOOK_SPEED)
            .clamp(-FIRST_PERSON_MAX_PITCH, FIRST_PERSON_MAX_PITCH);
    }

    pub fn rotation(&self) -> Quat {
        Quat::from_euler(EulerRot::YXZ, self.yaw, self.pitch, 0.0)
    }

    /// Horizontal forward and right vectors for the current heading.
    pub fn horizontal_basis(&self) -> (Vec3, Vec3) {
        let (sin, cos) = self.yaw.sin_cos();
        (Vec3::new(-sin, 0.0, -cos), Vec3::new(cos, 0.0, -sin))
    }

    /// One frame of damped movement. Does nothing unless captured.
    pub fn integrate(&mut self, translation: &mut Vec3, dt: f32) {
        if !self.captured {
            return;
        }

        self.velocity.x -= self.velocity.x * FIRST_PERSON_VELOCITY_DECAY * dt;
        self.velocity.z -= self.velocity.z * FIRST_PERSON_VELOCITY_DECAY * dt;

        let direction = Vec3::new(
            self.intent.right as i32 as f32 - self.intent.left as i32 as f32,
            0.0,
            self.intent.forward as i32 as f32 - self.intent.backward as i32 as f32,
        )
        .normalize_or_zero();

        if self.intent.forward || self.intent.backward {
            self.velocity.z -= direction.z * FIRST_PERSON_SPEED * dt;
        }
        if self.intent.left || self.intent.right {
            self.velocity.x -= direction.x * FIRST_PERSON_SPEED * dt;
        }

        let (forward, right) = self.horizontal_basis();
        *translation += right * (-self.velocity.x * dt);
        *translation += forward * (-self.velocity.z * dt);
    }

    /// Re-derive heading after the camera was placed externally.
    pub fn align_to(&mut self, transform: &Transform) {
        let (yaw, pitch, _) = transform.rotation.to_euler(EulerRot::YXZ);
        self.yaw = yaw;
        self.pitch = pitch.clamp(-FIRST_PERSON_MAX_PITCH, FIRST_PERSON_MAX_PITCH);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn facing_negative_z() -> FirstPersonRig {
        FirstPersonRig::from_transform(&Transform::from_xyz(0.0, 2.0, 5.0), Vec3::ZERO)
    }

    #[test]
    fn keys_ignored_until_captured() {
        let mut rig = facing_negative_z();
        rig.key(KeyCode::KeyW, true);
        assert_eq!(rig.intent, MovementIntent::default());

        rig.capture();
        rig.key(KeyCode::ArrowUp, true);
        assert!(rig.intent.forward);
    }

    #[test]
    fn key_release_clears_even_when_not_captured() {
        let mut rig = facing_negative_z();
        rig.capture();
        rig.key(KeyCode::KeyD, true);
        rig.captured = false;
        rig.key(KeyCode::KeyD, false);
        assert!(!rig.intent.right);
    }

    #[test]
    fn forward_moves_along_view_direction() {
        let mut rig = facing_negative_z();
        rig.capture();
        rig.key(KeyCode::KeyW, true);

        let mut position = Vec3::new(0.0, 2.0, 5.0);
        for _ in 0..60 {
            rig.integrate(&mut position, 1.0 / 60.0);
        }
        assert!(position.z < 5.0);
        assert!(position.x.abs() < 1e-5);
        assert_eq!(position.y, 2.0);
    }

    #[test]
    fn first_frame_follows_damped_integration() {
        let mut rig = facing_negative_z();
        rig.capture();
        rig.key(KeyCode::KeyA, true);

        let dt = 0.1;
        let mut position = Vec3::ZERO;
        rig.integrate(&mut position, dt);

        // v.x = -(-1 * 5 * 0.1) = 0.5; move right by -0.5 * 0.1.
        assert!((rig.velocity.x - 0.5).abs() < 1e-6);
        assert!((position.x + 0.05).abs() < 1e-6);
    }

    #[test]
    fn velocity_decays_without_input() {
        let mut rig = facing_negative_z();
        rig.capture();
        rig.velocity = Vec3::new(1.0, 0.0, -1.0);

        let mut position = Vec3::ZERO;
        rig.integrate(&mut position, 0.05);
        assert!((rig.velocity.x - 0.5).abs() < 1e-6);
        assert!((rig.velocity.z + 0.5).abs() < 1e-6);
    }

    #[test]
    fn no_motion_while_released() {
        let mut rig = facing_negative_z();
        rig.velocity = Vec3::new(1.0, 0.0, 1.0);
        let mut position = Vec3::ZERO;
        rig.integrate(&mut position, 0.1);
        rig.look(Vec2::new(100.0, 100.0));
        assert_eq!(position, Vec3::ZERO);
        assert_eq!(rig.rotation(), facing_negative_z().rotation());
    }

    #[test]
    fn pitch_is_clamped() {
        let mut rig = facing_negative_z();
        rig.capture();
        rig.look(Vec2::new(0.0, -1_000_000.0));
        let (_, pitch, _) = rig.rotation().to_euler(EulerRot::YXZ);
        assert!(pitch <= FIRST_PERSON_MAX_PITCH + 1e-5);
    }
}
