use bevy::math::Vec3;

/// Default camera pose used at startup and by the reset operation.
pub const DEFAULT_CAMERA_POSITION: Vec3 = Vec3::new(0.0, 2.0, 5.0);
pub const DEFAULT_CAMERA_TARGET: Vec3 = Vec3::ZERO;

pub const CAMERA_FOV_DEGREES: f32 = 60.0;
pub const CAMERA_NEAR: f32 = 0.1;
pub const CAMERA_FAR: f32 = 1000.0;

// Orbit controls
pub const ORBIT_MIN_DISTANCE: f32 = 1.0;
pub const ORBIT_MAX_DISTANCE: f32 = 100.0;
pub const ORBIT_MIN_POLAR: f32 = 0.01;
pub const ORBIT_MAX_POLAR: f32 = std::f32::consts::FRAC_PI_2;
pub const ORBIT_DAMPING: f32 = 0.05;
pub const ORBIT_ROTATE_SPEED: f32 = 0.005;
/// Fractional zoom per scroll line.
pub const ORBIT_ZOOM_STEP: f32 = 0.05;
/// Pixel scroll units are converted to lines with this factor.
pub const ORBIT_PIXELS_PER_LINE: f32 = 0.05;

// First-person controls
pub const FIRST_PERSON_SPEED: f32 = 5.0;
pub const FIRST_PERSON_VELOCITY_DECAY: f32 = 10.0;
pub const FIRST_PERSON_LOOK_SPEED: f32 = 0.002;
pub const FIRST_PERSON_MAX_PITCH: f32 = std::f32::consts::FRAC_PI_2 - 0.01;

/// Camera distance as a multiple of the largest model dimension when framing.
pub const MODEL_FRAMING_DISTANCE_FACTOR: f32 = 2.0;
