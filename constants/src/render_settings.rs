/// Canvas element the web build renders into.
pub const CANVAS_SELECTOR: &str = "#bevy";

pub const SUN_SHADOWS_ENABLED: bool = true;

/// Depth range covered by the single sun shadow cascade, in world units.
pub const SUN_SHADOW_NEAR: f32 = 0.1;
pub const SUN_SHADOW_FAR: f32 = 50.0;

/// Edge length of each cube face the environment panorama is resampled to.
pub const ENVIRONMENT_CUBEMAP_FACE_SIZE: u32 = 256;

/// Seconds between FPS notifications to the host.
pub const FPS_NOTIFY_INTERVAL_SECS: f32 = 0.5;
