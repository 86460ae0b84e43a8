/// Hour at which the half-day sun phase starts (t = 0).
pub const SUNRISE_HOUR: f32 = 6.0;

/// Length of the daylight half-day in hours (t = 1 at sunset).
pub const DAYLIGHT_HOURS: f32 = 12.0;

/// Night starts at this hour (inclusive).
pub const NIGHT_START_HOUR: f32 = 20.0;

/// Night ends at this hour (exclusive).
pub const NIGHT_END_HOUR: f32 = 6.0;

/// Length of a full day, used to wrap out-of-range input.
pub const HOURS_PER_DAY: f32 = 24.0;

/// Radius of the circle the sun travels on.
pub const SUN_ORBIT_RADIUS: f32 = 10.0;

/// Fixed depth offset of the sun position.
pub const SUN_DEPTH_OFFSET: f32 = 7.5;

/// Lower bound of sin(angle) for the vertical sun coordinate.
/// Keeps the light direction from collapsing onto the horizon.
pub const SUN_MIN_ELEVATION: f32 = 0.05;

/// Phase window (t) below/above which the sun is tinted amber.
pub const SUN_WARM_PHASE_LOW: f32 = 0.2;
pub const SUN_WARM_PHASE_HIGH: f32 = 0.8;

pub const SUN_COLOUR_DAWN_DUSK: u32 = 0xffb347;
pub const SUN_COLOUR_DAY: u32 = 0xfffbe6;

pub const AMBIENT_INTENSITY_DAY: f32 = 0.4;
pub const AMBIENT_INTENSITY_NIGHT: f32 = 0.15;
pub const AMBIENT_COLOUR_DAY: u32 = 0xffffff;
pub const AMBIENT_COLOUR_NIGHT: u32 = 0x222233;

pub const SKY_COLOUR_DAY: u32 = 0x87ceeb;
pub const SKY_COLOUR_NIGHT: u32 = 0x001122;

/// Photometric scales mapping unitless [0,1] intensities onto Bevy light units.
pub const SUN_ILLUMINANCE_LUX: f32 = 10_000.0;
pub const AMBIENT_BRIGHTNESS_SCALE: f32 = 500.0;
pub const NIGHT_LIGHT_LUMENS_SCALE: f32 = 200_000.0;

/// Environment map brightness in cd/m² per unit of ambient intensity.
pub const ENVIRONMENT_LIGHT_SCALE: f32 = 1_000.0;

/// Layout of a single auxiliary night light.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NightLightLayout {
    pub position: [f32; 3],
    pub colour: u32,
    pub intensity: f32,
    pub range: f32,
}

pub const NIGHT_LIGHTS: [NightLightLayout; 3] = [
    NightLightLayout {
        position: [0.0, 2.0, 0.0],
        colour: 0xaaaaff,
        intensity: 0.7,
        range: 8.0,
    },
    NightLightLayout {
        position: [2.0, 2.0, 2.0],
        colour: 0xffffff,
        intensity: 0.5,
        range: 6.0,
    },
    NightLightLayout {
        position: [-2.0, 2.0, -2.0],
        colour: 0xffffff,
        intensity: 0.5,
        range: 6.0,
    },
];
