use bevy::prelude::*;
use constants::lighting::{
    AMBIENT_COLOUR_DAY, AMBIENT_COLOUR_NIGHT, AMBIENT_INTENSITY_DAY, AMBIENT_INTENSITY_NIGHT,
    DAYLIGHT_HOURS, HOURS_PER_DAY, NIGHT_END_HOUR, NIGHT_START_HOUR, SKY_COLOUR_DAY,
    SKY_COLOUR_NIGHT, SUN_COLOUR_DAWN_DUSK, SUN_COLOUR_DAY, SUN_DEPTH_OFFSET, SUN_MIN_ELEVATION,
    SUN_ORBIT_RADIUS, SUN_WARM_PHASE_HIGH, SUN_WARM_PHASE_LOW, SUNRISE_HOUR,
};
use std::f32::consts::PI;

/// Directional light parameters derived from the time of day.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SunParams {
    pub position: Vec3,
    /// Packed 0xRRGGBB.
    pub colour: u32,
    /// Unitless, in [0, 1].
    pub intensity: f32,
}

/// Ambient light parameters derived from the day/night flag.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmbientParams {
    pub colour: u32,
    pub intensity: f32,
}

/// Sun position, colour and intensity for an hour in [0, 24).
///
/// The half-day phase `t` runs from 0 at sunrise (06:00) to 1 at sunset
/// (18:00). Outside that window the sun still has a position but no intensity.
pub fn sun_params(time_of_day: f32) -> SunParams {
    let t = (time_of_day - SUNRISE_HOUR) / DAYLIGHT_HOURS;
    let angle = PI * t;

    let position = Vec3::new(
        angle.cos() * SUN_ORBIT_RADIUS,
        angle.sin().max(SUN_MIN_ELEVATION) * SUN_ORBIT_RADIUS,
        SUN_DEPTH_OFFSET,
    );

    let colour = if t < SUN_WARM_PHASE_LOW || t > SUN_WARM_PHASE_HIGH {
        SUN_COLOUR_DAWN_DUSK
    } else {
        SUN_COLOUR_DAY
    };

    let intensity = if !(0.0..=1.0).contains(&t) {
        0.0
    } else {
        angle.sin().max(0.0)
    };

    SunParams {
        position,
        colour,
        intensity,
    }
}

pub fn ambient_params(is_night: bool) -> AmbientParams {
    if is_night {
        AmbientParams {
            colour: AMBIENT_COLOUR_NIGHT,
            intensity: AMBIENT_INTENSITY_NIGHT,
        }
    } else {
        AmbientParams {
            colour: AMBIENT_COLOUR_DAY,
            intensity: AMBIENT_INTENSITY_DAY,
        }
    }
}

/// Flat background used while no environment panorama is shown.
pub fn sky_colour(is_night: bool) -> u32 {
    if is_night {
        SKY_COLOUR_NIGHT
    } else {
        SKY_COLOUR_DAY
    }
}

/// True from 20:00 (inclusive) until 06:00 (exclusive).
pub fn is_night(time_of_day: f32) -> bool {
    time_of_day >= NIGHT_START_HOUR || time_of_day < NIGHT_END_HOUR
}

/// The auxiliary night lights exist only when it is night and they are enabled.
pub fn night_lights_active(is_night: bool, night_lights_enabled: bool) -> bool {
    is_night && night_lights_enabled
}

/// Wrap a finite hour into [0, 24). Non-finite input has no meaningful hour.
pub fn normalise_time_of_day(time_of_day: f32) -> Option<f32> {
    if !time_of_day.is_finite() {
        return None;
    }
    let wrapped = time_of_day.rem_euclid(HOURS_PER_DAY);
    // rem_euclid can round up to the modulus for tiny negative inputs.
    Some(if wrapped >= HOURS_PER_DAY { 0.0 } else { wrapped })
}

/// Convert packed 0xRRGGBB into an sRGB colour.
pub fn hex_colour(hex: u32) -> Color {
    Color::srgb_u8(
        ((hex >> 16) & 0xff) as u8,
        ((hex >> 8) & 0xff) as u8,
        (hex & 0xff) as u8,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-5;

    #[test]
    fn intensity_is_zero_outside_daylight_window() {
        let mut hour = 0.0;
        while hour < 24.0 {
            if !(6.0..18.0).contains(&hour) {
                assert_eq!(sun_params(hour).intensity, 0.0, "hour {hour}");
            }
            hour += 0.25;
        }
    }

    #[test]
    fn intensity_is_non_negative_and_continuous_during_daylight() {
        let step = 0.01;
        let mut hour = 6.0;
        let mut previous = sun_params(hour).intensity;
        while hour < 18.0 {
            hour += step;
            let current = sun_params(hour).intensity;
            assert!(current >= 0.0);
            assert!((current - previous).abs() < 0.01, "jump at hour {hour}");
            previous = current;
        }
    }

    #[test]
    fn intensity_is_zero_at_sunrise_and_sunset() {
        assert!(sun_params(6.0).intensity.abs() < EPS);
        assert!(sun_params(18.0).intensity.abs() < EPS);
    }

    #[test]
    fn noon_is_peak_with_neutral_colour() {
        let sun = sun_params(12.0);
        assert!((sun.intensity - 1.0).abs() < EPS);
        assert_eq!(sun.colour, SUN_COLOUR_DAY);
        assert!((sun.position.y - 10.0).abs() < EPS);
        assert!(sun.position.x.abs() < EPS);
        assert_eq!(sun.position.z, 7.5);

        let ambient = ambient_params(is_night(12.0));
        assert_eq!(ambient.intensity, 0.4);
        assert_eq!(ambient.colour, 0xffffff);
        assert!(!night_lights_active(is_night(12.0), true));
    }

    #[test]
    fn late_evening_is_dark() {
        let sun = sun_params(22.0);
        assert_eq!(sun.intensity, 0.0);
        assert!(is_night(22.0));
        assert_eq!(ambient_params(true).intensity, 0.15);
        assert!(night_lights_active(is_night(22.0), true));
    }

    #[test]
    fn dawn_and_dusk_are_amber() {
        assert_eq!(sun_params(7.0).colour, SUN_COLOUR_DAWN_DUSK);
        assert_eq!(sun_params(17.5).colour, SUN_COLOUR_DAWN_DUSK);
        assert_eq!(sun_params(9.0).colour, SUN_COLOUR_DAY);
    }

    #[test]
    fn sun_never_drops_to_the_horizon() {
        for hour in [0.0, 3.0, 6.0, 18.0, 21.0, 23.9] {
            assert!(sun_params(hour).position.y >= 0.5 - EPS, "hour {hour}");
        }
    }

    #[test]
    fn night_window_boundaries() {
        assert!(is_night(0.0));
        assert!(is_night(5.99));
        assert!(!is_night(6.0));
        assert!(!is_night(19.99));
        assert!(is_night(20.0));
        assert!(is_night(23.5));
    }

    #[test]
    fn night_lights_truth_table() {
        assert!(night_lights_active(true, true));
        assert!(!night_lights_active(true, false));
        assert!(!night_lights_active(false, true));
        assert!(!night_lights_active(false, false));
    }

    #[test]
    fn time_of_day_wraps_and_rejects_non_finite() {
        assert_eq!(normalise_time_of_day(12.0), Some(12.0));
        assert_eq!(normalise_time_of_day(25.0), Some(1.0));
        assert_eq!(normalise_time_of_day(-1.0), Some(23.0));
        assert_eq!(normalise_time_of_day(24.0), Some(0.0));
        assert_eq!(normalise_time_of_day(f32::NAN), None);
        assert_eq!(normalise_time_of_day(f32::INFINITY), None);
    }

    #[test]
    fn sky_colour_follows_day_and_night() {
        assert_eq!(sky_colour(true), SKY_COLOUR_NIGHT);
        assert_eq!(sky_colour(false), SKY_COLOUR_DAY);
    }
}
