//! Color maps for slice coloring.

use glam::Vec3;
use serde::{Deserialize, Serialize};

const VIRIDIS: [[f32; 3]; 11] = [
    [0.267, 0.004, 0.329],
    [0.282, 0.140, 0.457],
    [0.253, 0.265, 0.529],
    [0.206, 0.371, 0.553],
    [0.163, 0.471, 0.558],
    [0.127, 0.566, 0.550],
    [0.134, 0.658, 0.517],
    [0.266, 0.749, 0.440],
    [0.477, 0.821, 0.318],
    [0.741, 0.873, 0.150],
    [0.993, 0.906, 0.144],
];

const COOLWARM: [[f32; 3]; 5] = [
    [0.230, 0.299, 0.754],
    [0.552, 0.690, 0.996],
    [0.866, 0.866, 0.866],
    [0.956, 0.604, 0.486],
    [0.706, 0.016, 0.150],
];

/// Three-channel "hot" ramp: black, red, yellow, white.
///
/// Each channel is clamped to `[0, 1]`, so out-of-range inputs (including
/// infinities) saturate at the ends of the ramp. NaN maps to black.
#[must_use]
pub fn hot_color(t: f32) -> Vec3 {
    let t = if t.is_nan() { 0.0 } else { t };
    Vec3::new(
        (3.0 * t).clamp(0.0, 1.0),
        (3.0 * t - 1.0).clamp(0.0, 1.0),
        (3.0 * t - 2.0).clamp(0.0, 1.0),
    )
}

/// Samples a table of evenly spaced colors at `t` in `[0, 1]`.
fn sample_table(colors: &[[f32; 3]], t: f32) -> Vec3 {
    let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };

    if colors.is_empty() {
        return Vec3::ZERO;
    }
    if colors.len() == 1 {
        return Vec3::from(colors[0]);
    }

    let n = colors.len() - 1;
    let idx = ((t * n as f32).floor() as usize).min(n - 1);
    let frac = t * n as f32 - idx as f32;

    Vec3::from(colors[idx]).lerp(Vec3::from(colors[idx + 1]), frac)
}

/// Available color ramps for main slices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Colormap {
    /// Black to white through red and yellow.
    #[default]
    Hot,
    Viridis,
    Coolwarm,
}

impl Colormap {
    /// All color maps, in UI order.
    pub const ALL: [Colormap; 3] = [Colormap::Hot, Colormap::Viridis, Colormap::Coolwarm];

    /// Samples the map at `t` (clamped to `[0, 1]`).
    #[must_use]
    pub fn sample(self, t: f32) -> Vec3 {
        match self {
            Colormap::Hot => hot_color(t),
            Colormap::Viridis => sample_table(&VIRIDIS, t),
            Colormap::Coolwarm => sample_table(&COOLWARM, t),
        }
    }

    /// Display name.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Colormap::Hot => "hot",
            Colormap::Viridis => "viridis",
            Colormap::Coolwarm => "coolwarm",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_hot_endpoints() {
        assert_eq!(hot_color(0.0), Vec3::ZERO);
        assert_eq!(hot_color(1.0), Vec3::ONE);
    }

    #[test]
    fn test_hot_midpoints() {
        assert!(hot_color(1.0 / 3.0).abs_diff_eq(Vec3::new(1.0, 0.0, 0.0), 1e-5));
        let c = hot_color(0.5);
        assert_eq!(c.x, 1.0);
        assert!((c.y - 0.5).abs() < 1e-6);
        assert_eq!(c.z, 0.0);
    }

    #[test]
    fn test_hot_nan_is_black() {
        assert_eq!(hot_color(f32::NAN), Vec3::ZERO);
    }

    #[test]
    fn test_hot_infinities_saturate() {
        assert_eq!(hot_color(f32::INFINITY), Vec3::ONE);
        assert_eq!(hot_color(f32::NEG_INFINITY), Vec3::ZERO);
        assert_eq!(Colormap::Viridis.sample(f32::INFINITY), Vec3::from(VIRIDIS[10]));
    }

    #[test]
    fn test_table_endpoints() {
        assert_eq!(Colormap::Viridis.sample(0.0), Vec3::from(VIRIDIS[0]));
        assert_eq!(Colormap::Viridis.sample(1.0), Vec3::from(VIRIDIS[10]));
        assert_eq!(Colormap::Coolwarm.sample(2.0), Vec3::from(COOLWARM[4]));
    }

    proptest! {
        #[test]
        fn prop_all_channels_in_unit_range(t in -10.0f32..10.0) {
            for map in Colormap::ALL {
                let c = map.sample(t);
                for ch in [c.x, c.y, c.z] {
                    prop_assert!((0.0..=1.0).contains(&ch));
                }
            }
        }
    }
}
