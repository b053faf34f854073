//! Transfer function: raw density samples to vertex height and color.
//!
//! Colors are normalized against the maximum of the slice being drawn, recomputed
//! for every frame. The colormap therefore autoscales like a live oscilloscope
//! trace instead of using a fixed global range.

use glam::{Vec3, Vec4};
use serde::{Deserialize, Serialize};

use crate::colormap::Colormap;
use crate::options::ParameterRanges;

/// Floor for the per-slice maximum, avoiding division by zero on empty slices.
pub const MAX_EPSILON: f32 = 1e-6;

/// Smallest gamma accepted after sanitization.
pub const MIN_GAMMA: f32 = 0.01;

/// Height mapping mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum HeightMode {
    /// Height proportional to density.
    #[default]
    Physical,
    /// Logarithmic height that keeps low-amplitude structure visible.
    Enhanced,
}

impl HeightMode {
    /// Display name.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            HeightMode::Physical => "Physical",
            HeightMode::Enhanced => "Enhanced (log)",
        }
    }
}

/// User-adjustable transfer-function parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TransferParams {
    /// Samples below this value are drawn as zero.
    pub threshold: f32,
    /// Exponent applied to the normalized color coordinate.
    pub gamma: f32,
    /// Linear height scale; in enhanced mode it also sets the log boost.
    pub height_scale: f32,
    /// Height mapping mode.
    pub mode: HeightMode,
    /// Opacity of the ghost overlay.
    pub ghost_opacity: f32,
    /// Color ramp for main slices.
    pub colormap: Colormap,
}

impl Default for TransferParams {
    fn default() -> Self {
        Self {
            threshold: 0.0,
            gamma: 0.6,
            height_scale: 10.0,
            mode: HeightMode::Physical,
            ghost_opacity: 0.35,
            colormap: Colormap::Hot,
        }
    }
}

/// Applies the threshold: values below it (and non-finite values) become zero.
#[must_use]
pub fn apply_threshold(value: f32, threshold: f32) -> f32 {
    if value.is_finite() && value >= threshold {
        value
    } else {
        0.0
    }
}

/// Maximum thresholded value of a slice, floored at [`MAX_EPSILON`].
#[must_use]
pub fn slice_max(values: &[f32], threshold: f32) -> f32 {
    values
        .iter()
        .map(|&v| apply_threshold(v, threshold))
        .fold(MAX_EPSILON, f32::max)
}

/// Log-mode height multiplier derived from the height scale.
#[must_use]
pub fn enhanced_boost(height_scale: f32) -> f32 {
    (height_scale * 0.08).max(0.001)
}

impl TransferParams {
    /// Clamps every parameter into the configured ranges.
    ///
    /// The ranges come from user configuration, so the hard bounds are applied
    /// afterwards: threshold and height scale are never negative and gamma
    /// never drops below [`MIN_GAMMA`].
    #[must_use]
    pub fn sanitized(mut self, ranges: &ParameterRanges) -> Self {
        self.threshold = ranges.threshold.clamp(self.threshold).max(0.0);
        self.gamma = ranges.gamma.clamp(self.gamma).max(MIN_GAMMA);
        self.height_scale = ranges.height_scale.clamp(self.height_scale).max(0.0);
        let opacity = self.ghost_opacity;
        self.ghost_opacity = if opacity.is_nan() { 0.0 } else { opacity.clamp(0.0, 1.0) };
        self
    }

    /// Height of a raw sample given the slice maximum.
    #[must_use]
    pub fn height(&self, value: f32, slice_max: f32) -> f32 {
        let v = apply_threshold(value, self.threshold);
        match self.mode {
            HeightMode::Physical => v * self.height_scale,
            HeightMode::Enhanced => {
                let t = if self.threshold > 0.0 {
                    v / self.threshold
                } else {
                    v / (slice_max + MAX_EPSILON)
                };
                (1.0 + t).log10() * enhanced_boost(self.height_scale)
            }
        }
    }

    /// Normalized color coordinate of a raw sample: `(v / max) ^ gamma`.
    #[must_use]
    pub fn color_coordinate(&self, value: f32, slice_max: f32) -> f32 {
        let v = apply_threshold(value, self.threshold);
        let t_raw = (v / slice_max.max(MAX_EPSILON)).clamp(0.0, 1.0);
        t_raw.powf(self.gamma)
    }

    /// RGB color of a raw sample on a main slice.
    #[must_use]
    pub fn color(&self, value: f32, slice_max: f32) -> Vec3 {
        self.colormap
            .sample(self.color_coordinate(value, slice_max))
    }

    /// Evaluates a whole slice into per-sample `(height, rgba)` pairs.
    ///
    /// Main slices use the color ramp at full opacity; ghost slices use
    /// `ghost_color` at `ghost_opacity`.
    pub fn evaluate_slice<'a>(
        &'a self,
        values: &'a [f32],
        ghost_color: Option<Vec3>,
    ) -> impl Iterator<Item = (f32, Vec4)> + 'a {
        let max = slice_max(values, self.threshold);
        values.iter().map(move |&value| {
            let height = self.height(value, max);
            let color = match ghost_color {
                Some(c) => c.extend(self.ghost_opacity),
                None => self.color(value, max).extend(1.0),
            };
            (height, color)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::ParamRange;
    use proptest::prelude::*;

    fn physical(threshold: f32, height_scale: f32) -> TransferParams {
        TransferParams {
            threshold,
            height_scale,
            mode: HeightMode::Physical,
            ..TransferParams::default()
        }
    }

    #[test]
    fn test_threshold_zeroes_below() {
        assert_eq!(apply_threshold(0.2, 0.5), 0.0);
        assert_eq!(apply_threshold(0.5, 0.5), 0.5);
        assert_eq!(apply_threshold(f32::NAN, 0.0), 0.0);
        assert_eq!(apply_threshold(f32::INFINITY, 0.0), 0.0);
    }

    #[test]
    fn test_slice_max_floor() {
        assert_eq!(slice_max(&[0.0, 0.0], 0.0), MAX_EPSILON);
        assert_eq!(slice_max(&[], 0.0), MAX_EPSILON);
        assert_eq!(slice_max(&[0.1, 0.7, 0.3], 0.0), 0.7);
        // Thresholded values do not count.
        assert_eq!(slice_max(&[0.1, 0.2], 0.5), MAX_EPSILON);
    }

    #[test]
    fn test_physical_height() {
        let p = physical(0.0, 10.0);
        assert_eq!(p.height(1.0, 1.0), 10.0);
        assert_eq!(p.height(0.25, 1.0), 2.5);
        let p = physical(0.5, 10.0);
        assert_eq!(p.height(0.4, 1.0), 0.0);
    }

    #[test]
    fn test_enhanced_height_with_threshold() {
        let p = TransferParams {
            threshold: 0.5,
            height_scale: 10.0,
            mode: HeightMode::Enhanced,
            ..TransferParams::default()
        };
        let expected = 3.0f32.log10() * enhanced_boost(10.0);
        assert!((p.height(1.0, 1.0) - expected).abs() < 1e-6);
        assert_eq!(p.height(0.1, 1.0), 0.0);
    }

    #[test]
    fn test_enhanced_height_without_threshold_uses_slice_max() {
        let p = TransferParams {
            threshold: 0.0,
            height_scale: 10.0,
            mode: HeightMode::Enhanced,
            ..TransferParams::default()
        };
        let h = p.height(2.0, 2.0);
        let expected = (1.0 + 2.0 / (2.0 + MAX_EPSILON)).log10() * 0.8;
        assert!((h - expected).abs() < 1e-6);
    }

    #[test]
    fn test_enhanced_boost_floor() {
        assert_eq!(enhanced_boost(0.0), 0.001);
        assert!((enhanced_boost(10.0) - 0.8).abs() < 1e-6);
    }

    fn loose_ranges() -> ParameterRanges {
        ParameterRanges {
            gamma: ParamRange::new(-2.0, 3.0),
            threshold: ParamRange::new(-1.0, 1.0),
            height_scale: ParamRange::new(-40.0, 40.0),
            ..ParameterRanges::default()
        }
    }

    #[test]
    fn test_sanitized_threshold_is_never_negative() {
        let p = TransferParams {
            threshold: -1.0,
            mode: HeightMode::Enhanced,
            ..TransferParams::default()
        }
        .sanitized(&loose_ranges());
        assert_eq!(p.threshold, 0.0);
        let heights: Vec<f32> = p.evaluate_slice(&[-0.5, -0.2, 0.3], None).map(|(h, _)| h).collect();
        assert!(heights.iter().all(|h| h.is_finite()), "{heights:?}");
        assert_eq!(heights[0], 0.0);
    }

    #[test]
    fn test_sanitized_gamma_stays_positive() {
        let p = TransferParams {
            gamma: -1.5,
            ..TransferParams::default()
        }
        .sanitized(&loose_ranges());
        assert_eq!(p.gamma, MIN_GAMMA);
        // Zero samples stay at the bottom of the ramp instead of 0^-1.5 = inf.
        assert_eq!(p.color(0.0, 1.0), Vec3::ZERO);
    }

    #[test]
    fn test_sanitized_height_scale_is_never_negative() {
        let p = TransferParams {
            height_scale: -20.0,
            ..TransferParams::default()
        }
        .sanitized(&loose_ranges());
        assert_eq!(p.height_scale, 0.0);
        assert_eq!(p.height(1.0, 1.0), 0.0);
    }

    #[test]
    fn test_sanitized_ghost_opacity() {
        let p = TransferParams {
            ghost_opacity: f32::NAN,
            ..TransferParams::default()
        }
        .sanitized(&ParameterRanges::default());
        assert_eq!(p.ghost_opacity, 0.0);
    }

    #[test]
    fn test_color_normalizes_per_slice() {
        let p = TransferParams {
            gamma: 1.0,
            ..TransferParams::default()
        };
        assert_eq!(p.color(2.0, 2.0), Vec3::ONE);
        assert_eq!(p.color(0.0, 2.0), Vec3::ZERO);
        let mid = p.color_coordinate(1.0, 2.0);
        assert!((mid - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_gamma_brightens_low_values() {
        let p = TransferParams {
            gamma: 0.5,
            ..TransferParams::default()
        };
        let t = p.color_coordinate(0.25, 1.0);
        assert!((t - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_evaluate_slice_ghost_color() {
        let p = TransferParams {
            ghost_opacity: 0.4,
            ..TransferParams::default()
        };
        let accent = Vec3::new(0.2, 0.8, 1.0);
        let out: Vec<_> = p.evaluate_slice(&[0.0, 1.0], Some(accent)).collect();
        assert_eq!(out.len(), 2);
        for (_, c) in &out {
            assert_eq!(*c, accent.extend(0.4));
        }
        assert_eq!(out[1].0, 10.0);
    }

    #[test]
    fn test_sanitized_clamps() {
        let ranges = ParameterRanges::default();
        let p = TransferParams {
            threshold: -1.0,
            gamma: 0.0,
            height_scale: 1e6,
            ghost_opacity: 3.0,
            ..TransferParams::default()
        }
        .sanitized(&ranges);
        assert_eq!(p.threshold, ranges.threshold.min);
        assert_eq!(p.gamma, ranges.gamma.min);
        assert_eq!(p.height_scale, ranges.height_scale.max);
        assert_eq!(p.ghost_opacity, 1.0);
    }

    proptest! {
        #[test]
        fn prop_threshold_monotonic(
            values in proptest::collection::vec(0.0f32..1.0, 1..200),
            lo in 0.0f32..1.0,
            delta in 0.0f32..1.0,
        ) {
            let hi = lo + delta;
            let count = |threshold: f32| {
                let p = physical(threshold, 10.0);
                let max = slice_max(&values, threshold);
                values.iter().filter(|&&v| p.height(v, max) != 0.0).count()
            };
            prop_assert!(count(hi) <= count(lo));
        }

        #[test]
        fn prop_heights_are_finite(
            values in proptest::collection::vec(
                prop_oneof![-1.0e3f32..1.0e3, Just(f32::NAN), Just(f32::INFINITY)],
                1..64,
            ),
            threshold in prop_oneof![Just(0.0f32), 0.01f32..1.0],
            enhanced in proptest::bool::ANY,
        ) {
            let p = TransferParams {
                threshold,
                mode: if enhanced { HeightMode::Enhanced } else { HeightMode::Physical },
                ..TransferParams::default()
            };
            for (h, c) in p.evaluate_slice(&values, None) {
                prop_assert!(h.is_finite());
                prop_assert!(c.is_finite());
            }
        }
    }
}
