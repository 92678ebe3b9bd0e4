//! Canvas Sketches - procedural canvas animations
//!
//! Core modules:
//! - `sim`: Simulation state and per-frame stepping (bricks, vine, dot grid)
//! - `renderer`: Drawing surface abstraction, tessellation and WebGPU pipeline
//! - `engine`: Host-facing lifecycle hooks (start, resize, pointer, dispose)
//! - `settings`: Data-driven tuning for each sketch
//! - `color`: Theme color tokens and parsing

pub mod color;
pub mod engine;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use color::{Palette, Rgba};
pub use engine::{Engine, Host, SketchKind};
pub use settings::{QualityPreset, Settings};

/// Engine-wide constants
pub mod consts {
    /// Surface size used when the host cannot report one at start
    pub const FALLBACK_SURFACE_SIZE: (u32, u32) = (400, 400);

    /// Theme token names read from the host every frame
    pub const TOKEN_ACCENT: &str = "accent";
    pub const TOKEN_BACKGROUND: &str = "background";
    pub const TOKEN_TEXT: &str = "text";
}

/// Normalized angle to [-π, π)
#[inline]
pub fn normalize_angle(mut angle: f32) -> f32 {
    use std::f32::consts::PI;
    if !angle.is_finite() {
        return 0.0;
    }
    while angle >= PI {
        angle -= 2.0 * PI;
    }
    while angle < -PI {
        angle += 2.0 * PI;
    }
    angle
}

/// Interpolate from one heading toward another along the shortest arc
#[inline]
pub fn lerp_angle(from: f32, to: f32, t: f32) -> f32 {
    let delta = normalize_angle(to - from);
    from + delta * t
}

/// Linear remap of `value` from `[in_min, in_max]` to `[out_min, out_max]`
///
/// A zero-width input range maps everything to `out_max`.
#[inline]
pub fn map_range(value: f32, in_min: f32, in_max: f32, out_min: f32, out_max: f32) -> f32 {
    let span = in_max - in_min;
    if span.abs() < f32::EPSILON {
        return out_max;
    }
    out_min + (value - in_min) / span * (out_max - out_min)
}

/// Substitute `fallback` for NaN or infinite values
#[inline]
pub fn finite_or(value: f32, fallback: f32) -> f32 {
    if value.is_finite() { value } else { fallback }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    #[test]
    fn test_normalize_angle() {
        assert!((normalize_angle(3.0 * PI + 0.1) - (-PI + 0.1)).abs() < 0.001);
        assert!((normalize_angle(-5.0 * PI / 2.0) + PI / 2.0).abs() < 0.001);
        assert!((normalize_angle(-PI / 2.0) + PI / 2.0).abs() < 0.001);
        assert_eq!(normalize_angle(f32::NAN), 0.0);
    }

    #[test]
    fn test_normalize_angle_at_branch_cut() {
        // Odd multiples of π may land on either side of the cut in f32
        for angle in [PI, -PI, 3.0 * PI, -3.0 * PI] {
            let out = normalize_angle(angle);
            assert!((-PI..=PI).contains(&out), "{} -> {}", angle, out);
            assert!((out.cos() - angle.cos()).abs() < 0.001);
            assert!((out.sin() - angle.sin()).abs() < 0.001);
        }
    }

    #[test]
    fn test_lerp_angle_takes_short_way() {
        // Heading just past -π, target π: should barely move, not swing through 0
        let from = -PI + 0.1;
        let out = lerp_angle(from, PI, 0.5);
        assert!((normalize_angle(out) - (-PI + 0.05)).abs() < 0.001);
    }

    #[test]
    fn test_map_range() {
        assert_eq!(map_range(0.0, 0.0, 10.0, 1.0, 0.0), 1.0);
        assert_eq!(map_range(5.0, 0.0, 10.0, 1.0, 0.0), 0.5);
        assert_eq!(map_range(3.0, 2.0, 2.0, 1.0, 0.0), 0.0);
    }

    #[test]
    fn test_finite_or() {
        assert_eq!(finite_or(f32::INFINITY, 1.0), 1.0);
        assert_eq!(finite_or(0.25, 1.0), 0.25);
    }
}
