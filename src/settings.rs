//! Sketch settings and tuning
//!
//! Every constant the simulations use lives here so a page can retune a
//! sketch without a rebuild. Persisted as JSON in LocalStorage on the web.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Settings could not be decoded
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("malformed settings JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Quality preset levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum QualityPreset {
    Low,
    #[default]
    Medium,
    High,
}

impl QualityPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityPreset::Low => "Low",
            QualityPreset::Medium => "Medium",
            QualityPreset::High => "High",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "low" => Some(QualityPreset::Low),
            "medium" | "med" => Some(QualityPreset::Medium),
            "high" => Some(QualityPreset::High),
            _ => None,
        }
    }

    /// Maximum live crumble particles for this preset
    pub fn max_particles(&self) -> usize {
        match self {
            QualityPreset::Low => 300,
            QualityPreset::Medium => 1500,
            QualityPreset::High => 6000,
        }
    }
}

/// Falling brick tuning (distances in pixels, times in frames)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrickTuning {
    pub width: f32,
    pub height: f32,
    /// Spawn one brick every N frames
    pub spawn_every: u32,
    pub initial_speed_min: f32,
    pub initial_speed_max: f32,
    /// Velocity gained per frame while falling
    pub gravity: f32,
    pub max_speed: f32,
    /// Gap between the floor line and the bottom of the surface
    pub floor_margin: f32,
    /// Fixed floor line, overriding `height - floor_margin`
    pub landing_height: Option<f32>,
    /// A landed brick this close to the top starts the dissolve
    pub top_threshold: f32,
    /// Bricks this far below the floor line are discarded
    pub cleanup_margin: f32,
    pub dissolve_frames: u32,
    /// One particle per this many square pixels of brick
    pub particle_area: f32,
    pub particle_size_min: f32,
    pub particle_size_max: f32,
    pub particle_life_min: f32,
    pub particle_life_max: f32,
    pub particle_gravity: f32,
    /// Opacity lost per frame on the 0-255 scale
    pub particle_fade: f32,
}

impl Default for BrickTuning {
    fn default() -> Self {
        Self {
            width: 60.0,
            height: 30.0,
            spawn_every: 120,
            initial_speed_min: 0.5,
            initial_speed_max: 1.0,
            gravity: 0.02,
            max_speed: 2.0,
            floor_margin: 5.0,
            landing_height: None,
            top_threshold: 50.0,
            cleanup_margin: 100.0,
            dissolve_frames: 120,
            particle_area: 25.0,
            particle_size_min: 2.0,
            particle_size_max: 6.0,
            particle_life_min: 30.0,
            particle_life_max: 60.0,
            particle_gravity: 0.05,
            particle_fade: 5.0,
        }
    }
}

/// Growing vine tuning (distances in pixels, angles in radians, times in frames)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VineTuning {
    pub base_speed: f32,
    /// Growth speed while the pointer is over the canvas
    pub hover_speed: f32,
    /// Pixels advanced per unit of speed
    pub step_scale: f32,
    /// Max random heading change per frame
    pub angle_variance: f32,
    pub boundary_margin: f32,
    /// Fraction of the way the heading turns inward near an edge
    pub edge_bias: f32,
    /// Segment count that triggers the dissolve
    pub max_segments: usize,
    pub dissolve_frames: u32,
    pub leaf_every: u32,
    /// Leaves attach this many segments behind the tip
    pub leaf_anchor_lag: usize,
    pub leaf_born_falling_chance: f32,
    /// Per-frame chance that a random leaf lets go
    pub leaf_detach_chance: f32,
    pub leaf_detach_min_leaves: usize,
    pub thorn_every: u32,
    pub thorn_anchor_lag: usize,
    pub thorn_anchor_jitter: usize,
    /// Pointer press shakes loose leaves within this radius
    pub press_radius: f32,
    pub press_max_detach: usize,
    /// Fallen leaves are dropped this far below the bottom edge
    pub offscreen_margin: f32,
}

impl Default for VineTuning {
    fn default() -> Self {
        Self {
            base_speed: 0.2,
            hover_speed: 0.8,
            step_scale: 5.0,
            angle_variance: std::f32::consts::PI / 18.0,
            boundary_margin: 30.0,
            edge_bias: 0.3,
            max_segments: 1500,
            dissolve_frames: 60,
            leaf_every: 35,
            leaf_anchor_lag: 20,
            leaf_born_falling_chance: 0.1,
            leaf_detach_chance: 1.0 / 200.0,
            leaf_detach_min_leaves: 5,
            thorn_every: 30,
            thorn_anchor_lag: 20,
            thorn_anchor_jitter: 10,
            press_radius: 50.0,
            press_max_detach: 3,
            offscreen_margin: 50.0,
        }
    }
}

/// Connecting dots tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GridTuning {
    pub rows: usize,
    pub cols: usize,
    /// Margin as a fraction of the smaller surface side
    pub margin_ratio: f32,
    /// Connect radius is the smaller side divided by this
    pub connect_divisor: f32,
    /// Dot size is the smaller side divided by this
    pub dot_divisor: f32,
    pub active_scale: f32,
    /// Trace lines fade out over this many milliseconds
    pub fade_ms: f64,
}

impl Default for GridTuning {
    fn default() -> Self {
        Self {
            rows: 8,
            cols: 12,
            margin_ratio: 0.1,
            connect_divisor: 3.5,
            dot_divisor: 80.0,
            active_scale: 1.5,
            fade_ms: 10_000.0,
        }
    }
}

/// Sketch settings/preferences
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Graphics quality preset
    pub quality: QualityPreset,
    /// Reduced motion (bricks fade without crumbling into particles)
    pub reduced_motion: bool,
    pub bricks: BrickTuning,
    pub vine: VineTuning,
    pub grid: GridTuning,
}

impl Settings {
    /// Create settings from a quality preset
    pub fn from_preset(preset: QualityPreset) -> Self {
        Self {
            quality: preset,
            ..Self::default()
        }
    }

    /// Decode settings; missing fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, SettingsError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Effective particle cap (zero when reduced motion is on)
    pub fn max_particles(&self) -> usize {
        if self.reduced_motion {
            0
        } else {
            self.quality.max_particles()
        }
    }

    /// LocalStorage key
    #[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
    const STORAGE_KEY: &'static str = "canvas_sketches_settings";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match Self::from_json(&json) {
                    Ok(settings) => {
                        log::info!("Loaded settings from LocalStorage");
                        return settings;
                    }
                    Err(e) => log::warn!("Ignoring stored settings: {}", e),
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Native stub
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let settings =
            Settings::from_json(r#"{"quality":"High","vine":{"max_segments":200}}"#).unwrap();
        assert_eq!(settings.quality, QualityPreset::High);
        assert_eq!(settings.vine.max_segments, 200);
        assert_eq!(settings.vine.leaf_every, 35);
        assert_eq!(settings.bricks.spawn_every, 120);
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        assert!(matches!(
            Settings::from_json("{not json"),
            Err(SettingsError::Json(_))
        ));
    }

    #[test]
    fn test_json_roundtrip() {
        let mut settings = Settings::from_preset(QualityPreset::Low);
        settings.bricks.landing_height = Some(300.0);
        let json = settings.to_json().unwrap();
        let back = Settings::from_json(&json).unwrap();
        assert_eq!(back.quality, QualityPreset::Low);
        assert_eq!(back.bricks.landing_height, Some(300.0));
    }

    #[test]
    fn test_reduced_motion_disables_particles() {
        let mut settings = Settings::default();
        assert_eq!(settings.max_particles(), 1500);
        settings.reduced_motion = true;
        assert_eq!(settings.max_particles(), 0);
    }

    #[test]
    fn test_quality_parse() {
        assert_eq!(QualityPreset::parse("MED"), Some(QualityPreset::Medium));
        assert_eq!(QualityPreset::parse("ultra"), None);
        assert_eq!(QualityPreset::High.as_str(), "High");
    }
}
