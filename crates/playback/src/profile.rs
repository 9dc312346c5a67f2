//! Playback and scene configuration.
//!
//! Every struct deserializes with defaults for missing fields, so a config
//! file only needs to name what it changes.

use scene::Basemap;
use scene::components::Rgba8;
use serde::{Deserialize, Serialize};
use trip::RouteProfile;

use crate::ease::Ease;

/// How long each leg's drive lasts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LegTiming {
    /// `clamp(max(base + sqrt(max(km, 1)) * per_sqrt_km, points / points_per_s), min, max)`.
    Adaptive {
        base_s: f64,
        per_sqrt_km_s: f64,
        points_per_s: f64,
        min_s: f64,
        max_s: f64,
    },
    Fixed {
        seconds: f64,
    },
}

impl Default for LegTiming {
    fn default() -> Self {
        LegTiming::Adaptive {
            base_s: 1.2,
            per_sqrt_km_s: 0.28,
            points_per_s: 140.0,
            min_s: 3.2,
            max_s: 8.6,
        }
    }
}

impl LegTiming {
    /// Drive duration for a leg of `km` spanning `index_span` path indices.
    pub fn duration_s(&self, km: f64, index_span: usize) -> f64 {
        match *self {
            LegTiming::Adaptive {
                base_s,
                per_sqrt_km_s,
                points_per_s,
                min_s,
                max_s,
            } => {
                let km = if km.is_finite() { km.max(1.0) } else { 1.0 };
                let by_distance = base_s + km.sqrt() * per_sqrt_km_s;
                let by_points = index_span.max(1) as f64 / points_per_s.max(f64::EPSILON);
                by_distance.max(by_points).clamp(min_s, max_s.max(min_s))
            }
            LegTiming::Fixed { seconds } => seconds.max(0.0),
        }
    }
}

/// Distance to camera range mapping: `km * m_per_km` clamped, or the
/// fallback when that product is zero or not finite.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct RangeModel {
    pub m_per_km: f64,
    pub fallback_m: f64,
    pub min_m: f64,
    pub max_m: f64,
}

impl RangeModel {
    pub fn range_for(&self, km: f64) -> f64 {
        let raw = km * self.m_per_km;
        let raw = if raw.is_finite() && raw != 0.0 {
            raw
        } else {
            self.fallback_m
        };
        raw.clamp(self.min_m, self.max_m.max(self.min_m))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraProfile {
    pub pitch_deg: f64,
    /// Path indices between the vehicle and the camera focus target.
    pub look_ahead: f64,
    /// Path indices ahead used for the vehicle heading.
    pub heading_look_ahead: f64,
    /// Per-frame blend factors at `reference_fps`.
    pub focus_smoothing: f64,
    pub range_smoothing: f64,
    pub reference_fps: f64,
    pub span_range: RangeModel,
    pub leg_range: RangeModel,
    /// Initial eye height as a multiple of the span range.
    pub initial_range_factor: f64,
    /// Path index the initial heading points at.
    pub initial_heading_index: usize,
}

impl Default for CameraProfile {
    fn default() -> Self {
        Self {
            pitch_deg: -47.0,
            look_ahead: 8.0,
            heading_look_ahead: 1.0,
            focus_smoothing: 0.16,
            range_smoothing: 0.08,
            reference_fps: 60.0,
            span_range: RangeModel {
                m_per_km: 620.0,
                fallback_m: 300_000.0,
                min_m: 170_000.0,
                max_m: 4_800_000.0,
            },
            leg_range: RangeModel {
                m_per_km: 520.0,
                fallback_m: 240_000.0,
                min_m: 140_000.0,
                max_m: 2_400_000.0,
            },
            initial_range_factor: 1.02,
            initial_heading_index: 4,
        }
    }
}

impl CameraProfile {
    pub fn pitch_rad(&self) -> f64 {
        self.pitch_deg.to_radians()
    }
}

/// Pre-playback pass that flies the camera along the route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WarmUpProfile {
    pub enabled: bool,
    pub points_per_sample: usize,
    pub min_samples: usize,
    pub max_samples: usize,
    pub frames_per_sample: usize,
    pub final_frames: usize,
    pub settle_frames: usize,
    pub frame_delay_ms: u64,
}

impl Default for WarmUpProfile {
    fn default() -> Self {
        Self {
            enabled: true,
            points_per_sample: 18,
            min_samples: 16,
            max_samples: 72,
            frames_per_sample: 2,
            final_frames: 3,
            settle_frames: 2,
            frame_delay_ms: 16,
        }
    }
}

impl WarmUpProfile {
    /// `clamp(ceil(path_len / points_per_sample), min, max)`.
    pub fn sample_count(&self, path_len: usize) -> usize {
        path_len
            .div_ceil(self.points_per_sample.max(1))
            .clamp(self.min_samples, self.max_samples.max(self.min_samples))
    }

    /// Evenly spaced path indices covering both ends.
    pub fn sample_indices(&self, path_len: usize) -> Vec<usize> {
        let count = self.sample_count(path_len);
        let last = path_len.saturating_sub(1);
        (0..count)
            .map(|i| i * last / (count - 1).max(1))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackProfile {
    pub timing: LegTiming,
    pub ease: Ease,
    /// Fraction of a leg after which its destination is revealed.
    pub reveal_threshold: f64,
    pub leg_pause_s: f64,
    pub camera: CameraProfile,
    pub warm_up: WarmUpProfile,
}

impl Default for PlaybackProfile {
    fn default() -> Self {
        Self::globe()
    }
}

impl PlaybackProfile {
    /// Adaptive leg timing with linear progress.
    pub fn globe() -> Self {
        Self {
            timing: LegTiming::default(),
            ease: Ease::Linear,
            reveal_threshold: 0.85,
            leg_pause_s: 0.3,
            camera: CameraProfile::default(),
            warm_up: WarmUpProfile::default(),
        }
    }

    /// Fixed-length legs eased in and out.
    pub fn flat_map() -> Self {
        Self {
            timing: LegTiming::Fixed { seconds: 3.35 },
            ease: Ease::InOutQuad,
            warm_up: WarmUpProfile {
                enabled: false,
                ..WarmUpProfile::default()
            },
            ..Self::globe()
        }
    }
}

/// Colors are `#rrggbb` strings so config files stay readable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleProfile {
    pub trail_color: String,
    pub trail_width_px: f32,
    pub trail_glow: f32,
    pub text_color: String,
    pub label_font: String,
    pub distance_label_offset_px: f64,
    pub stop_label_offset_px: f64,
    pub marker_size_px: f32,
    pub vehicle_size_px: f32,
}

impl Default for StyleProfile {
    fn default() -> Self {
        Self {
            trail_color: "#3a4453".to_string(),
            trail_width_px: 5.0,
            trail_glow: 0.12,
            text_color: "#1a1a1a".to_string(),
            label_font: "700 20px Manrope, sans-serif".to_string(),
            distance_label_offset_px: -30.0,
            stop_label_offset_px: -28.0,
            marker_size_px: 10.0,
            vehicle_size_px: 46.0,
        }
    }
}

impl StyleProfile {
    pub fn trail_rgba(&self) -> Rgba8 {
        Rgba8::from_hex(&self.trail_color).unwrap_or(Rgba8::rgb(0x3a, 0x44, 0x53))
    }

    pub fn text_rgba(&self) -> Rgba8 {
        Rgba8::from_hex(&self.text_color).unwrap_or(Rgba8::rgb(0x1a, 0x1a, 0x1a))
    }
}

/// Everything [`crate::TripScene::create`] needs besides stops and modes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneOptions {
    pub basemap: Basemap,
    pub route: RouteProfile,
    pub playback: PlaybackProfile,
    pub style: StyleProfile,
}

impl SceneOptions {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn flat_map() -> Self {
        Self {
            playback: PlaybackProfile::flat_map(),
            ..Self::default()
        }
    }
}
