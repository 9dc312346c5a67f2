//! Path-following camera rig.

use foundation::LonLatBounds;
use foundation::math::{Ecef, ecef_to_geodetic, initial_bearing_rad};
use scene::HeadingPitchRange;
use trip::Stop;

use crate::profile::CameraProfile;

/// Geodesic diagonal of the stops' lon/lat bounding box.
pub fn route_span_km(stops: &[Stop]) -> f64 {
    LonLatBounds::from_points(stops.iter().map(|s| (s.lon, s.lat)))
        .map(|b| b.diagonal_km())
        .unwrap_or(0.0)
}

/// Bearing between two positions, `None` when they coincide.
pub fn heading_between(from: Ecef, to: Ecef) -> Option<f64> {
    initial_bearing_rad(ecef_to_geodetic(from), ecef_to_geodetic(to))
}

/// Heading from the first path point towards a point a few indices ahead.
pub fn initial_heading(full: &[Ecef], profile: &CameraProfile) -> f64 {
    let Some(first) = full.first() else {
        return 0.0;
    };
    let ahead = full[profile.initial_heading_index.min(full.len() - 1)];
    heading_between(*first, ahead).unwrap_or(0.0)
}

/// Blend factor for `dt_s` given a per-frame factor tuned at `fps`.
pub fn smoothing_alpha(per_frame: f64, dt_s: f64, fps: f64) -> f64 {
    if !dt_s.is_finite() || dt_s <= 0.0 {
        return 0.0;
    }
    let per_frame = per_frame.clamp(0.0, 1.0);
    1.0 - (1.0 - per_frame).powf(dt_s * fps)
}

/// Smoothed camera focus and range.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CameraRig {
    pub heading_rad: f64,
    pub pitch_rad: f64,
    pub focus: Ecef,
    pub range_m: f64,
    pub range_target_m: f64,
}

impl CameraRig {
    pub fn new(focus: Ecef, heading_rad: f64, pitch_rad: f64, range_m: f64) -> Self {
        Self {
            heading_rad,
            pitch_rad,
            focus,
            range_m,
            range_target_m: range_m,
        }
    }

    pub fn offset(&self) -> HeadingPitchRange {
        HeadingPitchRange::new(self.heading_rad, self.pitch_rad, self.range_m)
    }

    /// Ease the focus towards `look_ahead` and the range towards its target.
    pub fn follow(&mut self, look_ahead: Ecef, dt_s: f64, profile: &CameraProfile) {
        let focus_alpha = smoothing_alpha(profile.focus_smoothing, dt_s, profile.reference_fps);
        let range_alpha = smoothing_alpha(profile.range_smoothing, dt_s, profile.reference_fps);
        self.focus = self.focus.lerp(look_ahead, focus_alpha);
        self.range_m += (self.range_target_m - self.range_m) * range_alpha;
    }
}
