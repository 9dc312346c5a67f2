use serde::{Deserialize, Serialize};

/// Geometry constants for path building.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouteProfile {
    /// Height of arc endpoints and stop markers.
    pub base_height_m: f64,
    /// Height of road and sea legs.
    pub surface_height_m: f64,
    pub arc_m_per_km: f64,
    pub arc_min_m: f64,
    pub arc_max_m: f64,
    pub plane_steps: usize,
    pub ship_steps: usize,
    pub fallback_steps: usize,
}

impl Default for RouteProfile {
    fn default() -> Self {
        Self {
            base_height_m: 12_000.0,
            surface_height_m: 12_000.0,
            arc_m_per_km: 45.0,
            arc_min_m: 14_000.0,
            arc_max_m: 120_000.0,
            plane_steps: 160,
            ship_steps: 130,
            fallback_steps: 120,
        }
    }
}

impl RouteProfile {
    /// Peak height above the base for a leg of `km`.
    pub fn arc_amplitude_m(&self, km: f64) -> f64 {
        let km = if km.is_finite() { km.max(0.0) } else { 0.0 };
        (km * self.arc_m_per_km).clamp(self.arc_min_m, self.arc_max_m.max(self.arc_min_m))
    }

    /// Arc height at `fraction` of a leg: `base + amplitude * sin(pi * fraction)`.
    pub fn arc_height_m(&self, km: f64, fraction: f64) -> f64 {
        self.base_height_m + self.arc_amplitude_m(km) * (std::f64::consts::PI * fraction).sin()
    }
}
