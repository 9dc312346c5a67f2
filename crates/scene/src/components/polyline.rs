use foundation::math::Ecef;

use super::Rgba8;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PolylineStyle {
    pub width_px: f32,
    pub color: Rgba8,
    /// Glow falloff; `0.0` draws a flat line.
    pub glow_power: f32,
}

impl Default for PolylineStyle {
    fn default() -> Self {
        Self {
            width_px: 2.0,
            color: Rgba8::WHITE,
            glow_power: 0.0,
        }
    }
}

/// Line strip whose positions can be replaced every frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Polyline {
    pub positions: Vec<Ecef>,
    pub style: PolylineStyle,
}

impl Polyline {
    pub fn new(positions: Vec<Ecef>, style: PolylineStyle) -> Self {
        Self { positions, style }
    }
}
