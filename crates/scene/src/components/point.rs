use super::Rgba8;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PointStyle {
    pub pixel_size: f32,
    pub color: Rgba8,
    pub outline: Rgba8,
    pub outline_width_px: f32,
}

impl Default for PointStyle {
    fn default() -> Self {
        Self {
            pixel_size: 10.0,
            color: Rgba8::BLACK,
            outline: Rgba8::WHITE,
            outline_width_px: 2.0,
        }
    }
}
