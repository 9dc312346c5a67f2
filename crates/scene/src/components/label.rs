use foundation::math::Vec2;

use super::Rgba8;

#[derive(Debug, Clone, PartialEq)]
pub struct LabelStyle {
    pub font: String,
    pub fill: Rgba8,
    pub outline: Rgba8,
    pub outline_width_px: f32,
    /// Screen-space offset from the anchor; negative y is up.
    pub pixel_offset: Vec2,
}

impl Default for LabelStyle {
    fn default() -> Self {
        Self {
            font: "700 20px sans-serif".to_string(),
            fill: Rgba8::BLACK,
            outline: Rgba8::WHITE,
            outline_width_px: 3.0,
            pixel_offset: Vec2::new(0.0, 0.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    pub text: String,
    pub style: LabelStyle,
}

impl Label {
    pub fn new(text: impl Into<String>, style: LabelStyle) -> Self {
        Self {
            text: text.into(),
            style,
        }
    }
}
