/// Screen-aligned image anchored at a geographic position.
#[derive(Debug, Clone, PartialEq)]
pub struct Billboard {
    /// Image URI (`data:` URIs included).
    pub image: String,
    pub width_px: f32,
    pub height_px: f32,
    /// Screen-space rotation, counter-clockwise.
    pub rotation_rad: f64,
}

impl Billboard {
    pub fn new(image: impl Into<String>, width_px: f32, height_px: f32) -> Self {
        Self {
            image: image.into(),
            width_px,
            height_px,
            rotation_rad: 0.0,
        }
    }
}
