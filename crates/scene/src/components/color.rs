/// Straight (non-premultiplied) RGBA8 color.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Rgba8(pub [u8; 4]);

impl Rgba8 {
    pub const WHITE: Self = Self([255, 255, 255, 255]);
    pub const BLACK: Self = Self([0, 0, 0, 255]);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self([r, g, b, 255])
    }

    /// Parse `#rrggbb` or `#rrggbbaa`.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.strip_prefix('#')?;
        if !matches!(digits.len(), 6 | 8) || !digits.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok();
        let alpha = if digits.len() == 8 { channel(6)? } else { 255 };
        Some(Self([channel(0)?, channel(2)?, channel(4)?, alpha]))
    }

    pub fn with_alpha(self, alpha: f32) -> Self {
        let [r, g, b, _] = self.0;
        Self([r, g, b, (alpha.clamp(0.0, 1.0) * 255.0).round() as u8])
    }
}

#[cfg(test)]
mod tests {
    use super::Rgba8;

    #[test]
    fn parses_hex_colors() {
        assert_eq!(Rgba8::from_hex("#3a4453"), Some(Rgba8::rgb(0x3a, 0x44, 0x53)));
        assert_eq!(
            Rgba8::from_hex("#ffffff80"),
            Some(Rgba8([255, 255, 255, 0x80]))
        );
    }

    #[test]
    fn rejects_malformed_hex() {
        assert_eq!(Rgba8::from_hex("3a4453"), None);
        assert_eq!(Rgba8::from_hex("#3a445"), None);
        assert_eq!(Rgba8::from_hex("#zz4453"), None);
    }

    #[test]
    fn with_alpha_scales_to_byte() {
        assert_eq!(Rgba8::WHITE.with_alpha(0.94).0[3], 240);
    }
}
