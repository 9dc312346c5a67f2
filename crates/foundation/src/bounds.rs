use crate::math::{Geodetic, surface_distance_km};

/// Geographic bounding box in degrees, `[lon, lat]` corners.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct LonLatBounds {
    pub min: [f64; 2],
    pub max: [f64; 2],
}

impl LonLatBounds {
    pub fn new(min: [f64; 2], max: [f64; 2]) -> Self {
        LonLatBounds { min, max }
    }

    pub fn from_point(lon: f64, lat: f64) -> Self {
        LonLatBounds::new([lon, lat], [lon, lat])
    }

    /// Bounds of all `(lon, lat)` pairs, or `None` when empty.
    pub fn from_points(points: impl IntoIterator<Item = (f64, f64)>) -> Option<Self> {
        let mut iter = points.into_iter();
        let (lon, lat) = iter.next()?;
        let mut bounds = Self::from_point(lon, lat);
        for (lon, lat) in iter {
            bounds.include(lon, lat);
        }
        Some(bounds)
    }

    pub fn include(&mut self, lon: f64, lat: f64) {
        self.min[0] = self.min[0].min(lon);
        self.min[1] = self.min[1].min(lat);
        self.max[0] = self.max[0].max(lon);
        self.max[1] = self.max[1].max(lat);
    }

    /// Surface distance between the south-west and north-east corners.
    pub fn diagonal_km(&self) -> f64 {
        surface_distance_km(
            Geodetic::from_degrees(self.min[0], self.min[1], 0.0),
            Geodetic::from_degrees(self.max[0], self.max[1], 0.0),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::LonLatBounds;

    #[test]
    fn from_points_tracks_extremes() {
        let bounds =
            LonLatBounds::from_points([(-74.0, 40.7), (39.5, -6.4), (139.7, 35.7)]).unwrap();
        assert_eq!(bounds.min, [-74.0, -6.4]);
        assert_eq!(bounds.max, [139.7, 40.7]);
    }

    #[test]
    fn empty_input_has_no_bounds() {
        assert_eq!(LonLatBounds::from_points(std::iter::empty()), None);
    }

    #[test]
    fn single_point_has_zero_diagonal() {
        let bounds = LonLatBounds::from_point(12.0, 41.9);
        assert_eq!(bounds.diagonal_km(), 0.0);
    }
}
