use super::{Ecef, Geodetic, geodetic_to_ecef};

/// Local East-North-Up offset (meters).
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Enu {
    pub east: f64,
    pub north: f64,
    pub up: f64,
}

impl Enu {
    pub fn new(east: f64, north: f64, up: f64) -> Self {
        Self { east, north, up }
    }

    /// Unit-scaled view direction for a heading (clockwise from north) and pitch
    /// (negative looking down), multiplied by `range_m`.
    pub fn along_view(heading_rad: f64, pitch_rad: f64, range_m: f64) -> Self {
        let (sin_h, cos_h) = heading_rad.sin_cos();
        let (sin_p, cos_p) = pitch_rad.sin_cos();
        Self::new(
            range_m * cos_p * sin_h,
            range_m * cos_p * cos_h,
            range_m * sin_p,
        )
    }

    pub fn scaled(self, factor: f64) -> Self {
        Self::new(self.east * factor, self.north * factor, self.up * factor)
    }

    pub fn length(&self) -> f64 {
        (self.east * self.east + self.north * self.north + self.up * self.up).sqrt()
    }
}

/// Tangent frame anchored at a geodetic origin.
///
/// Rotation terms are computed once so per-frame conversions stay cheap.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct LocalFrame {
    origin: Ecef,
    sin_lat: f64,
    cos_lat: f64,
    sin_lon: f64,
    cos_lon: f64,
}

impl LocalFrame {
    pub fn at(origin: Geodetic) -> Self {
        let (sin_lat, cos_lat) = origin.lat_rad.sin_cos();
        let (sin_lon, cos_lon) = origin.lon_rad.sin_cos();
        Self {
            origin: geodetic_to_ecef(origin),
            sin_lat,
            cos_lat,
            sin_lon,
            cos_lon,
        }
    }

    pub fn origin(&self) -> Ecef {
        self.origin
    }

    pub fn to_enu(&self, point: Ecef) -> Enu {
        let dx = point.x - self.origin.x;
        let dy = point.y - self.origin.y;
        let dz = point.z - self.origin.z;
        Enu::new(
            -self.sin_lon * dx + self.cos_lon * dy,
            -self.sin_lat * self.cos_lon * dx - self.sin_lat * self.sin_lon * dy
                + self.cos_lat * dz,
            self.cos_lat * self.cos_lon * dx
                + self.cos_lat * self.sin_lon * dy
                + self.sin_lat * dz,
        )
    }

    pub fn to_ecef(&self, enu: Enu) -> Ecef {
        let dx = -self.sin_lon * enu.east - self.sin_lat * self.cos_lon * enu.north
            + self.cos_lat * self.cos_lon * enu.up;
        let dy = self.cos_lon * enu.east - self.sin_lat * self.sin_lon * enu.north
            + self.cos_lat * self.sin_lon * enu.up;
        let dz = self.cos_lat * enu.north + self.sin_lat * enu.up;
        Ecef::new(self.origin.x + dx, self.origin.y + dy, self.origin.z + dz)
    }
}

#[cfg(test)]
mod tests {
    use super::{Enu, LocalFrame};
    use crate::math::Geodetic;

    fn assert_close(a: f64, b: f64, eps: f64) {
        let diff = (a - b).abs();
        assert!(diff <= eps, "expected {a} ~= {b} (diff {diff})");
    }

    #[test]
    fn origin_maps_to_zero() {
        let frame = LocalFrame::at(Geodetic::from_degrees(39.2, -6.4, 35.0));
        let enu = frame.to_enu(frame.origin());
        assert_close(enu.length(), 0.0, 1e-9);
    }

    #[test]
    fn offsets_survive_a_trip_through_ecef() {
        let frame = LocalFrame::at(Geodetic::from_degrees(139.7, 35.7, 0.0));
        let enu = Enu::new(1_500.0, -820.0, 240.0);
        let back = frame.to_enu(frame.to_ecef(enu));
        assert_close(back.east, enu.east, 1e-6);
        assert_close(back.north, enu.north, 1e-6);
        assert_close(back.up, enu.up, 1e-6);
    }

    #[test]
    fn up_points_away_from_the_surface() {
        let origin = Geodetic::from_degrees(-74.0, 40.7, 0.0);
        let frame = LocalFrame::at(origin);
        let raised = frame.to_ecef(Enu::new(0.0, 0.0, 1_000.0));
        let expected = origin.with_alt(1_000.0).to_ecef();
        assert_close(raised.distance(expected), 0.0, 1e-3);
    }

    #[test]
    fn view_direction_follows_heading() {
        let north = Enu::along_view(0.0, 0.0, 10.0);
        assert_close(north.north, 10.0, 1e-12);
        assert_close(north.east, 0.0, 1e-12);

        let down = Enu::along_view(1.3, -std::f64::consts::FRAC_PI_2, 5.0);
        assert_close(down.up, -5.0, 1e-12);
        assert_close(down.length(), 5.0, 1e-12);
    }
}
