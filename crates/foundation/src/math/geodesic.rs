//! Geodesics on the WGS84 ellipsoid.
//!
//! Distance and fractional interpolation use Vincenty's inverse and direct
//! formulae. Nearly antipodal pairs, where the inverse iteration does not
//! converge, fall back to a great circle on the mean-radius sphere so callers
//! always get a usable (and deterministic) answer.

use core::f64::consts::PI;

use super::{Geodetic, WGS84_A, WGS84_B, WGS84_F};

/// IUGG mean Earth radius (meters).
pub const MEAN_RADIUS_M: f64 = 6_371_008.8;

const MAX_ITERATIONS: usize = 200;
const CONVERGENCE: f64 = 1e-12;
const COINCIDENT_RAD: f64 = 1e-12;

#[derive(Debug, Copy, Clone, PartialEq)]
enum Solution {
    Ellipsoid { azimuth_rad: f64 },
    Sphere,
}

/// Shortest surface path between two points, heights ignored.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct EllipsoidGeodesic {
    start: Geodetic,
    end: Geodetic,
    distance_m: f64,
    solution: Solution,
}

impl EllipsoidGeodesic {
    pub fn new(start: Geodetic, end: Geodetic) -> Self {
        let start = start.with_alt(0.0);
        let end = end.with_alt(0.0);

        match vincenty_inverse(start, end) {
            Some((distance_m, azimuth_rad)) => Self {
                start,
                end,
                distance_m,
                solution: Solution::Ellipsoid { azimuth_rad },
            },
            None => Self {
                start,
                end,
                distance_m: haversine_m(start, end),
                solution: Solution::Sphere,
            },
        }
    }

    pub fn start(&self) -> Geodetic {
        self.start
    }

    pub fn end(&self) -> Geodetic {
        self.end
    }

    pub fn surface_distance_m(&self) -> f64 {
        self.distance_m
    }

    pub fn surface_distance_km(&self) -> f64 {
        self.distance_m / 1000.0
    }

    /// Point at `fraction` of the way along the geodesic, at zero height.
    ///
    /// Fractions outside `[0, 1]` are clamped; the endpoints are returned
    /// exactly so callers can rely on them when stitching paths.
    pub fn interpolate_using_fraction(&self, fraction: f64) -> Geodetic {
        if fraction <= 0.0 || self.distance_m == 0.0 {
            return self.start;
        }
        if fraction >= 1.0 {
            return self.end;
        }

        match self.solution {
            Solution::Ellipsoid { azimuth_rad } => {
                vincenty_direct(self.start, azimuth_rad, self.distance_m * fraction)
            }
            Solution::Sphere => slerp(self.start, self.end, fraction),
        }
    }
}

/// Surface distance in kilometers between two points.
pub fn surface_distance_km(a: Geodetic, b: Geodetic) -> f64 {
    EllipsoidGeodesic::new(a, b).surface_distance_km()
}

/// Initial great-circle bearing from `from` to `to`, clockwise from north.
///
/// Returns `None` for coincident points, where no direction is defined.
pub fn initial_bearing_rad(from: Geodetic, to: Geodetic) -> Option<f64> {
    let d_lon = to.lon_rad - from.lon_rad;
    if (to.lat_rad - from.lat_rad).abs() < COINCIDENT_RAD && d_lon.abs() < COINCIDENT_RAD {
        return None;
    }

    let y = d_lon.sin() * to.lat_rad.cos();
    let x = from.lat_rad.cos() * to.lat_rad.sin()
        - from.lat_rad.sin() * to.lat_rad.cos() * d_lon.cos();
    let bearing = y.atan2(x);
    bearing.is_finite().then_some(bearing)
}

fn normalize_lon(lon: f64) -> f64 {
    let mut lon = (lon + PI) % (2.0 * PI);
    if lon < 0.0 {
        lon += 2.0 * PI;
    }
    lon - PI
}

fn reduced_latitude(lat: f64) -> f64 {
    ((1.0 - WGS84_F) * lat.tan()).atan()
}

fn series_coefficients(cos2_alpha: f64) -> (f64, f64) {
    let u2 = cos2_alpha * (WGS84_A * WGS84_A - WGS84_B * WGS84_B) / (WGS84_B * WGS84_B);
    let a = 1.0 + u2 / 16384.0 * (4096.0 + u2 * (-768.0 + u2 * (320.0 - 175.0 * u2)));
    let b = u2 / 1024.0 * (256.0 + u2 * (-128.0 + u2 * (74.0 - 47.0 * u2)));
    (a, b)
}

fn delta_sigma(b: f64, sin_sigma: f64, cos_sigma: f64, cos_2sm: f64) -> f64 {
    b * sin_sigma
        * (cos_2sm
            + b / 4.0
                * (cos_sigma * (-1.0 + 2.0 * cos_2sm * cos_2sm)
                    - b / 6.0
                        * cos_2sm
                        * (-3.0 + 4.0 * sin_sigma * sin_sigma)
                        * (-3.0 + 4.0 * cos_2sm * cos_2sm)))
}

/// Returns `(distance_m, initial_azimuth_rad)`, or `None` if the iteration diverges.
fn vincenty_inverse(start: Geodetic, end: Geodetic) -> Option<(f64, f64)> {
    let l = normalize_lon(end.lon_rad - start.lon_rad);
    let u1 = reduced_latitude(start.lat_rad);
    let u2 = reduced_latitude(end.lat_rad);
    let (sin_u1, cos_u1) = u1.sin_cos();
    let (sin_u2, cos_u2) = u2.sin_cos();

    let mut lambda = l;
    let mut converged = false;
    let (mut sin_sigma, mut cos_sigma, mut sigma) = (0.0, 0.0, 0.0);
    let (mut cos2_alpha, mut cos_2sm) = (0.0, 0.0);
    let (mut sin_lambda, mut cos_lambda) = (0.0, 0.0);

    for _ in 0..MAX_ITERATIONS {
        (sin_lambda, cos_lambda) = lambda.sin_cos();
        let cross = cos_u1 * sin_u2 - sin_u1 * cos_u2 * cos_lambda;
        sin_sigma = ((cos_u2 * sin_lambda).powi(2) + cross * cross).sqrt();
        if sin_sigma == 0.0 {
            return Some((0.0, 0.0));
        }
        cos_sigma = sin_u1 * sin_u2 + cos_u1 * cos_u2 * cos_lambda;
        sigma = sin_sigma.atan2(cos_sigma);

        let sin_alpha = cos_u1 * cos_u2 * sin_lambda / sin_sigma;
        cos2_alpha = 1.0 - sin_alpha * sin_alpha;
        cos_2sm = if cos2_alpha != 0.0 {
            cos_sigma - 2.0 * sin_u1 * sin_u2 / cos2_alpha
        } else {
            // Equatorial line.
            0.0
        };

        let c = WGS84_F / 16.0 * cos2_alpha * (4.0 + WGS84_F * (4.0 - 3.0 * cos2_alpha));
        let previous = lambda;
        lambda = l
            + (1.0 - c)
                * WGS84_F
                * sin_alpha
                * (sigma + c * sin_sigma * (cos_2sm + c * cos_sigma * (-1.0 + 2.0 * cos_2sm * cos_2sm)));

        if lambda.abs() > PI {
            return None;
        }
        if (lambda - previous).abs() < CONVERGENCE {
            converged = true;
            break;
        }
    }

    if !converged {
        return None;
    }

    let (a, b) = series_coefficients(cos2_alpha);
    let distance = WGS84_B * a * (sigma - delta_sigma(b, sin_sigma, cos_sigma, cos_2sm));
    let azimuth =
        (cos_u2 * sin_lambda).atan2(cos_u1 * sin_u2 - sin_u1 * cos_u2 * cos_lambda);
    Some((distance, azimuth))
}

fn vincenty_direct(start: Geodetic, azimuth_rad: f64, distance_m: f64) -> Geodetic {
    let u1 = reduced_latitude(start.lat_rad);
    let (sin_u1, cos_u1) = u1.sin_cos();
    let (sin_a1, cos_a1) = azimuth_rad.sin_cos();

    let sigma1 = u1.tan().atan2(cos_a1);
    let sin_alpha = cos_u1 * sin_a1;
    let cos2_alpha = 1.0 - sin_alpha * sin_alpha;
    let (a, b) = series_coefficients(cos2_alpha);

    let sigma0 = distance_m / (WGS84_B * a);
    let mut sigma = sigma0;
    for _ in 0..MAX_ITERATIONS {
        let cos_2sm = (2.0 * sigma1 + sigma).cos();
        let (sin_sigma, cos_sigma) = sigma.sin_cos();
        let previous = sigma;
        sigma = sigma0 + delta_sigma(b, sin_sigma, cos_sigma, cos_2sm);
        if (sigma - previous).abs() < CONVERGENCE {
            break;
        }
    }

    let cos_2sm = (2.0 * sigma1 + sigma).cos();
    let (sin_sigma, cos_sigma) = sigma.sin_cos();
    let tmp = sin_u1 * sin_sigma - cos_u1 * cos_sigma * cos_a1;
    let lat = (sin_u1 * cos_sigma + cos_u1 * sin_sigma * cos_a1)
        .atan2((1.0 - WGS84_F) * (sin_alpha * sin_alpha + tmp * tmp).sqrt());
    let lambda = (sin_sigma * sin_a1).atan2(cos_u1 * cos_sigma - sin_u1 * sin_sigma * cos_a1);
    let c = WGS84_F / 16.0 * cos2_alpha * (4.0 + WGS84_F * (4.0 - 3.0 * cos2_alpha));
    let l = lambda
        - (1.0 - c)
            * WGS84_F
            * sin_alpha
            * (sigma + c * sin_sigma * (cos_2sm + c * cos_sigma * (-1.0 + 2.0 * cos_2sm * cos_2sm)));

    Geodetic::new(lat, normalize_lon(start.lon_rad + l), 0.0)
}

fn haversine_m(a: Geodetic, b: Geodetic) -> f64 {
    let d_lat = b.lat_rad - a.lat_rad;
    let d_lon = b.lon_rad - a.lon_rad;
    let h = (d_lat / 2.0).sin().powi(2)
        + a.lat_rad.cos() * b.lat_rad.cos() * (d_lon / 2.0).sin().powi(2);
    2.0 * MEAN_RADIUS_M * h.sqrt().min(1.0).asin()
}

fn unit_vector(geo: Geodetic) -> [f64; 3] {
    let (sin_lat, cos_lat) = geo.lat_rad.sin_cos();
    let (sin_lon, cos_lon) = geo.lon_rad.sin_cos();
    [cos_lat * cos_lon, cos_lat * sin_lon, sin_lat]
}

fn slerp(a: Geodetic, b: Geodetic, fraction: f64) -> Geodetic {
    let va = unit_vector(a);
    let vb = unit_vector(b);
    let dot = (va[0] * vb[0] + va[1] * vb[1] + va[2] * vb[2]).clamp(-1.0, 1.0);
    let omega = dot.acos();
    let sin_omega = omega.sin();

    let p = if sin_omega.abs() < 1e-9 {
        // Antipodal: every meridian through `a` is a shortest path; head north.
        let (sin_lat, cos_lat) = a.lat_rad.sin_cos();
        let (sin_lon, cos_lon) = a.lon_rad.sin_cos();
        let north = [-sin_lat * cos_lon, -sin_lat * sin_lon, cos_lat];
        let (s, c) = (omega * fraction).sin_cos();
        [
            c * va[0] + s * north[0],
            c * va[1] + s * north[1],
            c * va[2] + s * north[2],
        ]
    } else {
        let wa = ((1.0 - fraction) * omega).sin() / sin_omega;
        let wb = (fraction * omega).sin() / sin_omega;
        [
            wa * va[0] + wb * vb[0],
            wa * va[1] + wb * vb[1],
            wa * va[2] + wb * vb[2],
        ]
    };

    let lat = p[2].clamp(-1.0, 1.0).asin();
    let lon = p[1].atan2(p[0]);
    Geodetic::new(lat, lon, 0.0)
}

#[cfg(test)]
mod tests {
    use super::{EllipsoidGeodesic, initial_bearing_rad, surface_distance_km};
    use crate::math::{Geodetic, WGS84_A};
    use core::f64::consts::{FRAC_PI_2, PI};

    fn assert_close(a: f64, b: f64, eps: f64) {
        let diff = (a - b).abs();
        assert!(diff <= eps, "expected {a} ~= {b} (diff {diff})");
    }

    #[test]
    fn quarter_equator_distance() {
        let a = Geodetic::from_degrees(0.0, 0.0, 0.0);
        let b = Geodetic::from_degrees(90.0, 0.0, 0.0);
        let geodesic = EllipsoidGeodesic::new(a, b);
        assert_close(geodesic.surface_distance_m(), WGS84_A * FRAC_PI_2, 1e-3);
    }

    #[test]
    fn new_york_to_zanzibar_coast() {
        let nyc = Geodetic::from_degrees(-74.006, 40.7128, 0.0);
        let kizimkazi = Geodetic::from_degrees(39.512, -6.452, 0.0);
        assert_close(surface_distance_km(nyc, kizimkazi), 12_453.9, 1.0);
        // Symmetric.
        assert_close(
            surface_distance_km(kizimkazi, nyc),
            surface_distance_km(nyc, kizimkazi),
            1e-6,
        );
    }

    #[test]
    fn heights_do_not_affect_distance() {
        let a = Geodetic::from_degrees(10.0, 10.0, 50_000.0);
        let b = Geodetic::from_degrees(12.0, 11.0, 0.0);
        let flat = EllipsoidGeodesic::new(a.with_alt(0.0), b);
        let lifted = EllipsoidGeodesic::new(a, b);
        assert_eq!(flat.surface_distance_m(), lifted.surface_distance_m());
    }

    #[test]
    fn interpolation_endpoints_are_exact() {
        let a = Geodetic::from_degrees(-74.006, 40.7128, 0.0);
        let b = Geodetic::from_degrees(139.6917, 35.6895, 0.0);
        let geodesic = EllipsoidGeodesic::new(a, b);
        assert_eq!(geodesic.interpolate_using_fraction(0.0), a);
        assert_eq!(geodesic.interpolate_using_fraction(1.0), b);
        assert_eq!(geodesic.interpolate_using_fraction(-3.0), a);
        assert_eq!(geodesic.interpolate_using_fraction(7.0), b);
    }

    #[test]
    fn interpolation_splits_distance() {
        let a = Geodetic::from_degrees(2.35, 48.85, 0.0);
        let b = Geodetic::from_degrees(-0.12, 51.5, 0.0);
        let geodesic = EllipsoidGeodesic::new(a, b);
        let mid = geodesic.interpolate_using_fraction(0.5);
        let first = EllipsoidGeodesic::new(a, mid).surface_distance_m();
        let second = EllipsoidGeodesic::new(mid, b).surface_distance_m();
        assert_close(first, second, 1e-2);
        assert_close(first + second, geodesic.surface_distance_m(), 1e-2);
    }

    #[test]
    fn equator_midpoint_stays_on_equator() {
        let a = Geodetic::from_degrees(0.0, 0.0, 0.0);
        let b = Geodetic::from_degrees(60.0, 0.0, 0.0);
        let mid = EllipsoidGeodesic::new(a, b).interpolate_using_fraction(0.5);
        assert_close(mid.lat_deg(), 0.0, 1e-9);
        assert_close(mid.lon_deg(), 30.0, 1e-9);
    }

    #[test]
    fn antipodal_points_fall_back_to_sphere() {
        let a = Geodetic::from_degrees(0.0, 0.0, 0.0);
        let b = Geodetic::from_degrees(180.0, 0.0, 0.0);
        let geodesic = EllipsoidGeodesic::new(a, b);
        assert!(geodesic.surface_distance_m() > 19_000_000.0);
        for i in 0..=10 {
            let p = geodesic.interpolate_using_fraction(i as f64 / 10.0);
            assert!(p.lat_rad.is_finite() && p.lon_rad.is_finite());
        }
    }

    #[test]
    fn coincident_points_have_zero_distance() {
        let a = Geodetic::from_degrees(39.512, -6.452, 0.0);
        let geodesic = EllipsoidGeodesic::new(a, a);
        assert_eq!(geodesic.surface_distance_m(), 0.0);
        assert_eq!(geodesic.interpolate_using_fraction(0.5), a);
    }

    #[test]
    fn bearing_cardinal_directions() {
        let origin = Geodetic::from_degrees(0.0, 0.0, 0.0);
        let east = Geodetic::from_degrees(1.0, 0.0, 0.0);
        let north = Geodetic::from_degrees(0.0, 1.0, 0.0);
        let west = Geodetic::from_degrees(-1.0, 0.0, 0.0);
        assert_close(initial_bearing_rad(origin, east).unwrap(), FRAC_PI_2, 1e-12);
        assert_close(initial_bearing_rad(origin, north).unwrap(), 0.0, 1e-12);
        assert_close(initial_bearing_rad(origin, west).unwrap(), -FRAC_PI_2, 1e-12);
        let south = Geodetic::from_degrees(0.0, -1.0, 0.0);
        assert_close(initial_bearing_rad(origin, south).unwrap().abs(), PI, 1e-12);
    }

    #[test]
    fn bearing_is_undefined_for_coincident_points() {
        let p = Geodetic::from_degrees(139.6917, 35.6895, 0.0);
        assert_eq!(initial_bearing_rad(p, p.with_alt(9_000.0)), None);
    }
}
