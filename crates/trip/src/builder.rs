//! Per-leg path building.
//!
//! Flights follow a geodesic arc that rises with leg length, sea legs follow
//! the same geodesic at surface height, and ground legs use road geometry
//! from a [`RoadRouter`], falling back to a flight arc when the lookup fails.

use foundation::math::{EllipsoidGeodesic, Ecef, Geodetic, surface_distance_km};
use routing::{RoadRoute, RoadRouter, RouteError, RouteRequest};
use tracing::{debug, warn};

use crate::model::{Mode, PathSource, Segment, Stop, leg_mode};
use crate::profile::RouteProfile;

/// Geodesic surface distance between two stops.
pub fn geodesic_km(from: &Stop, to: &Stop) -> f64 {
    surface_distance_km(from.geodetic(0.0), to.geodetic(0.0))
}

fn geodesic(from: &Stop, to: &Stop) -> EllipsoidGeodesic {
    EllipsoidGeodesic::new(from.geodetic(0.0), to.geodetic(0.0))
}

/// `steps + 1` points along the geodesic, each at `height(fraction)`.
fn sample_geodesic(
    from: &Stop,
    to: &Stop,
    steps: usize,
    height: impl Fn(f64) -> f64,
) -> Vec<Ecef> {
    let steps = steps.max(1);
    let geodesic = geodesic(from, to);
    (0..=steps)
        .map(|i| {
            let fraction = i as f64 / steps as f64;
            geodesic
                .interpolate_using_fraction(fraction)
                .with_alt(height(fraction))
                .to_ecef()
        })
        .collect()
}

/// Flight arc: `base + amplitude(km) * sin(pi * t)` along the geodesic.
pub fn arc_points(from: &Stop, to: &Stop, steps: usize, profile: &RouteProfile) -> Vec<Ecef> {
    let km = geodesic_km(from, to);
    sample_geodesic(from, to, steps, |t| profile.arc_height_m(km, t))
}

/// Geodesic flattened to the surface height.
pub fn sea_points(from: &Stop, to: &Stop, steps: usize, profile: &RouteProfile) -> Vec<Ecef> {
    sample_geodesic(from, to, steps, |_| profile.surface_height_m)
}

/// Road geometry lifted to the surface height.
pub fn road_points(route: &RoadRoute, profile: &RouteProfile) -> Vec<Ecef> {
    route
        .coordinates
        .iter()
        .map(|[lon, lat]| Geodetic::from_degrees(*lon, *lat, profile.surface_height_m).to_ecef())
        .collect()
}

fn arc_segment(from: &Stop, to: &Stop, mode: Mode, steps: usize, profile: &RouteProfile) -> Segment {
    Segment {
        mode,
        points: arc_points(from, to, steps, profile),
        km: geodesic_km(from, to),
        source: PathSource::Arc,
    }
}

async fn road_segment<R: RoadRouter + ?Sized>(
    from: &Stop,
    to: &Stop,
    mode: Mode,
    profile: &RouteProfile,
    router: &R,
) -> Result<Segment, RouteError> {
    let request = RouteRequest::new(from.lon, from.lat, to.lon, to.lat);
    let route = router.route(request).await?;
    if route.coordinates.len() < 2 {
        return Err(RouteError::EmptyRoute);
    }
    Ok(Segment {
        mode,
        points: road_points(&route, profile),
        km: route.distance_km(),
        source: PathSource::Road,
    })
}

/// Build one leg. Never fails: road lookup errors degrade to a flight arc.
pub async fn build_segment<R: RoadRouter + ?Sized>(
    from: &Stop,
    to: &Stop,
    mode: Mode,
    profile: &RouteProfile,
    router: &R,
) -> Segment {
    let segment = match mode {
        Mode::Plane => arc_segment(from, to, mode, profile.plane_steps, profile),
        Mode::Ship => Segment {
            mode,
            points: sea_points(from, to, profile.ship_steps, profile),
            km: geodesic_km(from, to),
            source: PathSource::Sea,
        },
        Mode::Car | Mode::Train | Mode::Bike | Mode::Walk => {
            match road_segment(from, to, mode, profile, router).await {
                Ok(segment) => segment,
                Err(err) => {
                    warn!(
                        router = router.name(),
                        %mode,
                        from = %from.city,
                        to = %to.city,
                        error = %err,
                        "road lookup failed, flying an arc instead"
                    );
                    Segment {
                        source: PathSource::ArcFallback,
                        ..arc_segment(from, to, mode, profile.fallback_steps, profile)
                    }
                }
            }
        }
    };
    debug!(
        %mode,
        km = segment.km,
        points = segment.points.len(),
        source = ?segment.source,
        "built leg"
    );
    segment
}

/// Build every leg in order; leg `i + 1` is not requested before leg `i` resolves.
pub async fn build_segments<R: RoadRouter + ?Sized>(
    stops: &[Stop],
    modes: &[Mode],
    profile: &RouteProfile,
    router: &R,
) -> Vec<Segment> {
    let mut segments = Vec::with_capacity(stops.len().saturating_sub(1));
    for (index, pair) in stops.windows(2).enumerate() {
        let mode = leg_mode(modes, index);
        segments.push(build_segment(&pair[0], &pair[1], mode, profile, router).await);
    }
    segments
}
