use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::RouteError;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A point-to-point road lookup, lon/lat in degrees.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteRequest {
    pub from: [f64; 2],
    pub to: [f64; 2],
}

impl RouteRequest {
    pub fn new(from_lon: f64, from_lat: f64, to_lon: f64, to_lat: f64) -> Self {
        Self {
            from: [from_lon, from_lat],
            to: [to_lon, to_lat],
        }
    }
}

/// Road geometry as `[lon, lat]` pairs plus the service's reported length.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoadRoute {
    pub coordinates: Vec<[f64; 2]>,
    pub distance_m: f64,
}

impl RoadRoute {
    pub fn distance_km(&self) -> f64 {
        self.distance_m / 1000.0
    }
}

/// Source of road geometry.
///
/// Methods return boxed futures so routers can be used as trait objects.
pub trait RoadRouter: Send + Sync {
    fn name(&self) -> &str;

    /// Resolve a road route. Any error means the caller should fall back.
    fn route(&self, request: RouteRequest) -> BoxFuture<'_, Result<RoadRoute, RouteError>>;
}

impl<T: RoadRouter + ?Sized> RoadRouter for Arc<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn route(&self, request: RouteRequest) -> BoxFuture<'_, Result<RoadRoute, RouteError>> {
        (**self).route(request)
    }
}

impl<T: RoadRouter + ?Sized> RoadRouter for &T {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn route(&self, request: RouteRequest) -> BoxFuture<'_, Result<RoadRoute, RouteError>> {
        (**self).route(request)
    }
}
