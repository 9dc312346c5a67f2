//! OSRM-compatible HTTP router.
//!
//! Requests `GET {base}/route/v1/{profile}/{lon},{lat};{lon},{lat}?overview=full&geometries=geojson`
//! and reads the first route's GeoJSON line and distance.

use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use crate::error::RouteError;
use crate::router::{BoxFuture, RoadRoute, RoadRouter, RouteRequest};

pub const DEFAULT_OSRM_URL: &str = "https://router.project-osrm.org";

/// Upper bound on one route request, connect to last body byte.
pub const DEFAULT_ROUTE_TIMEOUT: Duration = Duration::from_secs(10);

pub struct OsrmRouter {
    base_url: String,
    profile: String,
    timeout: Duration,
    client: reqwest::Client,
}

impl OsrmRouter {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            profile: "driving".to_string(),
            timeout: DEFAULT_ROUTE_TIMEOUT,
            client: reqwest::Client::new(),
        }
    }

    pub fn with_profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = profile.into();
        self
    }

    /// A request still unanswered after `timeout` fails as a transport error.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    pub fn route_url(&self, request: &RouteRequest) -> String {
        format!(
            "{}/route/v1/{}/{},{};{},{}?overview=full&geometries=geojson",
            self.base_url,
            self.profile,
            request.from[0],
            request.from[1],
            request.to[0],
            request.to[1]
        )
    }
}

impl Default for OsrmRouter {
    fn default() -> Self {
        Self::new(DEFAULT_OSRM_URL)
    }
}

impl RoadRouter for OsrmRouter {
    fn name(&self) -> &str {
        "osrm"
    }

    fn route(&self, request: RouteRequest) -> BoxFuture<'_, Result<RoadRoute, RouteError>> {
        let url = self.route_url(&request);
        Box::pin(async move {
            debug!(%url, "requesting road route");
            let resp = self
                .client
                .get(&url)
                .timeout(self.timeout)
                .send()
                .await?;
            if !resp.status().is_success() {
                return Err(RouteError::Http {
                    status: resp.status().as_u16(),
                });
            }
            let body = resp.bytes().await?;
            parse_route_body(&body)
        })
    }
}

#[derive(Debug, Deserialize)]
struct OsrmResponse {
    code: Option<String>,
    #[serde(default)]
    routes: Vec<OsrmRoute>,
}

#[derive(Debug, Deserialize)]
struct OsrmRoute {
    geometry: Option<OsrmGeometry>,
    distance: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct OsrmGeometry {
    #[serde(default)]
    coordinates: Vec<[f64; 2]>,
}

/// Decode an OSRM route response body.
pub fn parse_route_body(body: &[u8]) -> Result<RoadRoute, RouteError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(RouteError::EmptyRoute);
    }
    let response: OsrmResponse =
        serde_json::from_slice(body).map_err(|err| RouteError::Decode(err.to_string()))?;

    if let Some(code) = response.code.filter(|code| code != "Ok") {
        return Err(RouteError::Rejected { code });
    }

    let route = response
        .routes
        .into_iter()
        .next()
        .ok_or(RouteError::EmptyRoute)?;
    let coordinates = route.geometry.map(|g| g.coordinates).unwrap_or_default();
    if coordinates.len() < 2 {
        return Err(RouteError::EmptyRoute);
    }
    if coordinates
        .iter()
        .any(|c| !c[0].is_finite() || !c[1].is_finite())
    {
        return Err(RouteError::Decode("non-finite coordinate".into()));
    }

    let distance_m = route
        .distance
        .ok_or_else(|| RouteError::Decode("missing distance".into()))?;
    if !distance_m.is_finite() || distance_m < 0.0 {
        return Err(RouteError::Decode(format!("invalid distance {distance_m}")));
    }

    Ok(RoadRoute {
        coordinates,
        distance_m,
    })
}

#[cfg(test)]
mod tests {
    use super::{DEFAULT_ROUTE_TIMEOUT, OsrmRouter, parse_route_body};
    use crate::error::RouteError;
    use crate::router::{RoadRouter, RouteRequest};
    use axum::Router;
    use axum::http::StatusCode;
    use axum::routing::get;
    use pretty_assertions::assert_eq;
    use std::time::Duration;

    const GOOD_BODY: &str = r#"{
        "code": "Ok",
        "routes": [{
            "distance": 12345.6,
            "geometry": {"type": "LineString", "coordinates": [[-74.0, 40.7], [-73.9, 40.8], [-73.8, 40.9]]}
        }]
    }"#;

    async fn serve(status: StatusCode, body: &'static str) -> String {
        let app = Router::new().route(
            "/route/v1/driving/:coords",
            get(move || async move { (status, body) }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn request() -> RouteRequest {
        RouteRequest::new(-74.0, 40.7, -73.8, 40.9)
    }

    #[test]
    fn builds_osrm_url() {
        let router = OsrmRouter::new("http://localhost:5000/");
        assert_eq!(
            router.route_url(&request()),
            "http://localhost:5000/route/v1/driving/-74,40.7;-73.8,40.9?overview=full&geometries=geojson"
        );
    }

    #[test]
    fn parses_first_route() {
        let route = parse_route_body(GOOD_BODY.as_bytes()).unwrap();
        assert_eq!(route.coordinates.len(), 3);
        assert_eq!(route.coordinates[0], [-74.0, 40.7]);
        assert_eq!(route.distance_m, 12345.6);
    }

    #[test]
    fn rejects_unusable_bodies() {
        assert!(matches!(parse_route_body(b""), Err(RouteError::EmptyRoute)));
        assert!(matches!(
            parse_route_body(br#"{"code":"Ok","routes":[]}"#),
            Err(RouteError::EmptyRoute)
        ));
        assert!(matches!(
            parse_route_body(
                br#"{"code":"Ok","routes":[{"distance":1,"geometry":{"coordinates":[[0,0]]}}]}"#
            ),
            Err(RouteError::EmptyRoute)
        ));
        assert!(matches!(
            parse_route_body(br#"{"code":"NoRoute","routes":[]}"#),
            Err(RouteError::Rejected { .. })
        ));
        assert!(matches!(
            parse_route_body(b"<html>"),
            Err(RouteError::Decode(_))
        ));
    }

    #[test]
    fn route_without_distance_is_malformed() {
        let body = br#"{"code":"Ok","routes":[{"geometry":{"coordinates":[[10,50],[10.2,50.1]]}}]}"#;
        match parse_route_body(body) {
            Err(RouteError::Decode(message)) => assert_eq!(message, "missing distance"),
            other => panic!("expected a decode error, got {other:?}"),
        }
    }

    #[test]
    fn timeout_is_configurable() {
        let router = OsrmRouter::default();
        assert_eq!(router.timeout(), DEFAULT_ROUTE_TIMEOUT);
        let router = router.with_timeout(Duration::from_millis(250));
        assert_eq!(router.timeout(), Duration::from_millis(250));
    }

    #[tokio::test]
    async fn unanswered_request_times_out() {
        let app = Router::new().route(
            "/route/v1/driving/:coords",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                "late"
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let router =
            OsrmRouter::new(format!("http://{addr}")).with_timeout(Duration::from_millis(200));
        let err = router.route(request()).await.unwrap_err();
        assert!(matches!(err, RouteError::Transport(_)));
    }

    #[tokio::test]
    async fn server_error_is_http_failure() {
        let base = serve(StatusCode::INTERNAL_SERVER_ERROR, "boom").await;
        let err = OsrmRouter::new(base).route(request()).await.unwrap_err();
        assert!(matches!(err, RouteError::Http { status: 500 }));
        assert!(err.is_http());
    }

    #[tokio::test]
    async fn empty_body_is_empty_route() {
        let base = serve(StatusCode::OK, "").await;
        let err = OsrmRouter::new(base).route(request()).await.unwrap_err();
        assert!(err.is_empty_route());
    }

    #[tokio::test]
    async fn good_body_round_trips() {
        let base = serve(StatusCode::OK, GOOD_BODY).await;
        let route = OsrmRouter::new(base).route(request()).await.unwrap();
        assert_eq!(route.coordinates.len(), 3);
        assert!((route.distance_km() - 12.3456).abs() < 1e-9);
    }
}
