use std::collections::HashMap;

use tokio::sync::RwLock;

use crate::error::RouteError;
use crate::router::{BoxFuture, RoadRoute, RoadRouter, RouteRequest};

/// Requests are matched at micro-degree precision.
type RouteKey = [i64; 4];

fn key(request: &RouteRequest) -> RouteKey {
    let q = |v: f64| (v * 1e6).round() as i64;
    [
        q(request.from[0]),
        q(request.from[1]),
        q(request.to[0]),
        q(request.to[1]),
    ]
}

/// In-memory router for tests and canned trips. Unknown pairs yield
/// [`RouteError::EmptyRoute`].
#[derive(Default)]
pub struct MemoryRouter {
    routes: RwLock<HashMap<RouteKey, RoadRoute>>,
}

impl MemoryRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, request: RouteRequest, route: RoadRoute) {
        self.routes.write().await.insert(key(&request), route);
    }

    pub async fn remove(&self, request: RouteRequest) -> Option<RoadRoute> {
        self.routes.write().await.remove(&key(&request))
    }
}

impl RoadRouter for MemoryRouter {
    fn name(&self) -> &str {
        "memory"
    }

    fn route(&self, request: RouteRequest) -> BoxFuture<'_, Result<RoadRoute, RouteError>> {
        Box::pin(async move {
            self.routes
                .read()
                .await
                .get(&key(&request))
                .cloned()
                .ok_or(RouteError::EmptyRoute)
        })
    }
}

/// Router for runs without network access; every lookup fails.
#[derive(Debug, Default, Copy, Clone)]
pub struct OfflineRouter;

impl RoadRouter for OfflineRouter {
    fn name(&self) -> &str {
        "offline"
    }

    fn route(&self, _request: RouteRequest) -> BoxFuture<'_, Result<RoadRoute, RouteError>> {
        Box::pin(async { Err(RouteError::Unavailable) })
    }
}
