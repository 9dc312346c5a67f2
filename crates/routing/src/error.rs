#[derive(thiserror::Error, Debug)]
pub enum RouteError {
    #[error("routing service answered HTTP {status}")]
    Http { status: u16 },

    #[error("routing service rejected the request: {code}")]
    Rejected { code: String },

    #[error("no route between the requested points")]
    EmptyRoute,

    #[error("malformed route body: {0}")]
    Decode(String),

    #[error("routing request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("routing is unavailable")]
    Unavailable,
}

impl RouteError {
    /// Transport-level failure: the service could not be reached or did not answer 2xx.
    pub fn is_http(&self) -> bool {
        matches!(self, Self::Http { .. } | Self::Transport(_) | Self::Unavailable)
    }

    /// The service answered but the body held no usable route.
    pub fn is_empty_route(&self) -> bool {
        matches!(
            self,
            Self::EmptyRoute | Self::Rejected { .. } | Self::Decode(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::RouteError;

    #[test]
    fn failure_families_are_disjoint() {
        let http = RouteError::Http { status: 500 };
        assert!(http.is_http());
        assert!(!http.is_empty_route());

        let empty = RouteError::EmptyRoute;
        assert!(empty.is_empty_route());
        assert!(!empty.is_http());

        let rejected = RouteError::Rejected {
            code: "NoRoute".into(),
        };
        assert!(rejected.is_empty_route());
        assert_eq!(
            rejected.to_string(),
            "routing service rejected the request: NoRoute"
        );
    }
}
