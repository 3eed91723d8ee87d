use super::RoutingParams;

/// A path pattern such as `/user/:id/edit` paired with the routing
/// parameters it resolves to.
///
/// Two routes are equal when their patterns are equal; params are ignored.
#[derive(Debug, Clone)]
pub struct Route {
    pattern: String,
    params: RoutingParams,
}

impl Route {
    pub fn new(pattern: impl Into<String>, params: RoutingParams) -> Self {
        Self {
            pattern: pattern.into(),
            params,
        }
    }

    /// Shorthand for building the params from string pairs.
    pub fn with_params<I, K, V>(pattern: impl Into<String>, params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self::new(
            pattern,
            params
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn params(&self) -> &RoutingParams {
        &self.params
    }
}

impl PartialEq for Route {
    fn eq(&self, other: &Self) -> bool {
        self.pattern == other.pattern
    }
}

impl Eq for Route {}
