//! Path-info routing.
//!
//! Routes are kept in insertion order, which is also their priority: the
//! first compiled pattern that matches the whole path wins. Register more
//! specific patterns before general ones that would shadow them.
//!
//! Mutating the table does not touch the matchers; [Router::resolve] only
//! ever sees what the last [Router::compile_routes] produced.

use std::collections::BTreeMap;

use essentials::debug;

use crate::{Error, Result};

pub use compiled::CompiledRoute;
pub use route::Route;

mod compiled;
pub mod loader;
mod route;

/// Routing parameters: `controller`, `action` and any captured segments.
pub type RoutingParams = BTreeMap<String, String>;

#[derive(Debug, Default)]
pub struct Router {
    routes: Vec<Route>,
    compiled: Vec<CompiledRoute>,
    dirty: bool,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `route`, replacing a route with the same pattern in place.
    pub fn add(mut self, route: Route) -> Self {
        self.add_route(route, true);
        self
    }

    /// Returns `false` only when the pattern is already registered and
    /// `replace` is off; the existing entry is then left untouched.
    pub fn add_route(&mut self, route: Route, replace: bool) -> bool {
        match self.routes.iter_mut().find(|existing| **existing == route) {
            Some(existing) => {
                if !replace {
                    return false;
                }
                *existing = route;
            }
            None => self.routes.push(route),
        }
        self.dirty = true;
        true
    }

    pub fn remove_route(&mut self, route: &Route) -> bool {
        match self.routes.iter().position(|existing| existing == route) {
            Some(index) => {
                self.routes.remove(index);
                self.dirty = true;
                true
            }
            None => false,
        }
    }

    pub fn compile_routes(&mut self) {
        self.compiled = self.routes.iter().map(CompiledRoute::compile).collect();
        self.dirty = false;
    }

    /// Builder-style [Router::compile_routes].
    pub fn compiled(mut self) -> Self {
        self.compile_routes();
        self
    }

    /// True when routes changed since the last compilation.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn resolve(&self, path_info: &str) -> Result<RoutingParams> {
        let path = if path_info.starts_with('/') {
            path_info.to_string()
        } else {
            format!("/{path_info}")
        };
        self.compiled
            .iter()
            .find_map(|route| route.resolve(&path))
            .ok_or_else(|| {
                debug!(path = %path, routes = self.compiled.len(), "no route matched");
                Error::route_not_found(path)
            })
    }
}

impl FromIterator<Route> for Router {
    fn from_iter<T: IntoIterator<Item = Route>>(routes: T) -> Self {
        routes
            .into_iter()
            .fold(Router::new(), |router, route| router.add(route))
            .compiled()
    }
}
