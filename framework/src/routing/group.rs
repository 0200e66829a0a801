//! Route groups: named collections of routes sharing a path prefix

use super::router::{boxed, BoxedHandler, Router};
use crate::http::{Request, Response};
use std::future::Future;
use std::sync::Arc;

/// A route registered within a group
struct GroupRoute {
    method: hyper::Method,
    path: String,
    handler: Arc<BoxedHandler>,
    name: Option<String>,
}

/// Inner router used within a group closure
///
/// Captures routes without the prefix; they are merged into the outer router
/// with the group's prefix when the closure returns.
pub struct GroupRouter {
    routes: Vec<GroupRoute>,
}

impl GroupRouter {
    fn new() -> Self {
        Self { routes: Vec::new() }
    }

    fn push<H, Fut>(mut self, method: hyper::Method, path: &str, handler: H) -> Self
    where
        H: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Response> + Send + 'static,
    {
        self.routes.push(GroupRoute {
            method,
            path: path.to_string(),
            handler: boxed(handler),
            name: None,
        });
        self
    }

    /// Register a GET route within the group
    pub fn get<H, Fut>(self, path: &str, handler: H) -> Self
    where
        H: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Response> + Send + 'static,
    {
        self.push(hyper::Method::GET, path, handler)
    }

    /// Register a POST route within the group
    pub fn post<H, Fut>(self, path: &str, handler: H) -> Self
    where
        H: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Response> + Send + 'static,
    {
        self.push(hyper::Method::POST, path, handler)
    }

    /// Name the most recently registered route; the group name is prepended
    pub fn name(mut self, name: &str) -> Self {
        if let Some(route) = self.routes.last_mut() {
            route.name = Some(name.to_string());
        }
        self
    }
}

impl Router {
    /// Mount a named route group with a shared prefix
    ///
    /// Routes defined within the group have the prefix prepended to their
    /// paths, and route names are qualified with the group name.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// Router::new()
    ///     .group("api", "/api", |r| {
    ///         r.get("/status", status::show).name("status")   // GET /api/status, "api.status"
    ///     })
    /// ```
    pub fn group<F>(mut self, name: &str, prefix: &str, builder_fn: F) -> Router
    where
        F: FnOnce(GroupRouter) -> GroupRouter,
    {
        let built = builder_fn(GroupRouter::new());
        let prefix = prefix.trim_end_matches('/');

        for route in built.routes {
            let full_path = match (prefix.is_empty(), route.path.as_str()) {
                (false, "/") => prefix.to_string(),
                _ => format!("{}{}", prefix, route.path),
            };
            if let Some(route_name) = &route.name {
                self.register_name(&format!("{}.{}", name, route_name), &full_path);
            }
            self.insert(route.method, &full_path, route.handler);
        }

        tracing::debug!(group = name, prefix, "route group registered");
        self.record_group(name);
        self
    }
}

impl crate::routing::RouteBuilder {
    /// Mount a route group (for chaining without .name())
    pub fn group<F>(self, name: &str, prefix: &str, builder_fn: F) -> Router
    where
        F: FnOnce(GroupRouter) -> GroupRouter,
    {
        self.router.group(name, prefix, builder_fn)
    }
}
