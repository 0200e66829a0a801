use crate::http::{Request, Response};
use matchit::Router as MatchitRouter;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// Type alias for route handlers
pub type BoxedHandler =
    Box<dyn Fn(Request) -> Pin<Box<dyn Future<Output = Response> + Send>> + Send + Sync>;

/// Box a handler function
pub(crate) fn boxed<H, Fut>(handler: H) -> Arc<BoxedHandler>
where
    H: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Response> + Send + 'static,
{
    let handler: BoxedHandler = Box::new(move |req| Box::pin(handler(req)));
    Arc::new(handler)
}

/// HTTP router
///
/// Routes are matched per method with `matchit` patterns (`/documents/{id}`).
/// Route names map to path patterns so URLs can be generated with [`Router::url`].
pub struct Router {
    get_routes: MatchitRouter<Arc<BoxedHandler>>,
    post_routes: MatchitRouter<Arc<BoxedHandler>>,
    names: HashMap<String, String>,
    groups: Vec<String>,
}

impl Router {
    pub fn new() -> Self {
        Self {
            get_routes: MatchitRouter::new(),
            post_routes: MatchitRouter::new(),
            names: HashMap::new(),
            groups: Vec::new(),
        }
    }

    /// Insert a pre-boxed handler (used by groups)
    pub(crate) fn insert(&mut self, method: hyper::Method, path: &str, handler: Arc<BoxedHandler>) {
        let table = match method {
            hyper::Method::GET => &mut self.get_routes,
            hyper::Method::POST => &mut self.post_routes,
            other => {
                tracing::warn!(method = %other, path, "unsupported route method ignored");
                return;
            }
        };
        if let Err(err) = table.insert(path, handler) {
            tracing::warn!(%method, path, error = %err, "route not registered");
        }
    }

    pub(crate) fn register_name(&mut self, name: &str, path: &str) {
        self.names.insert(name.to_string(), path.to_string());
    }

    pub(crate) fn record_group(&mut self, name: &str) {
        self.groups.push(name.to_string());
    }

    fn route<H, Fut>(mut self, method: hyper::Method, path: &str, handler: H) -> RouteBuilder
    where
        H: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Response> + Send + 'static,
    {
        self.insert(method, path, boxed(handler));
        RouteBuilder {
            router: self,
            last_path: path.to_string(),
        }
    }

    /// Register a GET route
    pub fn get<H, Fut>(self, path: &str, handler: H) -> RouteBuilder
    where
        H: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Response> + Send + 'static,
    {
        self.route(hyper::Method::GET, path, handler)
    }

    /// Register a POST route
    pub fn post<H, Fut>(self, path: &str, handler: H) -> RouteBuilder
    where
        H: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Response> + Send + 'static,
    {
        self.route(hyper::Method::POST, path, handler)
    }

    /// Match a request and return the handler with extracted params
    pub fn match_route(
        &self,
        method: &hyper::Method,
        path: &str,
    ) -> Option<(Arc<BoxedHandler>, HashMap<String, String>)> {
        let router = match *method {
            hyper::Method::GET => &self.get_routes,
            hyper::Method::POST => &self.post_routes,
            _ => return None,
        };

        router.at(path).ok().map(|matched| {
            let params: HashMap<String, String> = matched
                .params
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect();
            (matched.value.clone(), params)
        })
    }

    /// Generate a URL for a named route
    ///
    /// # Example
    /// ```rust,ignore
    /// let url = router.url("api.documents.show", &[("id", "123")]);
    /// assert_eq!(url, Some("/api/documents/123".to_string()));
    /// ```
    pub fn url(&self, name: &str, params: &[(&str, &str)]) -> Option<String> {
        let mut url = self.names.get(name)?.clone();
        for (key, value) in params {
            url = url.replace(&format!("{{{}}}", key), value);
        }
        Some(url)
    }

    /// Names of the route groups mounted on this router, in order
    pub fn groups(&self) -> &[String] {
        &self.groups
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder returned after registering a route, enabling .name() chaining
pub struct RouteBuilder {
    pub(crate) router: Router,
    last_path: String,
}

impl RouteBuilder {
    /// Name the most recently registered route
    pub fn name(mut self, name: &str) -> Router {
        self.router.register_name(name, &self.last_path);
        self.router
    }

    /// Register a GET route (for chaining without .name())
    pub fn get<H, Fut>(self, path: &str, handler: H) -> RouteBuilder
    where
        H: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Response> + Send + 'static,
    {
        self.router.get(path, handler)
    }

    /// Register a POST route (for chaining without .name())
    pub fn post<H, Fut>(self, path: &str, handler: H) -> RouteBuilder
    where
        H: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Response> + Send + 'static,
    {
        self.router.post(path, handler)
    }
}

impl From<RouteBuilder> for Router {
    fn from(builder: RouteBuilder) -> Self {
        builder.router
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::text;
    use pretty_assertions::assert_eq;

    async fn ok(_req: Request) -> Response {
        text("ok")
    }

    #[test]
    fn test_match_route_extracts_params() {
        let router: Router = Router::new()
            .get("/documents/{id}", ok)
            .name("documents.show")
            .post("/documents", ok)
            .into();

        let (_, params) = router
            .match_route(&hyper::Method::GET, "/documents/42")
            .unwrap();
        assert_eq!(params.get("id").map(String::as_str), Some("42"));

        assert!(router.match_route(&hyper::Method::POST, "/documents").is_some());
        assert!(router.match_route(&hyper::Method::DELETE, "/documents").is_none());
        assert!(router.match_route(&hyper::Method::PATCH, "/documents").is_none());
        assert!(router.match_route(&hyper::Method::GET, "/missing").is_none());
    }

    #[test]
    fn test_url_for_named_route() {
        let router = Router::new().get("/documents/{id}", ok).name("documents.show");
        assert_eq!(
            router.url("documents.show", &[("id", "9")]),
            Some("/documents/9".to_string())
        );
        assert_eq!(router.url("missing", &[]), None);
    }

    #[test]
    fn test_conflicting_route_keeps_first() {
        let router: Router = Router::new().get("/a", ok).get("/a", ok).into();
        assert!(router.match_route(&hyper::Method::GET, "/a").is_some());
    }
}
