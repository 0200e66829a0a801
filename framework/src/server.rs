use crate::config::ServerConfig;
use crate::context::AppContext;
use crate::error::FrameworkError;
use crate::http::{collect_body, HttpResponse, Request};
use crate::routing::Router;
use bytes::Bytes;
use http_body_util::Full;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use std::convert::Infallible;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use tokio::net::TcpListener;

pub struct Server {
    router: Arc<Router>,
    context: Arc<AppContext>,
    host: String,
    port: u16,
    max_body_size: usize,
}

impl Server {
    /// Create a server for the router, reading host, port and body limit
    /// from the context's `ServerConfig`
    pub fn new(router: Router, context: Arc<AppContext>) -> Self {
        let config = context
            .config()
            .get::<ServerConfig>()
            .unwrap_or_default();
        Self {
            router: Arc::new(router),
            context,
            host: config.host,
            port: config.port,
            max_body_size: config.max_body_size,
        }
    }

    pub fn host(mut self, host: &str) -> Self {
        self.host = host.to_string();
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn context(&self) -> &Arc<AppContext> {
        &self.context
    }

    pub fn max_body_size(&self) -> usize {
        self.max_body_size
    }

    fn addr(&self) -> Result<SocketAddr, FrameworkError> {
        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|_| FrameworkError::config("SERVER_HOST", format!("invalid address '{}'", self.host)))?;
        Ok(SocketAddr::new(ip, self.port))
    }

    /// Bind the configured address and serve until Ctrl+C
    pub async fn run(self) -> Result<(), FrameworkError> {
        let addr = self.addr()?;
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| FrameworkError::server(format!("cannot bind {}: {}", addr, e)))?;
        self.serve(listener).await
    }

    /// Serve connections from an already bound listener until Ctrl+C
    pub async fn serve(self, listener: TcpListener) -> Result<(), FrameworkError> {
        let addr = listener.local_addr()?;
        tracing::info!(%addr, groups = ?self.router.groups(), "server listening");

        let router = self.router;
        let context = self.context;
        let limit = self.max_body_size;

        loop {
            let (stream, peer) = tokio::select! {
                accepted = listener.accept() => accepted?,
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("shutdown signal received");
                    return Ok(());
                }
            };
            let io = TokioIo::new(stream);
            let router = router.clone();
            let context = context.clone();

            tokio::spawn(async move {
                let service = service_fn(move |req: hyper::Request<hyper::body::Incoming>| {
                    let router = router.clone();
                    let context = context.clone();
                    async move {
                        Ok::<_, Infallible>(handle_request(router, context, limit, req).await)
                    }
                });

                if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                    tracing::warn!(%peer, error = %err, "error serving connection");
                }
            });
        }
    }
}

async fn handle_request(
    router: Arc<Router>,
    context: Arc<AppContext>,
    limit: usize,
    req: hyper::Request<hyper::body::Incoming>,
) -> hyper::Response<Full<Bytes>> {
    let (parts, body) = req.into_parts();
    let response = match collect_body(body, limit).await {
        Ok(bytes) => dispatch(&router, &context, parts, bytes).await,
        Err(err) => {
            tracing::warn!(path = %parts.uri.path(), error = %err, "request body rejected");
            HttpResponse::from(err)
        }
    };
    response.into_hyper()
}

/// Route a request whose body has been collected and run its handler
pub async fn dispatch(
    router: &Router,
    context: &Arc<AppContext>,
    parts: hyper::http::request::Parts,
    body: Bytes,
) -> HttpResponse {
    let method = parts.method.clone();
    let path = parts.uri.path().to_string();

    let response = match router.match_route(&method, &path) {
        Some((handler, params)) => {
            let request = Request::new(parts, body, context.clone()).with_params(params);
            // both Ok and Err carry an HttpResponse
            handler(request).await.unwrap_or_else(|e| e)
        }
        None => HttpResponse::text("404 Not Found").status(404),
    };

    tracing::debug!(%method, %path, status = response.status_code(), "request handled");
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::container::Container;
    use crate::http::{text, Response};
    use crate::FrameworkError;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;
    use std::path::Path;

    async fn hello(req: Request) -> Response {
        let name = req.param("name")?;
        text(format!("hello {}", name))
    }

    async fn missing_service(req: Request) -> Response {
        let _value = req.service::<String>()?;
        text("unreachable")
    }

    fn context() -> Arc<AppContext> {
        let config = Config::from_vars(&HashMap::new(), Path::new("."));
        Arc::new(AppContext::new(config, Container::new()))
    }

    fn parts(method: &str, uri: &str) -> hyper::http::request::Parts {
        hyper::Request::builder()
            .method(method)
            .uri(uri)
            .body(())
            .unwrap()
            .into_parts()
            .0
    }

    fn router() -> Router {
        Router::new().group("api", "/api", |r| {
            r.get("/hello/{name}", hello).get("/broken", missing_service)
        })
    }

    #[tokio::test]
    async fn test_dispatch_runs_matching_handler() {
        let response = dispatch(
            &router(),
            &context(),
            parts("GET", "/api/hello/ada"),
            Bytes::new(),
        )
        .await;
        assert_eq!(response.status_code(), 200);
        assert_eq!(response.body(), "hello ada");
    }

    #[tokio::test]
    async fn test_dispatch_unknown_route_is_404() {
        let response = dispatch(&router(), &context(), parts("GET", "/nope"), Bytes::new()).await;
        assert_eq!(response.status_code(), 404);
    }

    #[tokio::test]
    async fn test_handler_error_becomes_response() {
        let response = dispatch(
            &router(),
            &context(),
            parts("GET", "/api/broken"),
            Bytes::new(),
        )
        .await;
        assert_eq!(response.status_code(), 500);
    }

    #[test]
    fn test_server_reads_config_and_validates_host() {
        let server = Server::new(router(), context());
        assert_eq!(server.max_body_size(), 10 * 1024 * 1024);
        assert!(server.addr().is_ok());

        let server = server.host("not an ip");
        assert!(matches!(server.addr(), Err(FrameworkError::Config { .. })));
    }
}
