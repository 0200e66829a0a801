use web::Router;

use crate::controllers;

/// Mount the `views` and `api` route groups
pub fn register() -> Router {
    Router::new()
        .group("views", "", |r| r.get("/", controllers::home::index).name("home"))
        .group("api", "/api", |r| {
            r.get("/status", controllers::status::show).name("status")
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;
    use std::sync::Arc;
    use web::{dispatch, AppContext, Config, Container};

    use crate::services::ServiceRegistry;

    fn context(root: &std::path::Path) -> Arc<AppContext> {
        let vars = HashMap::new();
        let mut config = Config::from_vars(&vars, root);
        crate::config::register_with(&mut config, &vars).unwrap();
        let mut container = Container::new();
        container.singleton(ServiceRegistry::unavailable());
        Arc::new(AppContext::new(config, container))
    }

    fn get(uri: &str) -> http::request::Parts {
        http::Request::get(uri).body(()).unwrap().into_parts().0
    }

    #[test]
    fn test_groups_and_names() {
        let router = register();
        assert_eq!(router.groups(), &["views".to_string(), "api".to_string()]);
        assert_eq!(router.url("views.home", &[]), Some("/".to_string()));
        assert_eq!(router.url("api.status", &[]), Some("/api/status".to_string()));
    }

    #[tokio::test]
    async fn test_index() {
        let dir = tempfile::tempdir().unwrap();
        let response = dispatch(&register(), &context(dir.path()), get("/"), Bytes::new()).await;
        assert_eq!(response.status_code(), 200);
        assert_eq!(response.body(), "LexAI is running");
    }

    #[tokio::test]
    async fn test_status_reports_unavailable_backend() {
        let dir = tempfile::tempdir().unwrap();
        let response = dispatch(
            &register(),
            &context(dir.path()),
            get("/api/status"),
            Bytes::new(),
        )
        .await;

        assert_eq!(response.status_code(), 200);
        let body: serde_json::Value = serde_json::from_str(response.body()).unwrap();
        assert_eq!(body["firebase"], false);
        assert_eq!(body["storage_bucket"], serde_json::Value::Null);
        assert_eq!(body["max_content_length"], 16 * 1024 * 1024);
        assert_eq!(
            body["allowed_extensions"],
            serde_json::json!(["doc", "docx", "pdf", "rtf", "txt"])
        );
    }

    #[tokio::test]
    async fn test_unknown_route() {
        let dir = tempfile::tempdir().unwrap();
        let response =
            dispatch(&register(), &context(dir.path()), get("/api/missing"), Bytes::new()).await;
        assert_eq!(response.status_code(), 404);
    }
}
