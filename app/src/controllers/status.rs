use web::{json, json_value, Request, Response};

use crate::config::UploadConfig;
use crate::services::ServiceRegistry;

/// Backend availability and upload limits
pub async fn show(req: Request) -> Response {
    let registry = req
        .service::<ServiceRegistry>()
        .unwrap_or_else(|_| ServiceRegistry::unavailable());
    let upload = req.config().get::<UploadConfig>().unwrap_or_default();

    json(json_value!({
        "firebase": registry.is_available(),
        "storage_bucket": registry.storage_bucket().map(|bucket| bucket.name()),
        "max_content_length": upload.max_content_length,
        "allowed_extensions": upload.allowed_extensions,
    }))
}
