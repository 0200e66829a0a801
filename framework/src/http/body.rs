//! Body collection and parsing
//!
//! Bodies are collected in full before dispatch, bounded by the configured
//! maximum body size.

use crate::error::FrameworkError;
use bytes::Bytes;
use http_body_util::{BodyExt, LengthLimitError, Limited};
use hyper::body::Body;
use serde::de::DeserializeOwned;

/// Collect a full body, failing with `PayloadTooLarge` past `limit` bytes
pub async fn collect_body<B>(body: B, limit: usize) -> Result<Bytes, FrameworkError>
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    match Limited::new(body, limit).collect().await {
        Ok(collected) => Ok(collected.to_bytes()),
        Err(e) if e.downcast_ref::<LengthLimitError>().is_some() => {
            Err(FrameworkError::PayloadTooLarge { limit })
        }
        Err(e) => Err(FrameworkError::internal(format!(
            "Failed to read request body: {}",
            e
        ))),
    }
}

/// Parse bytes as JSON into the target type
pub fn parse_json<T: DeserializeOwned>(bytes: &Bytes) -> Result<T, FrameworkError> {
    serde_json::from_slice(bytes)
        .map_err(|e| FrameworkError::domain(format!("Failed to parse JSON body: {}", e), 400))
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::Full;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_collect_within_limit() {
        let body = Full::new(Bytes::from_static(b"hello"));
        let bytes = collect_body(body, 16).await.unwrap();
        assert_eq!(bytes, Bytes::from_static(b"hello"));
    }

    #[tokio::test]
    async fn test_collect_over_limit_is_payload_too_large() {
        let body = Full::new(Bytes::from(vec![b'x'; 32]));
        let err = collect_body(body, 16).await.unwrap_err();
        assert_eq!(err.status_code(), 413);
    }

    #[test]
    fn test_parse_json_error_is_bad_request() {
        let err = parse_json::<serde_json::Value>(&Bytes::from_static(b"{nope")).unwrap_err();
        assert_eq!(err.status_code(), 400);
    }
}
