//! Handwriting recognition client.
//!
//! Recognition runs in an external service; this module only ships image
//! bytes there and reads the text back.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use serde_json::Value;
use thiserror::Error;

/// Recognition can take a while on a cold model.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, Error)]
pub enum RecognitionError {
    #[error("Handwriting recognition is not configured (set RECOGNIZER_URL)")]
    NotConfigured,
    #[error("Recognizer request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Recognizer returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("Recognizer response had no text")]
    EmptyResponse,
}

/// Turns an image into raw text.
#[async_trait]
pub trait Recognizer: Send + Sync {
    async fn recognize(&self, image: Bytes) -> Result<String, RecognitionError>;
}

/// Posts image bytes to an HTTP inference endpoint.
pub struct HttpRecognizer {
    client: reqwest::Client,
    url: String,
}

impl HttpRecognizer {
    pub fn new(url: impl Into<String>) -> Result<Self, RecognitionError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl Recognizer for HttpRecognizer {
    async fn recognize(&self, image: Bytes) -> Result<String, RecognitionError> {
        let response = self
            .client
            .post(&self.url)
            .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
            .body(image)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(RecognitionError::Status {
                status: status.as_u16(),
                body,
            });
        }

        extract_text(&body).ok_or(RecognitionError::EmptyResponse)
    }
}

/// Used when no endpoint is configured. Every call fails.
pub struct DisabledRecognizer;

#[async_trait]
impl Recognizer for DisabledRecognizer {
    async fn recognize(&self, _image: Bytes) -> Result<String, RecognitionError> {
        Err(RecognitionError::NotConfigured)
    }
}

/// Reads recognized text from a response body.
///
/// Accepts `[{"generated_text": ...}]`, `{"generated_text": ...}`,
/// `{"text": ...}`, or a plain-text body. Output is trimmed and may be
/// empty; `None` means the body had no recognizable shape.
pub fn extract_text(body: &str) -> Option<String> {
    let Ok(json) = serde_json::from_str::<Value>(body) else {
        return Some(body.trim().to_string());
    };

    let object = match &json {
        Value::Array(items) => items.first()?,
        other => other,
    };

    let text = match object {
        Value::String(text) => text.as_str(),
        Value::Object(map) => map
            .get("generated_text")
            .or_else(|| map.get("text"))?
            .as_str()?,
        _ => return None,
    };

    Some(text.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_inference_api_shape() {
        let body = r#"[{"generated_text": " Total: 12.50 "}]"#;
        assert_eq!(extract_text(body).as_deref(), Some("Total: 12.50"));
    }

    #[test]
    fn test_extract_object_shapes() {
        assert_eq!(
            extract_text(r#"{"text": "INV-001"}"#).as_deref(),
            Some("INV-001")
        );
        assert_eq!(
            extract_text(r#"{"generated_text": "a", "text": "b"}"#).as_deref(),
            Some("a")
        );
    }

    #[test]
    fn test_extract_plain_text() {
        assert_eq!(
            extract_text("  hand written\n").as_deref(),
            Some("hand written")
        );
    }

    #[test]
    fn test_extract_unknown_json_shape() {
        assert_eq!(extract_text(r#"{"score": 0.9}"#), None);
        assert_eq!(extract_text("[]"), None);
        assert_eq!(extract_text("42"), None);
    }

    #[tokio::test]
    async fn test_disabled_recognizer_fails() {
        let result = DisabledRecognizer.recognize(Bytes::from_static(b"img")).await;
        assert!(matches!(result, Err(RecognitionError::NotConfigured)));
    }

    #[tokio::test]
    async fn test_http_recognizer_reports_connect_failure() {
        let recognizer = HttpRecognizer::new("http://127.0.0.1:1/predict").unwrap();

        let result = recognizer.recognize(Bytes::from_static(b"img")).await;

        // A proxy in the environment may answer instead of refusing.
        assert!(matches!(
            result,
            Err(RecognitionError::Request(_)) | Err(RecognitionError::Status { .. })
        ));
    }
}
