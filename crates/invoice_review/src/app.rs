use std::time::Duration;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method, StatusCode},
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};

use crate::{
    handlers::{
        health::health,
        submissions::{
            approve_submission, create_submission, get_submission, list_items, list_submissions,
        },
        upload::upload_submission,
    },
    state::AppState,
};

/// Largest accepted request body (invoice photos).
const MAX_BODY_BYTES: usize = 20 * 1024 * 1024;

/// Builds the router. `allowed_origins` are the browser origins allowed by CORS.
pub fn create_app(state: AppState, allowed_origins: &[String]) -> Router {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(origin = %origin, error = %e, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true);

    Router::new()
        .route("/health", get(health))
        .route("/submissions", get(list_submissions).post(create_submission))
        .route("/submissions/upload", post(upload_submission))
        .route("/submissions/{id}", get(get_submission))
        .route("/submissions/{id}/approve", post(approve_submission))
        .route("/submissions/{id}/items", get(list_items))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(60),
        ))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use async_trait::async_trait;
    use axum::{body::Body, http::Request, response::Response};
    use bytes::Bytes;
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use tempfile::TempDir;
    use tower::ServiceExt;

    use invoice_review_core::storage::StoreLocation;

    use crate::{
        config::Config,
        recognition::{DisabledRecognizer, RecognitionError, Recognizer},
        storage::{ConnectionProvider, SubmissionService},
    };

    struct FixedRecognizer(&'static str);

    #[async_trait]
    impl Recognizer for FixedRecognizer {
        async fn recognize(&self, _image: Bytes) -> Result<String, RecognitionError> {
            Ok(self.0.to_string())
        }
    }

    fn test_app(dir: &TempDir, recognizer: Arc<dyn Recognizer>) -> Router {
        let config = Config {
            store: StoreLocation::Embedded(dir.path().join("store.db")),
            fallback_sqlite_path: dir.path().join("fallback.db"),
            backend_root: dir.path().to_path_buf(),
            connect_timeout_seconds: 1,
            sqlite_busy_timeout_ms: 200,
            recognizer_url: None,
            cors_allowed_origins: vec!["http://localhost:5173".to_string()],
        };
        let provider = ConnectionProvider::new(&config).unwrap();
        let state = AppState::new(SubmissionService::new(Arc::new(provider)), recognizer);
        create_app(state, &config.cors_allowed_origins)
    }

    async fn send(app: &Router, request: Request<Body>) -> Response {
        app.clone().oneshot(request).await.unwrap()
    }

    async fn json_body(response: Response) -> Value {
        let body = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&body).unwrap()
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn multipart(field: &str, content: &[u8]) -> Request<Body> {
        let boundary = "X-INVOICE-BOUNDARY";
        let mut body = format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"{field}\"; \
             filename=\"invoice.png\"\r\nContent-Type: image/png\r\n\r\n"
        )
        .into_bytes();
        body.extend_from_slice(content);
        body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

        Request::builder()
            .method("POST")
            .uri("/submissions/upload")
            .header(
                "Content-Type",
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health_reports_explicit_embedded_store() {
        let dir = TempDir::new().unwrap();
        let app = test_app(&dir, Arc::new(DisabledRecognizer));

        let response = send(&app, get_request("/health")).await;

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["db"]["backend"], "fallback");
        assert_eq!(body["db"]["mode"], "explicit");
    }

    #[tokio::test]
    async fn test_create_get_and_list() {
        let dir = TempDir::new().unwrap();
        let app = test_app(&dir, Arc::new(DisabledRecognizer));

        let response = send(
            &app,
            post_json(
                "/submissions",
                json!({"image_url": "https://img/1.png", "extracted_data": {"total": "12.50"}}),
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let created = json_body(response).await;
        assert_eq!(created["status"], "pending_review");
        assert_eq!(created["extracted_data"], json!({"total": "12.50"}));

        let id = created["id"].as_str().unwrap();
        let response = send(&app, get_request(&format!("/submissions/{id}"))).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await, created);

        let response = send(&app, get_request("/submissions")).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await, json!([created]));

        let response = send(&app, get_request("/submissions?status=approved")).await;
        assert_eq!(json_body(response).await, json!([]));
    }

    #[tokio::test]
    async fn test_create_without_extracted_data() {
        let dir = TempDir::new().unwrap();
        let app = test_app(&dir, Arc::new(DisabledRecognizer));

        let response = send(&app, post_json("/submissions", json!({"image_url": "a"}))).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["extracted_data"], json!({}));
    }

    #[tokio::test]
    async fn test_get_missing_submission() {
        let dir = TempDir::new().unwrap();
        let app = test_app(&dir, Arc::new(DisabledRecognizer));

        let response = send(&app, get_request("/submissions/nope")).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            json_body(response).await,
            json!({"detail": "Submission not found: nope"})
        );
    }

    #[tokio::test]
    async fn test_list_rejects_unknown_status() {
        let dir = TempDir::new().unwrap();
        let app = test_app(&dir, Arc::new(DisabledRecognizer));

        let response = send(&app, get_request("/submissions?status=archived")).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(json_body(response).await["detail"].is_string());
    }

    #[tokio::test]
    async fn test_approve_flow() {
        let dir = TempDir::new().unwrap();
        let app = test_app(&dir, Arc::new(DisabledRecognizer));

        let response = send(&app, post_json("/submissions", json!({"image_url": "a"}))).await;
        let id = json_body(response).await["id"].as_str().unwrap().to_string();

        let items = json!({"items": [
            {"description": "Widget", "quantity": 2, "amount": 10.5, "confidence": 0.9},
            {"description": null}
        ]});
        let response = send(&app, post_json(&format!("/submissions/{id}/approve"), items.clone())).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            json_body(response).await,
            json!({"status": "approved", "submission_id": id})
        );

        let response = send(&app, post_json(&format!("/submissions/{id}/approve"), items)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            json_body(response).await,
            json!({"detail": format!("Submission already approved: {id}")})
        );

        let response = send(&app, get_request(&format!("/submissions/{id}/items"))).await;
        let stored = json_body(response).await;
        assert_eq!(stored.as_array().unwrap().len(), 2);
        assert_eq!(stored[0]["description"], "Widget");

        let response = send(&app, get_request("/submissions?status=approved")).await;
        assert_eq!(json_body(response).await.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_approve_missing_submission() {
        let dir = TempDir::new().unwrap();
        let app = test_app(&dir, Arc::new(DisabledRecognizer));

        let response = send(
            &app,
            post_json("/submissions/ghost/approve", json!({"items": []})),
        )
        .await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_approve_while_store_locked_is_internal_error() {
        let dir = TempDir::new().unwrap();
        let app = test_app(&dir, Arc::new(DisabledRecognizer));

        let response = send(&app, post_json("/submissions", json!({"image_url": "a"}))).await;
        let id = json_body(response).await["id"].as_str().unwrap().to_string();

        let writer = rusqlite::Connection::open(dir.path().join("store.db")).unwrap();
        writer.execute_batch("BEGIN IMMEDIATE").unwrap();

        let items = json!({"items": [{"description": "Widget"}]});
        let response = send(&app, post_json(&format!("/submissions/{id}/approve"), items)).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let detail = json_body(response).await["detail"].as_str().unwrap().to_string();
        assert!(detail.starts_with("Approval failed"), "{detail}");

        writer.execute_batch("ROLLBACK").unwrap();
        drop(writer);

        let response = send(&app, get_request(&format!("/submissions/{id}"))).await;
        assert_eq!(json_body(response).await["status"], "pending_review");
        let response = send(&app, get_request(&format!("/submissions/{id}/items"))).await;
        assert_eq!(json_body(response).await, json!([]));
    }

    #[tokio::test]
    async fn test_upload_stores_recognized_text() {
        let dir = TempDir::new().unwrap();
        let app = test_app(&dir, Arc::new(FixedRecognizer("Total: 42.00")));

        let response = send(&app, multipart("file", b"\x89PNG fake image")).await;

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["image_url"], "uploaded_file");
        assert_eq!(body["status"], "pending_review");
        assert_eq!(
            body["extracted_data"],
            json!({"ocr": {
                "raw_text": "Total: 42.00",
                "engine": "microsoft/trocr-base-handwritten",
                "scope": "key_fields"
            }})
        );
    }

    #[tokio::test]
    async fn test_upload_without_file_field() {
        let dir = TempDir::new().unwrap();
        let app = test_app(&dir, Arc::new(FixedRecognizer("unused")));

        let response = send(&app, multipart("image", b"bytes")).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_upload_recognition_failure() {
        let dir = TempDir::new().unwrap();
        let app = test_app(&dir, Arc::new(DisabledRecognizer));

        let response = send(&app, multipart("file", b"bytes")).await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let detail = json_body(response).await["detail"]
            .as_str()
            .unwrap()
            .to_string();
        assert!(detail.starts_with("Upload failed: "));
    }

    #[tokio::test]
    async fn test_cors_preflight_allows_dev_origin() {
        let dir = TempDir::new().unwrap();
        let app = test_app(&dir, Arc::new(DisabledRecognizer));

        let response = send(
            &app,
            Request::builder()
                .method("OPTIONS")
                .uri("/submissions")
                .header("Origin", "http://localhost:5173")
                .header("Access-Control-Request-Method", "POST")
                .body(Body::empty())
                .unwrap(),
        )
        .await;

        assert_eq!(
            response
                .headers()
                .get("access-control-allow-origin")
                .unwrap(),
            "http://localhost:5173"
        );
    }
}
