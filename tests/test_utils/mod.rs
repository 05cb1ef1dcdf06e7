//! Test utilities for integration tests
#![allow(dead_code)]

use std::sync::{Arc, RwLock};

use axum::{Router, body::Body};

use qalam::api::AppState;
use qalam::api::app;
use qalam::core::AppConfig;

/// Configuration pointing the gateway at `gateway_url`, usually a
/// `mockito` server.
pub fn test_config(gateway_url: &str) -> AppConfig {
    AppConfig {
        storage_path: String::from("./"),
        db_path: String::from("./qalam.db"),
        gateway_api_hostname: gateway_url.to_string(),
        gateway_api_key: Some(String::from("test-gateway-key")),
        gateway_model: String::from("google/gemini-2.5-flash"),
        system_message: String::from("أنت مساعد ذكي"),
        service_url: String::from("http://127.0.0.1:2222"),
        public_key: String::from("test-public-key"),
    }
}

/// Creates a test application router for the given config.
pub fn test_app_with_config(config: AppConfig) -> Router {
    let app_state = AppState::new(config);
    app(Arc::new(RwLock::new(app_state)))
}

pub fn test_app(gateway_url: &str) -> Router {
    test_app_with_config(test_config(gateway_url))
}

pub async fn body_to_string(body: Body) -> String {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub fn post_json(uri: &str, body: serde_json::Value) -> axum::http::Request<Body> {
    axum::http::Request::builder()
        .uri(uri)
        .method("POST")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}
