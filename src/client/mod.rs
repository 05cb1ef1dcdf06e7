//! HTTP client for the proxy endpoints, used by the chat session and
//! the command line.

use anyhow::{Error, Result};
use reqwest::Response;
use thiserror::Error;

use crate::api::public::ErrorResponse;
use crate::api::public::chat::ChatRequest;
use crate::api::public::poetry::{PoetryRequest, PoetryResponse};
use crate::chat::ChatMessage;
use crate::poetry::PoetryStyle;

#[derive(Error, Debug, PartialEq)]
pub enum ClientError {
    #[error("فشل في الاتصال بالخادم")]
    Connection,

    /// The server's own error message, passed through for display
    #[error("{0}")]
    Server(String),
}

#[derive(Clone, Debug)]
pub struct ProxyClient {
    base_url: String,
    public_key: String,
    http: reqwest::Client,
}

impl ProxyClient {
    pub fn new(base_url: &str, public_key: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            public_key: public_key.to_string(),
            http: reqwest::Client::new(),
        }
    }

    fn function_url(&self, name: &str) -> String {
        format!("{}/functions/v1/{}", self.base_url, name)
    }

    /// Start a streamed chat exchange. Only a successful response is
    /// returned; its body is the raw event stream. Errors reported by
    /// the server, such as rate or quota limits, keep the server's
    /// message.
    pub async fn chat(&self, messages: &[ChatMessage]) -> Result<Response, Error> {
        let payload = ChatRequest {
            messages: messages.to_vec(),
        };
        let response = self
            .http
            .post(self.function_url("chat"))
            .bearer_auth(&self.public_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Chat request failed: {}", e);
                ClientError::Connection
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!("Chat request failed: {} {}", status, body);
            return match serde_json::from_str::<ErrorResponse>(&body) {
                Ok(ErrorResponse { error }) => Err(ClientError::Server(error).into()),
                Err(_) => Err(ClientError::Connection.into()),
            };
        }
        if response.content_length() == Some(0) {
            return Err(ClientError::Connection.into());
        }

        Ok(response)
    }

    pub async fn generate_poetry(&self, topic: &str, style: PoetryStyle) -> Result<String, Error> {
        let payload = PoetryRequest {
            topic: Some(topic.to_string()),
            style: style.selector().map(String::from),
        };
        let response = self
            .http
            .post(self.function_url("generate-poetry"))
            .bearer_auth(&self.public_key)
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let message = match response.json::<ErrorResponse>().await {
                Ok(ErrorResponse { error }) => error,
                Err(_) => format!("Request failed with status {}", status),
            };
            return Err(ClientError::Server(message).into());
        }

        let PoetryResponse { poetry } = response.json().await?;
        Ok(poetry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::Role;
    use mockito::Matcher;
    use serde_json::json;

    #[tokio::test]
    async fn it_posts_messages_with_public_key() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/functions/v1/chat")
            .match_header("authorization", "Bearer pk")
            .match_body(Matcher::Json(json!({
                "messages": [{"role": "user", "content": "مرحبا"}]
            })))
            .with_status(200)
            .with_header("content-type", "text/event-stream")
            .with_body("data: [DONE]\n")
            .create_async()
            .await;

        let client = ProxyClient::new(&server.url(), "pk");
        let response = client
            .chat(&[ChatMessage::new(Role::User, "مرحبا")])
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(response.text().await.unwrap(), "data: [DONE]\n");
    }

    #[tokio::test]
    async fn it_surfaces_rate_limit_message_from_chat() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/functions/v1/chat")
            .with_status(429)
            .with_body(r#"{"error":"تم تجاوز حد الطلبات، يرجى المحاولة لاحقاً"}"#)
            .create_async()
            .await;

        let client = ProxyClient::new(&server.url(), "pk");
        let err = client
            .chat(&[ChatMessage::new(Role::User, "hi")])
            .await
            .unwrap_err();
        assert_eq!(
            err.downcast_ref::<ClientError>(),
            Some(&ClientError::Server(
                "تم تجاوز حد الطلبات، يرجى المحاولة لاحقاً".to_string()
            ))
        );
        assert_eq!(err.to_string(), "تم تجاوز حد الطلبات، يرجى المحاولة لاحقاً");
    }

    #[tokio::test]
    async fn it_reports_connection_failure_for_unreadable_errors() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/functions/v1/chat")
            .with_status(502)
            .with_body("Bad Gateway")
            .create_async()
            .await;

        let client = ProxyClient::new(&server.url(), "pk");
        let err = client
            .chat(&[ChatMessage::new(Role::User, "hi")])
            .await
            .unwrap_err();
        assert_eq!(
            err.downcast_ref::<ClientError>(),
            Some(&ClientError::Connection)
        );
        assert_eq!(err.to_string(), "فشل في الاتصال بالخادم");
    }

    #[tokio::test]
    async fn it_reports_connection_failure_when_unreachable() {
        let client = ProxyClient::new("http://127.0.0.1:9", "pk");
        let err = client
            .chat(&[ChatMessage::new(Role::User, "hi")])
            .await
            .unwrap_err();
        assert_eq!(
            err.downcast_ref::<ClientError>(),
            Some(&ClientError::Connection)
        );
    }

    #[tokio::test]
    async fn it_returns_generated_poetry() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/functions/v1/generate-poetry")
            .match_body(Matcher::Json(json!({"topic": "القمر", "type": "حر"})))
            .with_status(200)
            .with_body(r#"{"poetry":"يا قمر"}"#)
            .create_async()
            .await;

        let client = ProxyClient::new(&format!("{}/", server.url()), "pk");
        let poetry = client
            .generate_poetry("القمر", PoetryStyle::Free)
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(poetry, "يا قمر");
    }

    #[tokio::test]
    async fn it_surfaces_server_error_message() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/functions/v1/generate-poetry")
            .with_status(400)
            .with_body(r#"{"error":"الموضوع مطلوب"}"#)
            .create_async()
            .await;

        let client = ProxyClient::new(&server.url(), "pk");
        let err = client
            .generate_poetry("", PoetryStyle::General)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "الموضوع مطلوب");
    }
}
