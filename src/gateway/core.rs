use std::time::Duration;

use anyhow::{Error, Result};
use reqwest::{Response, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use thiserror::Error;

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq)]
pub enum Role {
    #[serde(rename = "system")]
    System,
    #[serde(rename = "assistant")]
    Assistant,
    #[serde(rename = "user")]
    User,
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct ImageUrl {
    pub url: String,
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
#[serde(tag = "type")]
pub enum ContentPart {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(rename = "image_url")]
    ImageUrl { image_url: ImageUrl },
}

// Plain text is sent as a bare string. Messages with images use the
// multi-part form: the text first, then one part per image.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
#[serde(untagged)]
pub enum Content {
    Text(String),
    Parts(Vec<ContentPart>),
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct Message {
    pub role: Role,
    pub content: Content,
}

impl Message {
    pub fn new(role: Role, content: &str) -> Self {
        Message {
            role,
            content: Content::Text(content.to_string()),
        }
    }

    /// Build a message carrying inline images. Without images this is
    /// the same as `Message::new`.
    pub fn new_with_images(role: Role, content: &str, images: &[String]) -> Self {
        if images.is_empty() {
            return Message::new(role, content);
        }
        let mut parts = vec![ContentPart::Text {
            text: content.to_string(),
        }];
        parts.extend(images.iter().map(|url| ContentPart::ImageUrl {
            image_url: ImageUrl { url: url.clone() },
        }));
        Message {
            role,
            content: Content::Parts(parts),
        }
    }
}

/// Failures reported by the gateway itself. Rate limit and quota
/// errors are kept distinct so callers can tell users what happened.
#[derive(Error, Debug, PartialEq)]
pub enum GatewayError {
    #[error("تم تجاوز حد الطلبات، يرجى المحاولة لاحقاً")]
    RateLimited,

    #[error("يرجى إضافة رصيد إلى حسابك")]
    PaymentRequired,

    #[error("Gateway returned {status}: {body}")]
    Upstream { status: u16, body: String },
}

/// Pass a successful response through, otherwise read the body and
/// turn the status into a `GatewayError`.
pub async fn check_response(response: Response) -> Result<Response, Error> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    match status {
        StatusCode::TOO_MANY_REQUESTS => Err(GatewayError::RateLimited.into()),
        StatusCode::PAYMENT_REQUIRED => Err(GatewayError::PaymentRequired.into()),
        _ => {
            let body = response.text().await.unwrap_or_default();
            tracing::error!("AI gateway error: {} {}", status, body);
            Err(GatewayError::Upstream {
                status: status.as_u16(),
                body,
            }
            .into())
        }
    }
}

fn completions_url(api_hostname: &str) -> String {
    format!("{}/v1/chat/completions", api_hostname.trim_end_matches("/"))
}

/// Request a single buffered completion.
pub async fn completion(
    messages: &[Message],
    api_hostname: &str,
    api_key: &str,
    model: &str,
) -> Result<Value, Error> {
    let payload = json!({
        "model": model,
        "messages": messages,
    });
    let response = reqwest::Client::new()
        .post(completions_url(api_hostname))
        .bearer_auth(api_key)
        .header("Content-Type", "application/json")
        .timeout(Duration::from_secs(60 * 5))
        .json(&payload)
        .send()
        .await?;

    let response = check_response(response).await?.json().await?;

    Ok(response)
}

/// Request a streamed completion. The body is left unread so it can be
/// relayed as is.
pub async fn completion_stream(
    messages: &[Message],
    api_hostname: &str,
    api_key: &str,
    model: &str,
) -> Result<Response, Error> {
    let payload = json!({
        "model": model,
        "messages": messages,
        "stream": true,
    });
    let response = reqwest::Client::new()
        .post(completions_url(api_hostname))
        .bearer_auth(api_key)
        .header("Content-Type", "application/json")
        .json(&payload)
        .send()
        .await?;

    check_response(response).await
}
