use std::time::Duration;

use serde::Deserialize;

#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    #[error("upstream rate limited")]
    RateLimited,
    #[error("upstream returned {code}: {body}")]
    Status { code: u16, body: String },
    #[error("transport: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("upstream reply has no text")]
    MissingText,
}

/// One prompt in, one completion out.
#[async_trait::async_trait]
pub trait Completion: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, UpstreamError>;
}

const TIMEOUT: Duration = Duration::from_secs(60);
const API_VERSION: &str = "2023-06-01";
const MAX_TOKENS: u32 = 100;
const TEMPERATURE: f32 = 0.7;

/// Anthropic Messages API client.
pub struct AnthropicClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
    api_base: String,
}

impl AnthropicClient {
    pub fn new(api_key: &str, model: &str, api_base: &str) -> Result<Self, UpstreamError> {
        let http = reqwest::Client::builder().timeout(TIMEOUT).build()?;
        Ok(Self {
            http,
            api_key: api_key.to_string(),
            model: model.to_string(),
            api_base: api_base.trim_end_matches('/').to_string(),
        })
    }
}

#[derive(Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: Option<String>,
}

#[async_trait::async_trait]
impl Completion for AnthropicClient {
    async fn complete(&self, prompt: &str) -> Result<String, UpstreamError> {
        let body = serde_json::json!({
            "model": self.model,
            "max_tokens": MAX_TOKENS,
            "temperature": TEMPERATURE,
            "messages": [{ "role": "user", "content": prompt }],
        });
        let resp = self
            .http
            .post(format!("{}/v1/messages", self.api_base))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(UpstreamError::RateLimited);
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(UpstreamError::Status {
                code: status.as_u16(),
                body,
            });
        }

        let data: MessagesResponse = resp.json().await?;
        data.content
            .into_iter()
            .next()
            .and_then(|block| block.text)
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or(UpstreamError::MissingText)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::post;
    use axum::{Json, Router};

    async fn spawn_upstream(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    #[tokio::test]
    async fn sends_headers_and_parameters() {
        let app = Router::new().route(
            "/v1/messages",
            post(|headers: HeaderMap, Json(body): Json<serde_json::Value>| async move {
                assert_eq!(headers["x-api-key"], "sk-test");
                assert_eq!(headers["anthropic-version"], API_VERSION);
                assert_eq!(body["model"], "claude-test");
                assert_eq!(body["max_tokens"], 100);
                assert_eq!(body["messages"][0]["content"], "hello");
                Json(serde_json::json!({
                    "content": [{ "type": "text", "text": "  You kept going.  " }]
                }))
            }),
        );
        let base = spawn_upstream(app).await;
        let client = AnthropicClient::new("sk-test", "claude-test", &base).unwrap();
        assert_eq!(client.complete("hello").await.unwrap(), "You kept going.");
    }

    #[tokio::test]
    async fn maps_429_to_rate_limited() {
        let app = Router::new().route(
            "/v1/messages",
            post(|| async { (StatusCode::TOO_MANY_REQUESTS, "slow down") }),
        );
        let base = spawn_upstream(app).await;
        let client = AnthropicClient::new("k", "m", &base).unwrap();
        assert!(matches!(
            client.complete("p").await.unwrap_err(),
            UpstreamError::RateLimited
        ));
    }

    #[tokio::test]
    async fn empty_content_is_missing_text() {
        let app = Router::new().route(
            "/v1/messages",
            post(|| async { Json(serde_json::json!({ "content": [] })) }),
        );
        let base = spawn_upstream(app).await;
        let client = AnthropicClient::new("k", "m", &base).unwrap();
        assert!(matches!(
            client.complete("p").await.unwrap_err(),
            UpstreamError::MissingText
        ));
    }

    #[tokio::test]
    async fn other_failures_carry_status() {
        let app = Router::new().route(
            "/v1/messages",
            post(|| async { (StatusCode::UNAUTHORIZED, "bad key") }),
        );
        let base = spawn_upstream(app).await;
        let client = AnthropicClient::new("k", "m", &base).unwrap();
        match client.complete("p").await.unwrap_err() {
            UpstreamError::Status { code, body } => {
                assert_eq!(code, 401);
                assert_eq!(body, "bad key");
            }
            other => panic!("unexpected: {other}"),
        }
    }
}
