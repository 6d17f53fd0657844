use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8000";

/// Why an exchange with the chat backend produced no reply
#[derive(Error, Debug)]
pub enum ChatError {
    #[error("could not reach chat backend: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("chat backend returned status {0}")]
    Status(StatusCode),

    #[error("chat backend sent an unreadable reply: {0}")]
    Malformed(#[source] reqwest::Error),

    #[error("exchange ended before a reply arrived")]
    Interrupted,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    message: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    response: String,
}

#[derive(Clone)]
pub struct ChatClient {
    client: Client,
    base_url: String,
}

impl ChatClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// One best-effort round trip: no retry, no timeout beyond the transport's own.
    pub async fn send(&self, message: &str) -> Result<String, ChatError> {
        let url = format!("{}/chat", self.base_url);

        let response = self
            .client
            .post(&url)
            .json(&ChatRequest { message })
            .send()
            .await
            .map_err(ChatError::Transport)?;

        if !response.status().is_success() {
            return Err(ChatError::Status(response.status()));
        }

        // A body without a string `response` field is treated like any other failure
        let reply: ChatResponse = response.json().await.map_err(ChatError::Malformed)?;
        Ok(reply.response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn posts_message_and_returns_response_field() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat"))
            .and(header("content-type", "application/json"))
            .and(body_json(serde_json::json!({ "message": "hello" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "response": "You said: hello",
                "extra": 42
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = ChatClient::new(&server.uri());
        let reply = client.send("hello").await.unwrap();
        assert_eq!(reply, "You said: hello");
    }

    #[tokio::test]
    async fn error_status_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let err = ChatClient::new(&server.uri()).send("hi").await.unwrap_err();
        assert!(matches!(err, ChatError::Status(s) if s == StatusCode::SERVICE_UNAVAILABLE));
    }

    #[tokio::test]
    async fn missing_response_field_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "reply": "nope" })),
            )
            .mount(&server)
            .await;

        let err = ChatClient::new(&server.uri()).send("hi").await.unwrap_err();
        assert!(matches!(err, ChatError::Malformed(_)));
    }

    #[tokio::test]
    async fn unreachable_backend_is_transport_error() {
        // Nothing listens on port 1
        let err = ChatClient::new("http://127.0.0.1:1").send("hi").await.unwrap_err();
        assert!(matches!(err, ChatError::Transport(_)));
    }

    #[test]
    fn trailing_slash_is_trimmed() {
        let client = ChatClient::new("http://localhost:8000/");
        assert_eq!(client.base_url(), "http://localhost:8000");
    }
}
