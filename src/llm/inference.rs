//! Remote text generation against the Gemini `generateContent` API

use crate::config::ServiceConfig;
use crate::error::{IcpError, Result};
use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde::{Deserialize, Serialize};

#[cfg(test)]
use mockall::automock;

/// A hosted model that turns a prompt into text.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait GenerativeModel: Send + Sync {
    fn model_name(&self) -> String;

    async fn generate(&self, api_key: &str, prompt: &str) -> Result<String>;
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<RequestContent<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    role: &'a str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

impl GenerateContentResponse {
    /// Joins the text parts of the first candidate.
    fn text(&self) -> Option<String> {
        let parts = &self.candidates.first()?.content.as_ref()?.parts;
        let text: String = parts.iter().filter_map(|p| p.text.as_deref()).collect();
        if text.trim().is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

fn request_body(prompt: &str) -> GenerateContentRequest<'_> {
    GenerateContentRequest {
        contents: vec![RequestContent {
            role: "user",
            parts: vec![RequestPart { text: prompt }],
        }],
    }
}

fn error_message(body: String) -> String {
    serde_json::from_str::<ApiError>(&body)
        .map(|e| e.error.message)
        .unwrap_or(body)
}

fn parse_response(body: &str) -> Result<String> {
    let response: GenerateContentResponse = serde_json::from_str(body)
        .map_err(|e| IcpError::remote(format!("malformed response: {}", e)))?;
    response
        .text()
        .ok_or_else(|| IcpError::remote("empty response"))
}

/// Gemini client. Holds no credential; the key is supplied per call.
#[derive(Clone)]
pub struct GeminiModel {
    client: Client,
    base_url: String,
    model: String,
}

impl GeminiModel {
    pub fn new(settings: &ServiceConfig) -> Result<Self> {
        let client = Client::builder().build()?;
        Ok(Self {
            client,
            base_url: settings.api_base_url.trim_end_matches('/').to_string(),
            model: settings.model.clone(),
        })
    }

    pub fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }
}

#[async_trait]
impl GenerativeModel for GeminiModel {
    fn model_name(&self) -> String {
        self.model.clone()
    }

    async fn generate(&self, api_key: &str, prompt: &str) -> Result<String> {
        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", api_key)
            .json(&request_body(prompt))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(IcpError::RemoteService {
                status: Some(status.as_u16()),
                message: error_message(body),
            });
        }

        debug!("{} answered with {} bytes", self.model, body.len());
        parse_response(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serves a single canned HTTP response and returns the raw request.
    async fn serve_once(listener: TcpListener, status: &'static str, body: &'static str) -> String {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut request = Vec::new();
        let mut buf = [0u8; 4096];
        loop {
            let n = socket.read(&mut buf).await.unwrap();
            request.extend_from_slice(&buf[..n]);
            if n == 0 || request_complete(&request) {
                break;
            }
        }

        let response = format!(
            "HTTP/1.1 {}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        String::from_utf8_lossy(&request).into_owned()
    }

    fn request_complete(request: &[u8]) -> bool {
        let text = String::from_utf8_lossy(request);
        let Some(header_end) = text.find("\r\n\r\n") else {
            return false;
        };
        let length = text[..header_end]
            .lines()
            .find_map(|line| {
                let line = line.to_ascii_lowercase();
                line.strip_prefix("content-length:")
                    .map(|v| v.trim().parse::<usize>().unwrap_or(0))
            })
            .unwrap_or(0);
        request.len() >= header_end + 4 + length
    }

    async fn local_model() -> (GeminiModel, TcpListener) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let mut settings = Config::default().service;
        settings.api_base_url = format!("http://{}/v1beta", listener.local_addr().unwrap());
        (GeminiModel::new(&settings).unwrap(), listener)
    }

    #[tokio::test]
    async fn test_generate_surfaces_api_error_with_status() {
        let (model, listener) = local_model().await;
        let server = tokio::spawn(serve_once(
            listener,
            "400 Bad Request",
            r#"{"error": {"code": 400, "message": "API key not valid.", "status": "INVALID_ARGUMENT"}}"#,
        ));

        let err = model.generate("test-key", "ping").await.unwrap_err();
        let request = server.await.unwrap();

        match err {
            IcpError::RemoteService { status, message } => {
                assert_eq!(status, Some(400));
                assert_eq!(message, "API key not valid.");
            }
            other => panic!("expected a remote service error, got {other:?}"),
        }
        assert!(request.starts_with("POST /v1beta/models/gemini-2.5-flash:generateContent HTTP/1.1"));
        assert!(request.to_ascii_lowercase().contains("x-goog-api-key: test-key"));
        assert!(request.contains(r#"{"contents":[{"role":"user","parts":[{"text":"ping"}]}]}"#));
    }

    #[tokio::test]
    async fn test_generate_returns_candidate_text() {
        let (model, listener) = local_model().await;
        let server = tokio::spawn(serve_once(
            listener,
            "200 OK",
            r#"{"candidates": [{"content": {"role": "model", "parts": [{"text": "Fit Status: Fit"}]}}]}"#,
        ));

        let text = model.generate("test-key", "prompt").await.unwrap();
        server.await.unwrap();
        assert_eq!(text, "Fit Status: Fit");
    }

    #[test]
    fn test_endpoint_uses_model_and_base_url() {
        let mut settings = Config::default().service;
        settings.api_base_url = "http://localhost:9000/v1beta/".to_string();
        let model = GeminiModel::new(&settings).unwrap();
        assert_eq!(
            model.endpoint(),
            "http://localhost:9000/v1beta/models/gemini-2.5-flash:generateContent"
        );
        assert_eq!(model.model_name(), "gemini-2.5-flash");
    }

    #[test]
    fn test_request_body_shape() {
        let body = serde_json::to_value(request_body("ping")).unwrap();
        assert_eq!(
            body,
            serde_json::json!({"contents": [{"role": "user", "parts": [{"text": "ping"}]}]})
        );
    }

    #[test]
    fn test_response_text_joins_parts_of_first_candidate() {
        let body = r#"{
            "candidates": [
                {"content": {"role": "model", "parts": [{"text": "Fit Status: Fit\n"}, {"text": "Reason: strong backend."}]}},
                {"content": {"role": "model", "parts": [{"text": "ignored"}]}}
            ],
            "usageMetadata": {"promptTokenCount": 12}
        }"#;
        assert_eq!(
            parse_response(body).unwrap(),
            "Fit Status: Fit\nReason: strong backend."
        );
    }

    #[test]
    fn test_response_without_text_is_remote_error() {
        let err = parse_response(r#"{"candidates": []}"#).unwrap_err();
        assert_eq!(err.to_string(), "Remote service error: empty response");

        let err = parse_response("<html>bad gateway</html>").unwrap_err();
        assert!(matches!(err, IcpError::RemoteService { status: None, .. }));
    }

    #[test]
    fn test_error_message_prefers_api_error_body() {
        let body = r#"{"error": {"code": 400, "message": "API key not valid.", "status": "INVALID_ARGUMENT"}}"#;
        assert_eq!(error_message(body.to_string()), "API key not valid.");
        assert_eq!(error_message("upstream down".to_string()), "upstream down");
    }
}
