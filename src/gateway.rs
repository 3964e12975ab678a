//! The completion gateway: one prompt in, the whole reply (or an error) out.
//!
//! [`CompletionGateway`] is the seam the session controller depends on.
//! [`GeminiGateway`] implements it over the [`Gemini`] HTTP client with an
//! optional retry policy. The default policy makes exactly one attempt.

use std::time::Duration;

use log::{debug, warn};

use crate::client::Gemini;
use crate::error::Result;
use crate::observability::{
    GATEWAY_COMPLETIONS, GATEWAY_FAILURES, GATEWAY_RETRIES, GATEWAY_RETRY_BACKOFF,
};
use crate::types::{GenerateContentRequest, GenerationConfig, Model};

/// Upper bound on a single backoff sleep.
const MAX_BACKOFF: Duration = Duration::from_secs(30);

/// Sends a prompt to a text-generation service and returns the full reply.
#[async_trait::async_trait]
pub trait CompletionGateway: Send + Sync {
    /// Complete `prompt`.
    ///
    /// # Errors
    ///
    /// Returns an error for transport, authentication, provider-side, or
    /// malformed-response failures. Implementations do not validate the
    /// prompt beyond what the provider enforces.
    async fn complete(&self, prompt: &str) -> Result<String>;
}

/// Retry behavior for [`GeminiGateway`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    /// Attempts after the first one; zero disables retries.
    pub max_retries: u32,
    /// Delay before the first retry; doubled for each further retry.
    pub initial_backoff: Duration,
}

impl RetryPolicy {
    /// A policy that never retries.
    pub const fn none() -> Self {
        Self {
            max_retries: 0,
            initial_backoff: Duration::from_millis(500),
        }
    }

    /// Sets the number of retries.
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Sets the initial backoff.
    pub fn with_initial_backoff(mut self, backoff: Duration) -> Self {
        self.initial_backoff = backoff;
        self
    }

    /// Delay before retry number `retry` (zero-based), honoring a
    /// server-provided `retry_after` in seconds.
    pub fn backoff(&self, retry: u32, retry_after: Option<u64>) -> Duration {
        if let Some(seconds) = retry_after {
            return Duration::from_secs(seconds).min(MAX_BACKOFF);
        }
        let factor = 2u32.saturating_pow(retry);
        self.initial_backoff.saturating_mul(factor).min(MAX_BACKOFF)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::none()
    }
}

/// A [`CompletionGateway`] backed by the Gemini `generateContent` API.
#[derive(Debug, Clone)]
pub struct GeminiGateway {
    client: Gemini,
    model: Model,
    system_instruction: Option<String>,
    generation_config: GenerationConfig,
    retry: RetryPolicy,
}

impl GeminiGateway {
    /// Creates a gateway for `model`.
    pub fn new(client: Gemini, model: Model) -> Self {
        Self {
            client,
            model,
            system_instruction: None,
            generation_config: GenerationConfig::default(),
            retry: RetryPolicy::none(),
        }
    }

    /// Sets the system instruction sent with every prompt.
    pub fn with_system_instruction(mut self, instruction: Option<String>) -> Self {
        self.system_instruction = instruction;
        self
    }

    /// Sets the generation config sent with every prompt.
    pub fn with_generation_config(mut self, config: GenerationConfig) -> Self {
        self.generation_config = config;
        self
    }

    /// Sets the retry policy.
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Returns the model this gateway talks to.
    pub fn model(&self) -> &Model {
        &self.model
    }

    /// Builds the request body for `prompt`.
    pub fn request_for(&self, prompt: &str) -> GenerateContentRequest {
        let mut request = GenerateContentRequest::from_prompt(prompt)
            .with_generation_config(self.generation_config.clone());
        if let Some(instruction) = &self.system_instruction {
            request = request.with_system_instruction(instruction.clone());
        }
        request
    }

    async fn attempt(&self, request: &GenerateContentRequest) -> Result<String> {
        self.client
            .generate_content(&self.model, request)
            .await?
            .text()
    }
}

#[async_trait::async_trait]
impl CompletionGateway for GeminiGateway {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let request = self.request_for(prompt);
        let mut retry = 0;
        loop {
            match self.attempt(&request).await {
                Ok(text) => {
                    GATEWAY_COMPLETIONS.click();
                    debug!("completion returned {} bytes", text.len());
                    return Ok(text);
                }
                Err(err) if err.is_retryable() && retry < self.retry.max_retries => {
                    let delay = self.retry.backoff(retry, err.retry_after());
                    retry += 1;
                    GATEWAY_RETRIES.click();
                    GATEWAY_RETRY_BACKOFF.add(delay.as_secs_f64());
                    warn!(
                        "completion failed ({err}); retry {retry}/{} in {}ms",
                        self.retry.max_retries,
                        delay.as_millis()
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(err) => {
                    GATEWAY_FAILURES.click();
                    warn!("completion failed: {err}");
                    return Err(err);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::types::KnownModel;
    use serde_json::{json, to_value};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};

    const REPLY: &str = r#"{"candidates":[{"content":{"role":"model","parts":[{"text":"Hi there"}]},"finishReason":"STOP"}]}"#;

    fn gateway() -> GeminiGateway {
        let client = Gemini::new(Some("test-key".to_string())).unwrap();
        GeminiGateway::new(client, Model::Known(KnownModel::Gemini15Flash))
    }

    #[test]
    fn default_policy_never_retries() {
        assert_eq!(RetryPolicy::default().max_retries, 0);
    }

    #[test]
    fn backoff_doubles_and_is_capped() {
        let policy = RetryPolicy::none().with_initial_backoff(Duration::from_millis(250));
        assert_eq!(policy.backoff(0, None), Duration::from_millis(250));
        assert_eq!(policy.backoff(1, None), Duration::from_millis(500));
        assert_eq!(policy.backoff(2, None), Duration::from_millis(1000));
        assert_eq!(policy.backoff(20, None), MAX_BACKOFF);
    }

    #[test]
    fn backoff_honors_retry_after() {
        let policy = RetryPolicy::none();
        assert_eq!(policy.backoff(0, Some(3)), Duration::from_secs(3));
        assert_eq!(policy.backoff(0, Some(3600)), MAX_BACKOFF);
    }

    #[test]
    fn request_carries_prompt_and_settings() {
        let gateway = gateway()
            .with_system_instruction(Some("Fix problems.".to_string()))
            .with_generation_config(GenerationConfig {
                temperature: None,
                max_output_tokens: Some(64),
            });
        assert_eq!(gateway.model(), &Model::Known(KnownModel::Gemini15Flash));
        assert_eq!(
            to_value(gateway.request_for("Hello")).unwrap(),
            json!({
                "contents": [{"role": "user", "parts": [{"text": "Hello"}]}],
                "systemInstruction": {"parts": [{"text": "Fix problems."}]},
                "generationConfig": {"maxOutputTokens": 64}
            })
        );
    }

    /// Reads one HTTP request, headers and body, off `stream`.
    async fn read_request(stream: &mut TcpStream) {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];
        loop {
            let n = stream.read(&mut chunk).await.unwrap();
            if n == 0 {
                return;
            }
            buf.extend_from_slice(&chunk[..n]);
            if let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                let headers = String::from_utf8_lossy(&buf[..end]).to_lowercase();
                let length = headers
                    .lines()
                    .find_map(|line| line.strip_prefix("content-length:"))
                    .and_then(|value| value.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                if buf.len() >= end + 4 + length {
                    return;
                }
            }
        }
    }

    /// Answers one connection per entry in `responses`, in order, and counts
    /// the requests served. Returns the base URL and the counter.
    async fn scripted_server(responses: Vec<(u16, &'static str)>) -> (String, Arc<AtomicUsize>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);
        tokio::spawn(async move {
            for (status, body) in responses {
                let (mut stream, _) = listener.accept().await.unwrap();
                read_request(&mut stream).await;
                counter.fetch_add(1, Ordering::SeqCst);
                let response = format!(
                    "HTTP/1.1 {status} Scripted\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                );
                stream.write_all(response.as_bytes()).await.unwrap();
                let _ = stream.shutdown().await;
            }
        });
        (format!("http://{addr}/v1beta/"), hits)
    }

    fn local_gateway(base_url: String, max_retries: u32) -> GeminiGateway {
        let client = Gemini::with_options(
            Some("test-key".to_string()),
            Some(base_url),
            Some(Duration::from_secs(5)),
        )
        .unwrap();
        GeminiGateway::new(client, Model::default()).with_retry_policy(
            RetryPolicy::none()
                .with_max_retries(max_retries)
                .with_initial_backoff(Duration::from_millis(10)),
        )
    }

    #[tokio::test]
    async fn retries_unavailable_then_succeeds() {
        let unavailable = r#"{"error":{"code":503,"message":"The model is overloaded.","status":"UNAVAILABLE"}}"#;
        let (base_url, hits) = scripted_server(vec![(503, unavailable), (200, REPLY)]).await;
        let gateway = local_gateway(base_url, 1);

        let reply = gateway.complete("Hello").await.unwrap();
        assert_eq!(reply, "Hi there");
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn unavailable_without_retries_fails_once() {
        let unavailable = r#"{"error":{"code":503,"message":"The model is overloaded.","status":"UNAVAILABLE"}}"#;
        let (base_url, hits) = scripted_server(vec![(503, unavailable), (200, REPLY)]).await;
        let gateway = local_gateway(base_url, 0);

        let err = gateway.complete("Hello").await.unwrap_err();
        assert!(err.is_server_error(), "unexpected error: {err:?}");
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn authentication_failure_is_not_retried() {
        let denied = r#"{"error":{"code":401,"message":"Request had invalid authentication credentials.","status":"UNAUTHENTICATED"}}"#;
        let (base_url, hits) = scripted_server(vec![(401, denied), (200, REPLY)]).await;
        let gateway = local_gateway(base_url, 3);

        let err = gateway.complete("Hello").await.unwrap_err();
        assert!(err.is_authentication(), "unexpected error: {err:?}");
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_a_gateway_error() {
        // Port 9 (discard) on localhost is closed in test environments.
        let client = Gemini::with_options(
            Some("test-key".to_string()),
            Some("http://127.0.0.1:9/v1beta/".to_string()),
            Some(Duration::from_secs(5)),
        )
        .unwrap();
        let gateway = GeminiGateway::new(client, Model::default());
        let err = gateway.complete("Hello").await.unwrap_err();
        assert!(err.is_connection() || err.is_timeout() || matches!(err, crate::Error::HttpClient { .. }));
    }
}
