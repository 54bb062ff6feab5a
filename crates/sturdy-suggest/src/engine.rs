use async_trait::async_trait;
use llm::builder::{LLMBackend, LLMBuilder};
use llm::chat::ChatMessage;
use serde::{Deserialize, Serialize};

use sturdy_core::AiSettings;

pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_MAX_TOKENS: u32 = 400;

#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    #[error("AI provider is not configured: {0}")]
    NotConfigured(String),
    #[error("unknown provider: {0}")]
    UnknownProvider(String),
    #[error("build LLM: {0}")]
    Build(String),
    #[error("chat: {0}")]
    Request(String),
    #[error("upstream returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("LLM returned no text")]
    Empty,
}

impl GenerateError {
    /// Configuration problems are the caller's to fix; the rest are upstream failures.
    pub fn is_configuration(&self) -> bool {
        matches!(self, GenerateError::NotConfigured(_) | GenerateError::UnknownProvider(_))
    }
}

/// One round trip to a hosted chat model: system + user in, reply text out.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    async fn complete(&self, system: &str, user_msg: &str) -> Result<String, GenerateError>;
}

/// Pick the backend for the configured provider.
pub fn backend_for(settings: &AiSettings) -> Box<dyn CompletionBackend> {
    match settings.provider.as_str() {
        "openai-compatible" => Box::new(ChatCompletionsBackend::new(settings.clone())),
        _ => Box::new(LlmBackend::new(settings.clone())),
    }
}

fn ensure_configured(settings: &AiSettings) -> Result<(), GenerateError> {
    if sturdy_core::ai_configured(settings) {
        Ok(())
    } else if settings.provider.is_empty() {
        Err(GenerateError::NotConfigured("no provider set".to_string()))
    } else {
        Err(GenerateError::NotConfigured(format!(
            "missing model, API key or base URL for {}",
            settings.provider
        )))
    }
}

fn non_empty(text: Option<String>) -> Result<String, GenerateError> {
    match text {
        Some(text) if !text.trim().is_empty() => Ok(text),
        _ => Err(GenerateError::Empty),
    }
}

// --- llm crate ---

fn map_backend(provider: &str) -> Result<LLMBackend, GenerateError> {
    match provider {
        "openai" => Ok(LLMBackend::OpenAI),
        "anthropic" => Ok(LLMBackend::Anthropic),
        "google" => Ok(LLMBackend::Google),
        "ollama" => Ok(LLMBackend::Ollama),
        "groq" => Ok(LLMBackend::Groq),
        "mistral" => Ok(LLMBackend::Mistral),
        "deepseek" => Ok(LLMBackend::DeepSeek),
        other => Err(GenerateError::UnknownProvider(other.to_string())),
    }
}

/// Hosted providers through the `llm` crate.
pub struct LlmBackend {
    settings: AiSettings,
}

impl LlmBackend {
    pub fn new(settings: AiSettings) -> Self {
        Self { settings }
    }
}

#[async_trait]
impl CompletionBackend for LlmBackend {
    async fn complete(&self, system: &str, user_msg: &str) -> Result<String, GenerateError> {
        let settings = &self.settings;
        ensure_configured(settings)?;
        let backend = map_backend(&settings.provider)?;

        let mut builder = LLMBuilder::new()
            .backend(backend)
            .model(&settings.model)
            .system(system)
            .temperature(settings.temperature.unwrap_or(DEFAULT_TEMPERATURE))
            .max_tokens(settings.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS));

        if !settings.api_key.is_empty() {
            builder = builder.api_key(&settings.api_key);
        }
        if let Some(url) = settings.base_url.as_deref().filter(|u| !u.is_empty()) {
            builder = builder.base_url(url);
        }

        let llm = builder.build().map_err(|e| GenerateError::Build(e.to_string()))?;

        let messages = vec![ChatMessage::user().content(user_msg).build()];

        let response = llm
            .chat(&messages)
            .await
            .map_err(|e| GenerateError::Request(e.to_string()))?;

        non_empty(response.text())
    }
}

// --- OpenAI-compatible chat completions over plain HTTP ---

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct WireMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Any server speaking `POST /chat/completions` (LM Studio, vLLM, proxies).
pub struct ChatCompletionsBackend {
    settings: AiSettings,
    client: reqwest::Client,
}

impl ChatCompletionsBackend {
    pub fn new(settings: AiSettings) -> Self {
        Self {
            settings,
            client: reqwest::Client::new(),
        }
    }

    fn endpoint(&self) -> String {
        let base = self.settings.base_url.as_deref().unwrap_or_default();
        format!("{}/chat/completions", base.trim_end_matches('/'))
    }
}

#[async_trait]
impl CompletionBackend for ChatCompletionsBackend {
    async fn complete(&self, system: &str, user_msg: &str) -> Result<String, GenerateError> {
        let settings = &self.settings;
        ensure_configured(settings)?;

        let body = ChatCompletionRequest {
            model: &settings.model,
            messages: vec![
                WireMessage {
                    role: "system",
                    content: system,
                },
                WireMessage {
                    role: "user",
                    content: user_msg,
                },
            ],
            temperature: settings.temperature.unwrap_or(DEFAULT_TEMPERATURE),
            max_tokens: settings.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
        };

        let mut request = self.client.post(self.endpoint()).json(&body);
        if !settings.api_key.is_empty() {
            request = request.bearer_auth(&settings.api_key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| GenerateError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GenerateError::Status {
                status: status.as_u16(),
                body: sturdy_core::sanitize::truncate_chars(&body, 500).to_string(),
            });
        }

        let parsed: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| GenerateError::Request(e.to_string()))?;

        non_empty(parsed.choices.into_iter().next().and_then(|c| c.message.content))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_known_providers() {
        assert!(map_backend("anthropic").is_ok());
        assert!(matches!(
            map_backend("clippy"),
            Err(GenerateError::UnknownProvider(p)) if p == "clippy"
        ));
    }

    #[tokio::test]
    async fn unconfigured_backends_fail_fast() {
        let backend = backend_for(&AiSettings::default());
        let err = backend.complete("sys", "user").await.unwrap_err();
        assert!(err.is_configuration());

        let keyless = AiSettings {
            provider: "openai".into(),
            model: "gpt-4o-mini".into(),
            ..Default::default()
        };
        let err = backend_for(&keyless).complete("sys", "user").await.unwrap_err();
        assert!(matches!(err, GenerateError::NotConfigured(_)));

        let no_url = AiSettings {
            provider: "openai-compatible".into(),
            model: "local".into(),
            ..Default::default()
        };
        let err = backend_for(&no_url).complete("sys", "user").await.unwrap_err();
        assert!(matches!(err, GenerateError::NotConfigured(_)));
    }

    /// Serve one canned HTTP response on a local port and return the base URL.
    async fn serve_once(status_line: &'static str, body: &'static str) -> String {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            // Drain the request so the client sees a clean response, not a reset
            let mut buf = Vec::new();
            let mut chunk = [0u8; 4096];
            loop {
                let n = socket.read(&mut chunk).await.unwrap();
                if n == 0 {
                    break;
                }
                buf.extend_from_slice(&chunk[..n]);
                let text = String::from_utf8_lossy(&buf);
                if let Some(head_end) = text.find("\r\n\r\n") {
                    let content_length = text[..head_end]
                        .lines()
                        .find_map(|l| {
                            let (name, value) = l.split_once(':')?;
                            name.eq_ignore_ascii_case("content-length")
                                .then(|| value.trim().parse::<usize>().ok())
                                .flatten()
                        })
                        .unwrap_or(0);
                    if buf.len() >= head_end + 4 + content_length {
                        break;
                    }
                }
            }
            let response = format!(
                "{status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
        });
        format!("http://{addr}/v1")
    }

    fn local_settings(base_url: String) -> AiSettings {
        AiSettings {
            provider: "openai-compatible".into(),
            model: "local-model".into(),
            base_url: Some(base_url),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn chat_completions_non_success_status_is_an_error() {
        let base = serve_once("HTTP/1.1 503 Service Unavailable", "overloaded").await;
        let backend = ChatCompletionsBackend::new(local_settings(base));

        let err = backend.complete("sys", "user").await.unwrap_err();
        match err {
            GenerateError::Status { status, body } => {
                assert_eq!(status, 503);
                assert_eq!(body, "overloaded");
            }
            other => panic!("expected status error, got {other:?}"),
        }
        assert!(!GenerateError::Status { status: 503, body: String::new() }.is_configuration());
    }

    #[tokio::test]
    async fn chat_completions_success_returns_content() {
        let base = serve_once(
            "HTTP/1.1 200 OK",
            r#"{"choices":[{"message":{"role":"assistant","content":"Validation: ok"}}]}"#,
        )
        .await;
        let backend = backend_for(&local_settings(base));
        assert_eq!(backend.complete("sys", "user").await.unwrap(), "Validation: ok");
    }

    #[test]
    fn endpoint_joins_base_url() {
        let backend = ChatCompletionsBackend::new(AiSettings {
            base_url: Some("http://localhost:1234/v1/".into()),
            ..Default::default()
        });
        assert_eq!(backend.endpoint(), "http://localhost:1234/v1/chat/completions");
    }

    #[test]
    fn wire_format() {
        let body = ChatCompletionRequest {
            model: "m",
            messages: vec![WireMessage {
                role: "system",
                content: "s",
            }],
            temperature: 0.5,
            max_tokens: 10,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["max_tokens"], 10);

        let reply: ChatCompletionResponse = serde_json::from_str(
            r#"{"choices":[{"message":{"role":"assistant","content":"Validation: ok"}}]}"#,
        )
        .unwrap();
        assert_eq!(
            non_empty(reply.choices.into_iter().next().and_then(|c| c.message.content)).unwrap(),
            "Validation: ok"
        );
        assert!(matches!(non_empty(Some("  ".into())), Err(GenerateError::Empty)));
    }
}
