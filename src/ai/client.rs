use crate::config::Config;
use anyhow::{Context, Result, anyhow};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Thin client for an OpenAI-compatible chat-completions endpoint. One
/// request per call, no retries: a failed call surfaces to the handler,
/// which answers with its fixed fallback string.
#[derive(Clone)]
pub struct CompletionClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

impl CompletionClient {
    pub fn from_config(config: &Config) -> Result<Self> {
        if config.openai_api_key.is_empty() {
            return Err(anyhow!("OpenAI API key not configured"));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.completion_timeout_secs))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            api_key: config.openai_api_key.clone(),
            base_url: config.openai_base_url.clone(),
            model: config.openai_model.clone(),
        })
    }

    /// Sends one system+user exchange and returns the completion text.
    pub async fn complete(&self, system: &str, user: &str, max_tokens: u32) -> Result<String> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
            temperature: 0.7,
            max_tokens,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .context("Completion request failed")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!("Completion service error {}: {}", status, body));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .context("Completion response was not valid JSON")?;

        parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| anyhow!("Completion response contained no choices"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn client_for(base_url: String) -> CompletionClient {
        CompletionClient {
            client: Client::builder()
                .timeout(Duration::from_secs(5))
                .build()
                .unwrap(),
            api_key: "test-key".to_string(),
            base_url,
            model: "test-model".to_string(),
        }
    }

    /// Answers every connection with a 500 and counts how many arrive.
    fn failing_server(hits: Arc<AtomicUsize>) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        std::thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(mut stream) = stream else { break };
                hits.fetch_add(1, Ordering::SeqCst);
                let mut buf = [0u8; 8192];
                let _ = stream.read(&mut buf);
                let _ = stream.write_all(
                    b"HTTP/1.1 500 Internal Server Error\r\n\
                      Content-Length: 0\r\n\
                      Connection: close\r\n\r\n",
                );
            }
        });

        format!("http://{}", addr)
    }

    #[actix_web::test]
    async fn upstream_error_surfaces_after_a_single_request() {
        let hits = Arc::new(AtomicUsize::new(0));
        let client = client_for(failing_server(hits.clone()));

        let err = client
            .complete("system prompt", "user prompt", 16)
            .await
            .unwrap_err();

        assert!(err.to_string().contains("500"), "got: {err}");
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }
}
