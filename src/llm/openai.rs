//! OpenAI 兼容 API 客户端
//!
//! 通过 async_openai 调用任意 OpenAI 兼容端点（默认 OpenRouter）；Bearer Key 鉴权，
//! 固定 temperature，整体调用受超时约束。单次调用不重试：5xx / 429 第一次失败即返回。

use std::time::Duration;

use async_openai::config::OpenAIConfig;
use async_openai::types::chat::{
    ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
    ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
    CreateChatCompletionRequestArgs,
};
use async_openai::Client;
use async_trait::async_trait;
use backoff::ExponentialBackoffBuilder;

use crate::llm::{LlmClient, LlmError};
use crate::memory::{Message, Role};

/// OpenAI 兼容客户端：持有 Client、model 名、temperature 与超时
pub struct OpenAiClient {
    client: Client<OpenAIConfig>,
    model: String,
    temperature: f32,
    timeout: Duration,
}

impl OpenAiClient {
    pub fn new(base_url: &str, model: &str, api_key: &str) -> Self {
        let config = OpenAIConfig::new()
            .with_api_base(base_url)
            .with_api_key(api_key);

        // 默认客户端会对 5xx 与限流做指数退避重试；这里把重试窗口设为零
        let no_retry = ExponentialBackoffBuilder::new()
            .with_max_elapsed_time(Some(Duration::ZERO))
            .build();

        Self {
            client: Client::with_config(config).with_backoff(no_retry),
            model: model.to_string(),
            temperature: 0.7,
            timeout: Duration::from_secs(45),
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout = Duration::from_secs(timeout_secs);
        self
    }

    fn to_openai_messages(
        &self,
        messages: &[Message],
    ) -> Result<Vec<ChatCompletionRequestMessage>, LlmError> {
        let invalid = |e: async_openai::error::OpenAIError| LlmError::InvalidRequest(e.to_string());
        messages
            .iter()
            .map(|m| {
                Ok(match m.role {
                    Role::System => ChatCompletionRequestMessage::System(
                        ChatCompletionRequestSystemMessageArgs::default()
                            .content(m.content.clone())
                            .build()
                            .map_err(invalid)?,
                    ),
                    Role::User => ChatCompletionRequestMessage::User(
                        ChatCompletionRequestUserMessageArgs::default()
                            .content(m.content.clone())
                            .build()
                            .map_err(invalid)?,
                    ),
                    Role::Assistant => ChatCompletionRequestMessage::Assistant(
                        ChatCompletionRequestAssistantMessageArgs::default()
                            .content(m.content.clone())
                            .build()
                            .map_err(invalid)?,
                    ),
                })
            })
            .collect()
    }

    async fn try_complete(&self, messages: &[Message]) -> Result<String, LlmError> {
        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .temperature(self.temperature)
            .messages(self.to_openai_messages(messages)?)
            .build()
            .map_err(|e| LlmError::InvalidRequest(e.to_string()))?;

        let response = tokio::time::timeout(self.timeout, self.client.chat().create(request))
            .await
            .map_err(|_| LlmError::Timeout(self.timeout.as_secs()))?
            .map_err(|e| LlmError::ApiError(e.to_string()))?;

        response
            .choices
            .first()
            .and_then(|c| c.message.content.clone())
            .ok_or(LlmError::EmptyResponse)
    }
}

#[async_trait]
impl LlmClient for OpenAiClient {
    async fn complete(&self, messages: &[Message]) -> Option<String> {
        tracing::info!(model = %self.model, messages = messages.len(), "generation request");
        match self.try_complete(messages).await {
            Ok(text) => Some(text),
            Err(e) => {
                tracing::warn!(model = %self.model, error = %e, "generation failed");
                None
            }
        }
    }

    fn model(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// 本地 HTTP 服务：每个连接都回同一个响应，返回 base_url 与请求计数
    async fn canned_server(status: &'static str, body: &'static str) -> (String, Arc<AtomicUsize>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                counter.fetch_add(1, Ordering::SeqCst);
                read_request(&mut socket).await;
                let response = format!(
                    "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status,
                    body.len(),
                    body
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            }
        });
        (format!("http://{}", addr), hits)
    }

    /// 读完整个请求（头 + Content-Length 指定的正文），避免未读数据导致连接被重置
    async fn read_request(socket: &mut tokio::net::TcpStream) {
        let mut data = Vec::new();
        let mut chunk = [0u8; 4096];
        loop {
            let n = match socket.read(&mut chunk).await {
                Ok(0) | Err(_) => return,
                Ok(n) => n,
            };
            data.extend_from_slice(&chunk[..n]);
            let Some(header_end) = data.windows(4).position(|w| w == b"\r\n\r\n") else {
                continue;
            };
            let headers = String::from_utf8_lossy(&data[..header_end]).to_lowercase();
            let body_len = headers
                .lines()
                .find_map(|l| l.strip_prefix("content-length:"))
                .and_then(|v| v.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if data.len() >= header_end + 4 + body_len {
                return;
            }
        }
    }

    #[tokio::test]
    async fn test_server_error_is_not_retried() {
        let (base_url, hits) = canned_server(
            "500 Internal Server Error",
            r#"{"error":{"message":"upstream failed","type":"server_error","param":null,"code":null}}"#,
        )
        .await;
        let client = OpenAiClient::new(&base_url, "test-model", "key").with_timeout(5);

        let started = std::time::Instant::now();
        let result = client.complete(&[Message::user("hi")]).await;

        assert_eq!(result, None);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert!(started.elapsed() < Duration::from_secs(4));
    }

    #[tokio::test]
    async fn test_missing_content_is_unavailable() {
        let (base_url, _) = canned_server(
            "200 OK",
            r#"{"id":"cmpl-1","object":"chat.completion","created":0,"model":"test-model","choices":[{"index":0,"message":{"role":"assistant","content":null},"finish_reason":"stop"}]}"#,
        )
        .await;
        let client = OpenAiClient::new(&base_url, "test-model", "key").with_timeout(5);
        assert_eq!(client.complete(&[Message::user("hi")]).await, None);
    }

    #[tokio::test]
    async fn test_first_choice_content_returned() {
        let (base_url, _) = canned_server(
            "200 OK",
            r#"{"id":"cmpl-2","object":"chat.completion","created":0,"model":"test-model","choices":[{"index":0,"message":{"role":"assistant","content":"Chlorophyll absorbs light."},"finish_reason":"stop"}]}"#,
        )
        .await;
        let client = OpenAiClient::new(&base_url, "test-model", "key").with_timeout(5);
        assert_eq!(
            client.complete(&[Message::user("hi")]).await.as_deref(),
            Some("Chlorophyll absorbs light.")
        );
    }
}
