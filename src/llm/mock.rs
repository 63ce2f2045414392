//! Mock 生成客户端（用于测试与离线演示，无需 API）
//!
//! 按脚本依次返回预设回复（None 模拟调用失败）；脚本用完后回显最后一条 User 消息。
//! 每次调用的消息序列都会记录下来，便于断言上下文组装。

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::llm::LlmClient;
use crate::memory::{Message, Role};

#[derive(Debug, Default)]
pub struct MockLlmClient {
    script: Mutex<VecDeque<Option<String>>>,
    calls: Mutex<Vec<Vec<Message>>>,
    always_fail: bool,
}

impl MockLlmClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// 依次返回给定回复
    pub fn with_replies<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            script: Mutex::new(replies.into_iter().map(|r| Some(r.into())).collect()),
            ..Self::default()
        }
    }

    /// 每次调用都失败（模拟超时 / 非 2xx）
    pub fn failing() -> Self {
        Self {
            always_fail: true,
            ..Self::default()
        }
    }

    /// 追加一次失败
    pub fn push_failure(&self) {
        if let Ok(mut script) = self.script.lock() {
            script.push_back(None);
        }
    }

    pub fn push_reply(&self, reply: impl Into<String>) {
        if let Ok(mut script) = self.script.lock() {
            script.push_back(Some(reply.into()));
        }
    }

    /// 已发生的调用（每次调用的完整消息序列）
    pub fn calls(&self) -> Vec<Vec<Message>> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().map(|c| c.len()).unwrap_or(0)
    }
}

#[async_trait]
impl LlmClient for MockLlmClient {
    async fn complete(&self, messages: &[Message]) -> Option<String> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(messages.to_vec());
        }
        if self.always_fail {
            return None;
        }
        if let Some(next) = self.script.lock().ok().and_then(|mut s| s.pop_front()) {
            return next;
        }

        let last_user = messages
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .map(|m| m.content.as_str())
            .unwrap_or("(no input)");
        Some(format!("Echo from Mock: {}", last_user))
    }

    fn model(&self) -> &str {
        "mock"
    }
}
