//! 生成服务抽象
//!
//! 所有后端（OpenAI 兼容 / Mock）实现 LlmClient。失败在客户端内部记录并降级为 None，
//! 调用方只需区分「有文本」与「不可用」，不会收到异常。

use async_trait::async_trait;
use thiserror::Error;

use crate::memory::Message;

/// 计划正文生成不可用时使用的占位文本
pub const UNAVAILABLE: &str = "Content unavailable.";

/// 生成调用失败的原因（仅用于日志）
#[derive(Error, Debug)]
pub enum LlmError {
    #[error("request timed out after {0}s")]
    Timeout(u64),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("response has no message content")]
    EmptyResponse,
}

/// 生成客户端 trait：按角色顺序的消息 -> 首条 completion 文本
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// 单次调用，不重试；超时、非 2xx、传输错误、响应无内容均返回 None
    async fn complete(&self, messages: &[Message]) -> Option<String>;

    /// 模型名（用于日志与展示）
    fn model(&self) -> &str {
        "unknown"
    }
}
