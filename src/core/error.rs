//! 错误类型
//!
//! 启动期错误（配置缺失、分类器产物不一致）是致命的，只在启动时出现一次；
//! 会话期错误只在对话 / 测验生成失败时返回给展示层，协作方的其它失败都在调用点降级。

use thiserror::Error;

use crate::classifier::ClassifierError;

/// 启动期致命错误：出现即停止，不处理任何请求
#[derive(Error, Debug)]
pub enum StartupError {
    #[error("Config load failed: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Missing required setting: {0}")]
    MissingSecret(&'static str),

    #[error("Classifier artifacts rejected: {0}")]
    Classifier(#[from] ClassifierError),
}

/// 会话动作的失败（状态已按规则保留，错误仅用于提示用户）
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// 生成服务不可用；对话记录中保留了用户消息
    #[error("Tutor reply unavailable, please try again")]
    ChatUnavailable,

    /// 生成服务不可用；测验内容已被清空
    #[error("Quiz generation failed, please try again")]
    QuizUnavailable,
}
