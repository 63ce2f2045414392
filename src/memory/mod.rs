//! 短期记忆：消息类型与辅导对话记录

pub mod conversation;

pub use conversation::{ChatTranscript, Message, Role};
