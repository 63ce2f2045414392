//! 对话 / 测验上下文组装
//!
//! 对话：system（辅导身份）+ assistant（计划正文作为依据）+ 完整对话记录，每轮全量回放。
//! 测验：单条 user 消息，包含主题与正文前 1000 个字符。

use crate::memory::{ChatTranscript, Message};
use crate::plan::Plan;

/// 测验提示词中引用的正文长度（字符数）
pub const QUIZ_EXCERPT_CHARS: usize = 1000;
/// 测验题目数量
pub const QUIZ_QUESTIONS: usize = 3;

pub fn chat_messages(plan: &Plan, transcript: &ChatTranscript) -> Vec<Message> {
    let mut messages = Vec::with_capacity(transcript.len() + 2);
    messages.push(Message::system(format!(
        "You are a helpful tutor for the topic: {}. Keep answers concise and educational.",
        plan.topic()
    )));
    messages.push(Message::assistant(plan.text()));
    messages.extend(transcript.turns().iter().cloned());
    messages
}

pub fn quiz_messages(plan: &Plan) -> Vec<Message> {
    let prompt = format!(
        "Create a quiz for: {topic} based on this text:\n\
         {excerpt}...\n\n\
         Generate {n} multiple choice questions.\n\
         Format clearly with Question, Options, and Correct Answer hidden or at the bottom.",
        topic = plan.topic(),
        excerpt = excerpt(plan.text(), QUIZ_EXCERPT_CHARS),
        n = QUIZ_QUESTIONS,
    );
    vec![Message::user(prompt)]
}

/// 按字符截取，避免切断多字节字符
fn excerpt(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_excerpt_is_char_safe() {
        let text = "光合作用".repeat(400);
        let cut = excerpt(&text, QUIZ_EXCERPT_CHARS);
        assert_eq!(cut.chars().count(), QUIZ_EXCERPT_CHARS);
        assert_eq!(excerpt("short", 10), "short");
    }
}
