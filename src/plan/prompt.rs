//! 计划生成用的搜索词与提示词

use crate::memory::Message;
use crate::plan::types::{Depth, ResourceKind, Style, NO_SEARCH_RESULTS};
use crate::services::SearchResults;

/// 拼入提示词的搜索结果条数
pub const SEARCH_CONTEXT_LIMIT: usize = 5;

const PLAN_SYSTEM_PROMPT: &str = "You are an elite educational consultant. Create a learning plan. \
CRITICAL: At the very end of your response, include a JSON block with key \"resources\" \
containing a list of 4 best resources found in the search results. \
Use valid JSON with double quotes. \
Structure: {\"resources\": [{\"title\": \"...\", \"type\": \"...\", \"link\": \"...\", \"description\": \"...\"}]}";

/// `best <topic> learning resources <kind, kind>`
pub fn search_query(topic: &str, kinds: &[ResourceKind]) -> String {
    let kinds = kinds
        .iter()
        .map(ResourceKind::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    format!("best {} learning resources {}", topic, kinds)
        .trim_end()
        .to_string()
}

/// 前 5 条搜索结果渲染为 `- title (link)` 行；没有结果时为空串
pub fn format_search_context(search: Option<&SearchResults>) -> String {
    search
        .map(|s| {
            s.organic
                .iter()
                .take(SEARCH_CONTEXT_LIMIT)
                .map(|r| {
                    format!(
                        "- {} ({})\n",
                        r.title.as_deref().unwrap_or("Untitled"),
                        r.link.as_deref().unwrap_or("no link")
                    )
                })
                .collect()
        })
        .unwrap_or_default()
}

/// Plan.raw_search：搜索上下文，空时为固定提示
pub fn raw_search_text(context: &str) -> String {
    if context.trim().is_empty() {
        NO_SEARCH_RESULTS.to_string()
    } else {
        context.to_string()
    }
}

/// 计划生成的 system + user 消息
pub fn plan_messages(
    topic: &str,
    level: &str,
    style: Style,
    depth: Depth,
    search_context: &str,
) -> Vec<Message> {
    let web_context = if search_context.trim().is_empty() {
        "(no web results available)"
    } else {
        search_context.trim_end()
    };
    let user_prompt = format!(
        "Topic: {topic}\n\
         Level: {level}\n\
         Style: {style}\n\
         Depth: {depth}\n\
         Web Context:\n{web_context}\n\n\
         1. Write a clear, engaging introduction.\n\
         2. Create a Step-by-Step Learning Path (Week by Week or Module by Module).\n\
         3. Explain the 3 most critical core concepts.\n\
         4. Provide a \"Practical Exercise\" idea.",
        style = style.as_str(),
        depth = depth.as_str(),
    );
    vec![Message::system(PLAN_SYSTEM_PROMPT), Message::user(user_prompt)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::Role;
    use crate::services::OrganicResult;

    #[test]
    fn test_search_query() {
        assert_eq!(
            search_query("Photosynthesis", &ResourceKind::defaults()),
            "best Photosynthesis learning resources Video Courses, Articles"
        );
        assert_eq!(search_query("Go", &[]), "best Go learning resources");
    }

    #[test]
    fn test_search_context_limits_to_five() {
        let organic = (0..7)
            .map(|i| OrganicResult::new(format!("T{}", i), format!("https://e.org/{}", i)))
            .collect();
        let ctx = format_search_context(Some(&SearchResults { organic }));
        assert_eq!(ctx.lines().count(), 5);
        assert!(ctx.starts_with("- T0 (https://e.org/0)\n"));
    }

    #[test]
    fn test_raw_search_fallback_text() {
        assert_eq!(raw_search_text(&format_search_context(None)), NO_SEARCH_RESULTS);
    }

    #[test]
    fn test_plan_messages_embed_request() {
        let msgs = plan_messages(
            "Piano",
            "Beginner",
            Style::HandsOn,
            Depth::Overview,
            "- A (https://a.org)\n",
        );
        assert_eq!(msgs.len(), 2);
        assert_eq!(msgs[0].role, Role::System);
        assert!(msgs[0].content.contains("\"resources\""));
        assert!(msgs[1].content.contains("Topic: Piano"));
        assert!(msgs[1].content.contains("Level: Beginner"));
        assert!(msgs[1].content.contains("Style: Hands-on"));
        assert!(msgs[1].content.contains("Depth: Overview"));
        assert!(msgs[1].content.contains("- A (https://a.org)"));
    }
}
