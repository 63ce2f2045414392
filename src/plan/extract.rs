//! 资源提取与归一化
//!
//! 生成文本末尾通常带一个 `{"resources": [...]}` 结构化块。这里不依赖正则：
//! 先找出所有括号平衡的片段（识别字符串与转义），取最后一个能严格解析为 JSON 对象的片段作为结构化块；
//! 解析失败一律视为「没有结构化块」，回退到搜索结果。重复资源不去重。

use serde_json::Value;
use url::Url;

use crate::plan::types::{
    Resource, DEFAULT_RESOURCE_DESCRIPTION, DEFAULT_RESOURCE_TITLE, LINK_PLACEHOLDER,
    SEARCH_RESOURCE_DESCRIPTION,
};
use crate::services::SearchResults;

/// 资源从哪里来
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceOrigin {
    /// 生成文本中的结构化块
    StructuredBlock,
    /// 搜索结果回退
    SearchFallback,
}

/// 提取结果：展示文本 + 归一化后的资源列表
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    pub text: String,
    pub resources: Vec<Resource>,
    pub origin: ResourceOrigin,
}

/// 从生成文本中提取资源；结构化块不可用时回退到搜索结果（search 为 None 时资源为空）
pub fn extract_resources(generated: &str, search: Option<&SearchResults>) -> Extraction {
    let block = find_structured_block(generated);

    let text = match &block {
        Some(b) => strip_span(generated, b.start, b.end),
        None => generated.to_string(),
    };

    let from_block = block
        .as_ref()
        .map(|b| resources_from_block(&b.value))
        .unwrap_or_default();

    if !from_block.is_empty() {
        return Extraction {
            text,
            resources: from_block,
            origin: ResourceOrigin::StructuredBlock,
        };
    }

    tracing::debug!(
        block_found = block.is_some(),
        "no structured resources, falling back to search results"
    );
    Extraction {
        text,
        resources: search.map(resources_from_search).unwrap_or_default(),
        origin: ResourceOrigin::SearchFallback,
    }
}

/// 已解析的结构化块及其在原文中的字节区间
#[derive(Debug, Clone, PartialEq)]
pub struct StructuredBlock {
    pub start: usize,
    pub end: usize,
    pub value: Value,
}

/// 结构化块：优先取最后一个带 `resources` 数组的对象片段，其次取最后一个能严格解析为 JSON 对象的片段
pub fn find_structured_block(text: &str) -> Option<StructuredBlock> {
    let parsed: Vec<StructuredBlock> = balanced_spans(text)
        .into_iter()
        .filter_map(|(start, end)| match serde_json::from_str::<Value>(&text[start..end]) {
            Ok(value) if value.is_object() => Some(StructuredBlock { start, end, value }),
            _ => None,
        })
        .collect();

    let with_resources = parsed
        .iter()
        .rposition(|b| b.value.get("resources").is_some_and(Value::is_array));
    match with_resources {
        Some(idx) => parsed.into_iter().nth(idx),
        None => parsed.into_iter().last(),
    }
}

/// 顶层平衡 `{...}` 片段，按出现顺序；未闭合的 `{` 跳过，从下一个 `{` 继续找
fn balanced_spans(text: &str) -> Vec<(usize, usize)> {
    let bytes = text.as_bytes();
    let mut spans = Vec::new();
    let mut pos = 0;
    while let Some(offset) = text[pos..].find('{') {
        let start = pos + offset;
        match balanced_end(bytes, start) {
            Some(end) => {
                spans.push((start, end));
                pos = end;
            }
            None => pos = start + 1,
        }
    }
    spans
}

/// 从 start 处的 `{` 向后扫描到与之匹配的 `}`，返回其后一个字节的下标
fn balanced_end(bytes: &[u8], start: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    for (i, &b) in bytes.iter().enumerate().skip(start) {
        if in_string {
            match b {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i + 1);
                }
            }
            _ => {}
        }
    }
    None
}

/// 删除 [start, end) 区间；若区间恰好被 Markdown 代码围栏包裹，则连围栏一起删除
fn strip_span(text: &str, start: usize, end: usize) -> String {
    let mut before = &text[..start];
    let mut after = &text[end..];

    let trimmed_before = before.trim_end();
    let trimmed_after = after.trim_start();
    if trimmed_after.starts_with("```") {
        let fence_open = ["```json", "```JSON", "```"]
            .iter()
            .find(|f| trimmed_before.ends_with(*f));
        if let Some(open) = fence_open {
            before = &trimmed_before[..trimmed_before.len() - open.len()];
            after = &trimmed_after[3..];
        }
    }

    format!("{}{}", before.trim_end(), after.trim_end())
        .trim()
        .to_string()
}

/// 结构化块中的 resources 数组；非对象条目跳过
fn resources_from_block(block: &Value) -> Vec<Resource> {
    block
        .get("resources")
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(resource_from_value).collect())
        .unwrap_or_default()
}

fn resource_from_value(item: &Value) -> Option<Resource> {
    let obj = item.as_object()?;
    let field = |key: &str| {
        obj.get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
    };
    Some(Resource {
        title: field("title").unwrap_or(DEFAULT_RESOURCE_TITLE).to_string(),
        kind: field("type").map(String::from),
        link: normalize_link(field("link").or_else(|| field("url"))),
        description: field("description")
            .unwrap_or(DEFAULT_RESOURCE_DESCRIPTION)
            .to_string(),
    })
}

/// 每条自然搜索结果对应一个资源，保持顺序
pub fn resources_from_search(search: &SearchResults) -> Vec<Resource> {
    search
        .organic
        .iter()
        .map(|r| Resource {
            title: r
                .title
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .unwrap_or(DEFAULT_RESOURCE_TITLE)
                .to_string(),
            kind: None,
            link: normalize_link(r.link.as_deref()),
            description: SEARCH_RESOURCE_DESCRIPTION.to_string(),
        })
        .collect()
}

/// 合法的 http(s) 绝对 URL 原样保留，否则返回占位 `#`
pub fn normalize_link(link: Option<&str>) -> String {
    link.map(str::trim)
        .filter(|l| {
            Url::parse(l)
                .map(|u| matches!(u.scheme(), "http" | "https") && u.host().is_some())
                .unwrap_or(false)
        })
        .unwrap_or(LINK_PLACEHOLDER)
        .to_string()
}
