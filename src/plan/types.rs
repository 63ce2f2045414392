//! 计划数据模型：Plan、Resource 与生成请求
//!
//! Plan 构建后不可变（字段私有，只读访问），会话与历史通过 `Arc<Plan>` 共享同一份。

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::classifier::LearnerSignals;

/// 可供用户直接选择的难度
pub const USER_LEVELS: [&str; 3] = ["Beginner", "Intermediate", "Expert"];

pub const DEFAULT_RESOURCE_TITLE: &str = "Resource";
pub const DEFAULT_RESOURCE_DESCRIPTION: &str = "No description available.";
pub const SEARCH_RESOURCE_DESCRIPTION: &str = "Found via web search.";
pub const DEFAULT_RESOURCE_TYPE_LABEL: &str = "External Link";
/// 链接缺失或非法时的占位
pub const LINK_PLACEHOLDER: &str = "#";
pub const NO_SEARCH_RESULTS: &str = "No results found.";

/// 难度来源：用户选择原样使用；推断则交给分类器
#[derive(Debug, Clone, PartialEq)]
pub enum DifficultySource {
    UserSelected(String),
    Inferred(LearnerSignals),
}

/// 学习风格
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Style {
    Visual,
    #[default]
    TextBased,
    HandsOn,
    Academic,
}

impl Style {
    pub fn as_str(&self) -> &'static str {
        match self {
            Style::Visual => "Visual",
            Style::TextBased => "Text-Based",
            Style::HandsOn => "Hands-on",
            Style::Academic => "Academic",
        }
    }
}

/// 讲解深度
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Depth {
    Overview,
    #[default]
    CoreConcepts,
    DeepDive,
}

impl Depth {
    pub fn as_str(&self) -> &'static str {
        match self {
            Depth::Overview => "Overview",
            Depth::CoreConcepts => "Core Concepts",
            Depth::DeepDive => "Deep Dive",
        }
    }
}

/// 偏好的资源形式（拼入搜索词）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResourceKind {
    VideoCourses,
    Books,
    Articles,
    InteractiveTutorials,
}

impl ResourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::VideoCourses => "Video Courses",
            ResourceKind::Books => "Books",
            ResourceKind::Articles => "Articles",
            ResourceKind::InteractiveTutorials => "Interactive Tutorials",
        }
    }

    pub fn defaults() -> Vec<ResourceKind> {
        vec![ResourceKind::VideoCourses, ResourceKind::Articles]
    }
}

/// 解析失败时的错误信息
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownOption(pub String);

impl fmt::Display for UnknownOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown option: {}", self.0)
    }
}

impl std::error::Error for UnknownOption {}

fn normalize_option(s: &str) -> String {
    s.trim()
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric())
        .collect()
}

impl FromStr for Style {
    type Err = UnknownOption;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_option(s).as_str() {
            "visual" => Ok(Style::Visual),
            "textbased" | "text" => Ok(Style::TextBased),
            "handson" => Ok(Style::HandsOn),
            "academic" => Ok(Style::Academic),
            _ => Err(UnknownOption(s.to_string())),
        }
    }
}

impl FromStr for Depth {
    type Err = UnknownOption;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_option(s).as_str() {
            "overview" => Ok(Depth::Overview),
            "coreconcepts" | "core" => Ok(Depth::CoreConcepts),
            "deepdive" | "deep" => Ok(Depth::DeepDive),
            _ => Err(UnknownOption(s.to_string())),
        }
    }
}

impl FromStr for ResourceKind {
    type Err = UnknownOption;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_option(s).as_str() {
            "videocourses" | "video" | "videos" => Ok(ResourceKind::VideoCourses),
            "books" | "book" => Ok(ResourceKind::Books),
            "articles" | "article" => Ok(ResourceKind::Articles),
            "interactivetutorials" | "interactive" | "tutorials" => {
                Ok(ResourceKind::InteractiveTutorials)
            }
            _ => Err(UnknownOption(s.to_string())),
        }
    }
}

/// 一次「生成新计划」的输入
#[derive(Debug, Clone, PartialEq)]
pub struct PlanRequest {
    pub topic: String,
    pub difficulty: DifficultySource,
    pub style: Style,
    pub depth: Depth,
    pub resource_kinds: Vec<ResourceKind>,
}

impl PlanRequest {
    pub fn new(topic: impl Into<String>, difficulty: DifficultySource) -> Self {
        Self {
            topic: topic.into(),
            difficulty,
            style: Style::default(),
            depth: Depth::default(),
            resource_kinds: ResourceKind::defaults(),
        }
    }

    pub fn with_style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    pub fn with_depth(mut self, depth: Depth) -> Self {
        self.depth = depth;
        self
    }

    pub fn with_resource_kinds(mut self, kinds: Vec<ResourceKind>) -> Self {
        self.resource_kinds = kinds;
        self
    }
}

/// 推荐学习资源；默认值在构造时确定，展示层不再判空
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    pub title: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    pub link: String,
    pub description: String,
}

impl Resource {
    /// 展示用类型标签
    pub fn type_label(&self) -> &str {
        self.kind.as_deref().unwrap_or(DEFAULT_RESOURCE_TYPE_LABEL)
    }

    pub fn has_link(&self) -> bool {
        self.link != LINK_PLACEHOLDER
    }
}

/// 一份学习计划
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Plan {
    topic: String,
    level: String,
    style: Style,
    depth: Depth,
    resource_kinds: Vec<ResourceKind>,
    image: Option<String>,
    text: String,
    resources: Vec<Resource>,
    raw_search: String,
    created_at: DateTime<Utc>,
}

/// 构建 Plan 所需的全部字段（仅 crate 内使用）
pub(crate) struct PlanParts {
    pub topic: String,
    pub level: String,
    pub style: Style,
    pub depth: Depth,
    pub resource_kinds: Vec<ResourceKind>,
    pub image: Option<String>,
    pub text: String,
    pub resources: Vec<Resource>,
    pub raw_search: String,
}

impl Plan {
    pub(crate) fn from_parts(parts: PlanParts) -> Self {
        Self {
            topic: parts.topic,
            level: parts.level,
            style: parts.style,
            depth: parts.depth,
            resource_kinds: parts.resource_kinds,
            image: parts.image,
            text: parts.text,
            resources: parts.resources,
            raw_search: parts.raw_search,
            created_at: Utc::now(),
        }
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn level(&self) -> &str {
        &self.level
    }

    pub fn style(&self) -> Style {
        self.style
    }

    pub fn depth(&self) -> Depth {
        self.depth
    }

    pub fn resource_kinds(&self) -> &[ResourceKind] {
        &self.resource_kinds
    }

    pub fn image(&self) -> Option<&str> {
        self.image.as_deref()
    }

    /// 学习指南正文（已去除结构化块）
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn resources(&self) -> &[Resource] {
        &self.resources
    }

    /// 资源为空时展示的搜索结果文本
    pub fn raw_search(&self) -> &str {
        &self.raw_search
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// 历史列表中的显示名：`topic (level)`
    pub fn history_label(&self) -> String {
        format!("{} ({})", self.topic, self.level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_option_parsing() {
        assert_eq!("Hands-on".parse::<Style>(), Ok(Style::HandsOn));
        assert_eq!("text based".parse::<Style>(), Ok(Style::TextBased));
        assert_eq!("Deep Dive".parse::<Depth>(), Ok(Depth::DeepDive));
        assert_eq!("videos".parse::<ResourceKind>(), Ok(ResourceKind::VideoCourses));
        assert!("podcasts".parse::<ResourceKind>().is_err());
    }

    #[test]
    fn test_request_defaults() {
        let req = PlanRequest::new(
            "Piano",
            DifficultySource::UserSelected("Beginner".into()),
        );
        assert_eq!(req.style, Style::TextBased);
        assert_eq!(req.depth, Depth::CoreConcepts);
        assert_eq!(
            req.resource_kinds,
            vec![ResourceKind::VideoCourses, ResourceKind::Articles]
        );
    }

    #[test]
    fn test_resource_type_label_and_serialization() {
        let r = Resource {
            title: "Khan Academy".into(),
            kind: None,
            link: LINK_PLACEHOLDER.into(),
            description: DEFAULT_RESOURCE_DESCRIPTION.into(),
        };
        assert_eq!(r.type_label(), "External Link");
        assert!(!r.has_link());
        let json = serde_json::to_value(&r).unwrap();
        assert!(json.get("type").is_none());
    }
}
