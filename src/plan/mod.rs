//! 学习计划：数据模型、提示词、资源提取与构建流水线

pub mod builder;
pub mod extract;
pub mod prompt;
pub mod types;

pub use builder::PlanBuilder;
pub use extract::{extract_resources, Extraction, ResourceOrigin};
pub use types::{
    DifficultySource, Depth, Plan, PlanRequest, Resource, ResourceKind, Style, USER_LEVELS,
};
