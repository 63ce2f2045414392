//! Study Planner - 个性化学习计划编排引擎
//!
//! 模块划分：
//! - **classifier**: 难度分类器（标准化 + 线性模型，启动时加载产物并校验版本）
//! - **config**: 应用配置加载（TOML + 环境变量）
//! - **core**: 启动期 / 会话期错误类型，Tutor 构建器
//! - **llm**: 生成服务抽象与实现（OpenAI 兼容 / Mock）
//! - **memory**: 对话记录
//! - **observability**: 日志初始化
//! - **plan**: 计划数据模型、提示词、资源提取、构建流水线
//! - **services**: 网页搜索与配图服务
//! - **session**: 单会话状态、上下文组装、多会话容器
//! - **tutor**: 会话动作入口（新计划、历史、追问、测验）

pub mod classifier;
pub mod config;
pub mod core;
pub mod llm;
pub mod memory;
pub mod observability;
pub mod plan;
pub mod services;
pub mod session;
pub mod tutor;

pub use tutor::Tutor;
