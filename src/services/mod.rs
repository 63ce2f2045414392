//! 外部服务客户端：搜索（Serper）、配图（Pexels）
//!
//! 每个客户端都是单次、带超时的网络调用；失败统一记录 warn 日志后返回 None，不向上传播。
//! 生成服务见 [`crate::llm`]。

pub mod image;
pub mod mock;
pub mod search;

pub use image::{ImageClient, PexelsClient};
pub use mock::{StaticImage, StaticSearch};
pub use search::{OrganicResult, SearchClient, SearchResults, SerperClient};
