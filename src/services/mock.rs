//! 固定结果的搜索 / 配图协作方（测试与离线演示用）

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use super::{ImageClient, OrganicResult, SearchClient, SearchResults};

/// 总是返回同一份搜索结果（None 表示模拟失败），并记录收到的查询
#[derive(Debug, Default)]
pub struct StaticSearch {
    results: Option<SearchResults>,
    queries: Mutex<Vec<String>>,
}

impl StaticSearch {
    pub fn new(organic: Vec<OrganicResult>) -> Self {
        Self {
            results: Some(SearchResults { organic }),
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self::default()
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().map(|q| q.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl SearchClient for StaticSearch {
    async fn search(&self, query: &str, num_results: usize) -> Option<SearchResults> {
        if let Ok(mut q) = self.queries.lock() {
            q.push(query.to_string());
        }
        self.results.clone().map(|mut r| {
            r.organic.truncate(num_results);
            r
        })
    }
}

/// 总是返回同一张图（或 None）
#[derive(Debug, Default)]
pub struct StaticImage {
    url: Option<String>,
    lookups: AtomicUsize,
}

impl StaticImage {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            lookups: AtomicUsize::new(0),
        }
    }

    pub fn none() -> Self {
        Self::default()
    }

    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl ImageClient for StaticImage {
    async fn find_image(&self, _query: &str) -> Option<String> {
        self.lookups.fetch_add(1, Ordering::Relaxed);
        self.url.clone()
    }
}
