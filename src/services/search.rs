//! Web 搜索客户端（Serper）
//!
//! POST JSON `{q, num}`，请求头 `X-API-KEY`，带超时、单次尝试；非 2xx、传输错误或响应无法解析时返回 None。

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

/// 单条自然搜索结果；字段缺失时保持 None，由下游决定默认值
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrganicResult {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub snippet: Option<String>,
}

impl OrganicResult {
    pub fn new(title: impl Into<String>, link: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            link: Some(link.into()),
            snippet: None,
        }
    }
}

/// 搜索响应中本系统关心的部分
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResults {
    #[serde(default)]
    pub organic: Vec<OrganicResult>,
}

/// 搜索协作方
#[async_trait]
pub trait SearchClient: Send + Sync {
    async fn search(&self, query: &str, num_results: usize) -> Option<SearchResults>;
}

#[derive(Serialize)]
struct SerperRequest<'a> {
    q: &'a str,
    num: usize,
}

pub struct SerperClient {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl SerperClient {
    pub fn new(endpoint: &str, api_key: &str, timeout_secs: u64) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .unwrap_or_default();
        Self {
            client,
            endpoint: endpoint.to_string(),
            api_key: api_key.to_string(),
        }
    }

    async fn try_search(&self, query: &str, num_results: usize) -> Result<SearchResults, String> {
        let resp = self
            .client
            .post(&self.endpoint)
            .header("X-API-KEY", &self.api_key)
            .json(&SerperRequest {
                q: query,
                num: num_results,
            })
            .send()
            .await
            .map_err(|e| format!("Request failed: {}", e))?;
        if !resp.status().is_success() {
            return Err(format!("HTTP {}", resp.status()));
        }
        resp.json::<SearchResults>()
            .await
            .map_err(|e| format!("Parse body: {}", e))
    }
}

#[async_trait]
impl SearchClient for SerperClient {
    async fn search(&self, query: &str, num_results: usize) -> Option<SearchResults> {
        tracing::info!(query = %query, num_results, "web search");
        match self.try_search(query, num_results).await {
            Ok(results) => {
                tracing::debug!(organic = results.organic.len(), "web search done");
                Some(results)
            }
            Err(e) => {
                tracing::warn!(query = %query, error = %e, "web search failed");
                None
            }
        }
    }
}
