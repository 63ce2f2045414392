//! 配图客户端（Pexels）
//!
//! GET `?query=…&per_page=1&orientation=landscape`，`Authorization` 头直接放 API Key；
//! 取 photos[0].src.large2x，列表为空或任意错误都返回 None。

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

/// 配图协作方
#[async_trait]
pub trait ImageClient: Send + Sync {
    async fn find_image(&self, query: &str) -> Option<String>;
}

#[derive(Debug, Deserialize)]
struct PhotoSearch {
    #[serde(default)]
    photos: Vec<Photo>,
}

#[derive(Debug, Deserialize)]
struct Photo {
    src: PhotoSources,
}

#[derive(Debug, Deserialize)]
struct PhotoSources {
    large2x: Option<String>,
}

/// 从响应体中取首张大图 URL
fn first_large_image(body: &str) -> Option<String> {
    let parsed: PhotoSearch = serde_json::from_str(body).ok()?;
    parsed.photos.into_iter().next()?.src.large2x
}

pub struct PexelsClient {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl PexelsClient {
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

    async fn fetch(&self, query: &str) -> Result<String, String> {
        let resp = self
            .client
            .get(&self.endpoint)
            .header("Authorization", &self.api_key)
            .query(&[("query", query), ("per_page", "1"), ("orientation", "landscape")])
            .send()
            .await
            .map_err(|e| format!("Request failed: {}", e))?;
        if !resp.status().is_success() {
            return Err(format!("HTTP {}", resp.status()));
        }
        resp.text().await.map_err(|e| format!("Read body: {}", e))
    }
}

#[async_trait]
impl ImageClient for PexelsClient {
    async fn find_image(&self, query: &str) -> Option<String> {
        match self.fetch(query).await {
            Ok(body) => {
                let url = first_large_image(&body);
                if url.is_none() {
                    tracing::debug!(query = %query, "no image found");
                }
                url
            }
            Err(e) => {
                tracing::warn!(query = %query, error = %e, "image lookup failed");
                None
            }
        }
    }
}
