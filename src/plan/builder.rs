//! Plan Builder：难度 → 搜索 ∥ 配图 → 生成 → 资源提取 → Plan
//!
//! 任何协作方返回 None 都不会中断流程，只是对应字段降级（无图、回退资源、占位文本）。
//! 搜索与配图互不依赖，并发执行；生成需要搜索结果，排在其后。

use std::sync::Arc;

use crate::classifier::DifficultyClassifier;
use crate::llm::{LlmClient, UNAVAILABLE};
use crate::plan::extract::extract_resources;
use crate::plan::prompt::{format_search_context, plan_messages, raw_search_text, search_query};
use crate::plan::types::{DifficultySource, Plan, PlanParts, PlanRequest};
use crate::services::{ImageClient, SearchClient};

pub struct PlanBuilder {
    classifier: Arc<DifficultyClassifier>,
    search: Arc<dyn SearchClient>,
    image: Arc<dyn ImageClient>,
    llm: Arc<dyn LlmClient>,
    num_results: usize,
}

impl PlanBuilder {
    pub fn new(
        classifier: Arc<DifficultyClassifier>,
        search: Arc<dyn SearchClient>,
        image: Arc<dyn ImageClient>,
        llm: Arc<dyn LlmClient>,
    ) -> Self {
        Self {
            classifier,
            search,
            image,
            llm,
            num_results: 5,
        }
    }

    /// 每次搜索请求的结果条数
    pub fn with_num_results(mut self, num_results: usize) -> Self {
        self.num_results = num_results;
        self
    }

    pub fn llm(&self) -> &Arc<dyn LlmClient> {
        &self.llm
    }

    /// 两种难度来源统一成一个 level 字符串
    pub fn resolve_level(&self, source: &DifficultySource) -> String {
        match source {
            DifficultySource::UserSelected(level) => level.clone(),
            DifficultySource::Inferred(signals) => self.classifier.classify(signals),
        }
    }

    /// 构建一份新计划；调用方保证 topic 非空
    pub async fn build(&self, request: &PlanRequest) -> Plan {
        let topic = request.topic.trim();
        let level = self.resolve_level(&request.difficulty);
        tracing::info!(topic = %topic, level = %level, "building plan");

        let query = search_query(topic, &request.resource_kinds);
        let (search, image) = tokio::join!(
            self.search.search(&query, self.num_results),
            self.image.find_image(topic)
        );

        let search_context = format_search_context(search.as_ref());
        let messages = plan_messages(
            topic,
            &level,
            request.style,
            request.depth,
            &search_context,
        );
        let generated = self
            .llm
            .complete(&messages)
            .await
            .unwrap_or_else(|| UNAVAILABLE.to_string());

        let extraction = extract_resources(&generated, search.as_ref());
        tracing::info!(
            topic = %topic,
            resources = extraction.resources.len(),
            origin = ?extraction.origin,
            has_image = image.is_some(),
            "plan ready"
        );

        Plan::from_parts(PlanParts {
            topic: topic.to_string(),
            level,
            style: request.style,
            depth: request.depth,
            resource_kinds: request.resource_kinds.clone(),
            image,
            text: extraction.text,
            resources: extraction.resources,
            raw_search: raw_search_text(&search_context),
        })
    }
}
