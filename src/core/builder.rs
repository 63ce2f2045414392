//! Tutor 构建器：统一的启动初始化逻辑
//!
//! 配置校验 → 加载分类器产物 → 创建搜索 / 配图 / 生成客户端 → 组装 [`Tutor`]。
//! 任何一步失败都返回 [`StartupError`]，调用方应直接退出。

use std::path::PathBuf;
use std::sync::Arc;

use crate::classifier::DifficultyClassifier;
use crate::config::{AppConfig, Secrets};
use crate::core::StartupError;
use crate::llm::{LlmClient, OpenAiClient};
use crate::plan::PlanBuilder;
use crate::services::{ImageClient, PexelsClient, SearchClient, SerperClient};
use crate::tutor::Tutor;

pub struct TutorBuilder {
    config: AppConfig,
    llm_override: Option<Arc<dyn LlmClient>>,
}

impl TutorBuilder {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            llm_override: None,
        }
    }

    /// 替换生成客户端（测试或离线演示用）
    pub fn with_llm(mut self, llm: Arc<dyn LlmClient>) -> Self {
        self.llm_override = Some(llm);
        self
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// 加载分类器；产物缺失或不一致时启动失败
    pub fn build_classifier(&self) -> Result<Arc<DifficultyClassifier>, StartupError> {
        let classifier = DifficultyClassifier::load(&self.config.classifier.artifacts_dir)?;
        Ok(Arc::new(classifier))
    }

    fn build_search(&self, secrets: &Secrets) -> Arc<dyn SearchClient> {
        let section = &self.config.search;
        Arc::new(SerperClient::new(
            &section.endpoint,
            &secrets.search_api_key,
            section.timeout_secs,
        ))
    }

    fn build_image(&self, secrets: &Secrets) -> Arc<dyn ImageClient> {
        let section = &self.config.image;
        Arc::new(PexelsClient::new(
            &section.endpoint,
            &secrets.image_api_key,
            section.timeout_secs,
        ))
    }

    fn build_llm(&self, secrets: &Secrets) -> Arc<dyn LlmClient> {
        if let Some(llm) = &self.llm_override {
            return llm.clone();
        }
        let section = &self.config.llm;
        Arc::new(
            OpenAiClient::new(&section.base_url, &secrets.model, &secrets.llm_api_key)
                .with_temperature(section.temperature)
                .with_timeout(section.timeout_secs),
        )
    }

    pub fn build(self) -> Result<Tutor, StartupError> {
        let secrets = self.config.validate()?;
        let classifier = self.build_classifier()?;
        let llm = self.build_llm(&secrets);
        tracing::info!(model = %llm.model(), "generation client ready");

        let builder = PlanBuilder::new(
            classifier,
            self.build_search(&secrets),
            self.build_image(&secrets),
            llm,
        )
        .with_num_results(self.config.search.num_results);
        Ok(Tutor::new(builder))
    }
}

/// 便捷函数：从默认路径加载配置并构建 Tutor
pub fn create_tutor(config_path: Option<PathBuf>) -> Result<(Tutor, AppConfig), StartupError> {
    let config = crate::config::load_config(config_path)?;
    let tutor = TutorBuilder::new(config.clone()).build()?;
    Ok((tutor, config))
}
