//! 应用配置：从 config/default.toml 与环境变量加载
//!
//! 加载顺序：先读 TOML 文件，再用环境变量 `STUDY__*` 覆盖（双下划线表示嵌套，如 `STUDY__LLM__MODEL=...`）。
//! 三个 API Key 另外回退到 `SERPER_API_KEY` / `PEXELS_API_KEY` / `OPENROUTER_API_KEY`。
//! 缺少任一 Key 或模型名属于启动期致命错误，由 [`AppConfig::validate`] 统一检查。

use std::path::PathBuf;

use serde::Deserialize;

use crate::core::StartupError;

/// 应用配置根（对应 config/default.toml 的顶层）
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    #[serde(default)]
    pub app: AppSection,
    #[serde(default)]
    pub search: SearchSection,
    #[serde(default)]
    pub image: ImageSection,
    #[serde(default)]
    pub llm: LlmSection,
    #[serde(default)]
    pub classifier: ClassifierSection,
}

/// [app] 段：应用名、会话过期时间
#[derive(Debug, Clone, Deserialize)]
pub struct AppSection {
    pub name: Option<String>,
    /// 多会话部署时，空闲会话的过期时间（秒）
    #[serde(default = "default_session_timeout_secs")]
    pub session_timeout_secs: u64,
}

impl Default for AppSection {
    fn default() -> Self {
        Self {
            name: None,
            session_timeout_secs: default_session_timeout_secs(),
        }
    }
}

fn default_session_timeout_secs() -> u64 {
    3600
}

/// [search] 段：Serper 搜索
#[derive(Debug, Clone, Deserialize)]
pub struct SearchSection {
    pub api_key: Option<String>,
    #[serde(default = "default_search_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_num_results")]
    pub num_results: usize,
    #[serde(default = "default_search_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for SearchSection {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: default_search_endpoint(),
            num_results: default_num_results(),
            timeout_secs: default_search_timeout_secs(),
        }
    }
}

fn default_search_endpoint() -> String {
    "https://google.serper.dev/search".to_string()
}

fn default_num_results() -> usize {
    5
}

fn default_search_timeout_secs() -> u64 {
    10
}

/// [image] 段：Pexels 配图
#[derive(Debug, Clone, Deserialize)]
pub struct ImageSection {
    pub api_key: Option<String>,
    #[serde(default = "default_image_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_image_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ImageSection {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: default_image_endpoint(),
            timeout_secs: default_image_timeout_secs(),
        }
    }
}

fn default_image_endpoint() -> String {
    "https://api.pexels.com/v1/search".to_string()
}

fn default_image_timeout_secs() -> u64 {
    5
}

/// [llm] 段：OpenAI 兼容的生成端点（默认 OpenRouter）
#[derive(Debug, Clone, Deserialize)]
pub struct LlmSection {
    pub api_key: Option<String>,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    pub model: Option<String>,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_llm_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for LlmSection {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            model: None,
            temperature: default_temperature(),
            timeout_secs: default_llm_timeout_secs(),
        }
    }
}

fn default_base_url() -> String {
    "https://openrouter.ai/api/v1".to_string()
}

fn default_temperature() -> f32 {
    0.7
}

fn default_llm_timeout_secs() -> u64 {
    45
}

/// [classifier] 段：难度分类器产物目录（scaler.json / classifier.json / labels.json）
#[derive(Debug, Clone, Deserialize)]
pub struct ClassifierSection {
    #[serde(default = "default_artifacts_dir")]
    pub artifacts_dir: PathBuf,
}

impl Default for ClassifierSection {
    fn default() -> Self {
        Self {
            artifacts_dir: default_artifacts_dir(),
        }
    }
}

fn default_artifacts_dir() -> PathBuf {
    PathBuf::from("config/models")
}

/// 校验通过后的密钥集合，启动后只读
#[derive(Debug, Clone)]
pub struct Secrets {
    pub search_api_key: String,
    pub image_api_key: String,
    pub llm_api_key: String,
    pub model: String,
}

impl AppConfig {
    /// 启动期校验：三个 API Key 与模型名缺一不可；配置值为空串视同缺失，然后回退到传统环境变量
    pub fn validate(&self) -> Result<Secrets, StartupError> {
        let search_api_key = resolve_key(self.search.api_key.as_deref(), "SERPER_API_KEY")
            .ok_or(StartupError::MissingSecret("search.api_key / SERPER_API_KEY"))?;
        let image_api_key = resolve_key(self.image.api_key.as_deref(), "PEXELS_API_KEY")
            .ok_or(StartupError::MissingSecret("image.api_key / PEXELS_API_KEY"))?;
        let llm_api_key = resolve_key(self.llm.api_key.as_deref(), "OPENROUTER_API_KEY")
            .ok_or(StartupError::MissingSecret("llm.api_key / OPENROUTER_API_KEY"))?;
        let model = self
            .llm
            .model
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .map(String::from)
            .ok_or(StartupError::MissingSecret("llm.model"))?;

        Ok(Secrets {
            search_api_key,
            image_api_key,
            llm_api_key,
            model,
        })
    }
}

fn resolve_key(configured: Option<&str>, env_var: &str) -> Option<String> {
    configured
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(String::from)
        .or_else(|| {
            std::env::var(env_var)
                .ok()
                .map(|k| k.trim().to_string())
                .filter(|k| !k.is_empty())
        })
}

/// 从 config 目录加载配置，环境变量 STUDY__* 可覆盖
///
/// 1. 按顺序查找 config/default.toml、../config/default.toml、default.toml，找到则作为第一源
/// 2. 若传入 config_path 且文件存在，则追加该文件（可覆盖前面的键）
/// 3. 最后叠加环境变量 STUDY__*（双下划线表示嵌套键）
pub fn load_config(config_path: Option<PathBuf>) -> Result<AppConfig, config::ConfigError> {
    let mut builder = config::Config::builder();

    let default_names = ["config/default", "../config/default", "default"];
    for name in default_names {
        let path = format!("{}.toml", name);
        if std::path::Path::new(&path).exists() {
            builder = builder.add_source(config::File::with_name(name).required(false));
            break;
        }
    }

    if let Some(ref path) = config_path {
        if path.exists() {
            builder = builder.add_source(config::File::from(path.clone()).required(false));
        }
    }

    builder = builder.add_source(
        config::Environment::with_prefix("STUDY")
            .separator("__")
            .try_parsing(true),
    );

    let c = builder.build()?;
    c.try_deserialize()
}
