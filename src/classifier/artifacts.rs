//! 分类器产物：特征缩放、线性多分类、标签解码
//!
//! 三者分别序列化为 JSON 文件，各自带 version；加载后必须版本一致、
//! 特征顺序一致（score, time_spent, attempts）、维度一致，否则视为致命配置错误。

use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::ClassifierError;

/// 训练时约定的特征顺序
pub const FEATURE_ORDER: [&str; 3] = ["score", "time_spent", "attempts"];

pub const SCALER_FILE: &str = "scaler.json";
pub const CLASSIFIER_FILE: &str = "classifier.json";
pub const LABELS_FILE: &str = "labels.json";

/// 标准化缩放：(x - mean) / scale
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScalerArtifact {
    pub version: String,
    pub feature_order: Vec<String>,
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

/// 线性多分类：每个类别一行权重 + 截距，取决策值最大的类别
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearModelArtifact {
    pub version: String,
    pub feature_order: Vec<String>,
    pub coefficients: Vec<Vec<f64>>,
    pub intercepts: Vec<f64>,
}

/// 标签解码：类别下标 -> 可读标签
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelArtifact {
    pub version: String,
    pub labels: Vec<String>,
}

/// 同时加载的三件产物
#[derive(Debug, Clone)]
pub struct ArtifactSet {
    pub scaler: ScalerArtifact,
    pub model: LinearModelArtifact,
    pub labels: LabelArtifact,
}

impl ArtifactSet {
    /// 从目录读取 scaler.json / classifier.json / labels.json 并校验
    pub fn load(dir: &Path) -> Result<Self, ClassifierError> {
        let set = Self {
            scaler: read_artifact(&dir.join(SCALER_FILE))?,
            model: read_artifact(&dir.join(CLASSIFIER_FILE))?,
            labels: read_artifact(&dir.join(LABELS_FILE))?,
        };
        set.check()?;
        Ok(set)
    }

    /// 版本、特征顺序与维度的一致性检查
    pub fn check(&self) -> Result<(), ClassifierError> {
        let version = &self.scaler.version;
        for (name, other) in [
            ("classifier", &self.model.version),
            ("labels", &self.labels.version),
        ] {
            if other != version {
                return Err(ClassifierError::VersionMismatch {
                    artifact: name,
                    expected: version.clone(),
                    found: other.clone(),
                });
            }
        }

        for (name, order) in [
            ("scaler", &self.scaler.feature_order),
            ("classifier", &self.model.feature_order),
        ] {
            if !order.iter().map(String::as_str).eq(FEATURE_ORDER) {
                return Err(ClassifierError::FeatureOrder {
                    artifact: name,
                    found: order.clone(),
                });
            }
        }

        let n_features = FEATURE_ORDER.len();
        if self.scaler.mean.len() != n_features || self.scaler.scale.len() != n_features {
            return Err(ClassifierError::Shape(format!(
                "scaler expects {} features, has mean={} scale={}",
                n_features,
                self.scaler.mean.len(),
                self.scaler.scale.len()
            )));
        }
        if self.scaler.scale.iter().any(|s| *s == 0.0 || !s.is_finite()) {
            return Err(ClassifierError::Shape("scaler has zero or non-finite scale".into()));
        }

        let n_classes = self.model.coefficients.len();
        if n_classes == 0 {
            return Err(ClassifierError::Shape("classifier has no classes".into()));
        }
        if let Some(row) = self.model.coefficients.iter().find(|r| r.len() != n_features) {
            return Err(ClassifierError::Shape(format!(
                "classifier row has {} weights, expected {}",
                row.len(),
                n_features
            )));
        }
        if self.model.intercepts.len() != n_classes {
            return Err(ClassifierError::Shape(format!(
                "classifier has {} classes but {} intercepts",
                n_classes,
                self.model.intercepts.len()
            )));
        }
        if self.labels.labels.len() != n_classes {
            return Err(ClassifierError::Shape(format!(
                "label decoder has {} labels for {} classes",
                self.labels.labels.len(),
                n_classes
            )));
        }
        Ok(())
    }
}

fn read_artifact<T: DeserializeOwned>(path: &Path) -> Result<T, ClassifierError> {
    let data = std::fs::read_to_string(path).map_err(|source| ClassifierError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&data).map_err(|source| ClassifierError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
