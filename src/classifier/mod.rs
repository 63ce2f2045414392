//! 难度分类器适配层
//!
//! 把训练期导出的缩放器、线性分类器、标签解码器封装成一个纯函数：
//! `classify(score, time_spent, attempts) -> label`。产物在启动时加载一次，
//! 之后分类不会失败；越界输入先截断到合法区间。

pub mod artifacts;

use std::path::{Path, PathBuf};

use thiserror::Error;

pub use artifacts::{ArtifactSet, LabelArtifact, LinearModelArtifact, ScalerArtifact, FEATURE_ORDER};

pub const SCORE_RANGE: (f64, f64) = (0.0, 100.0);
pub const TIME_SPENT_RANGE: (f64, f64) = (5.0, 120.0);
pub const ATTEMPTS_RANGE: (u32, u32) = (1, 5);

/// 产物加载或校验失败（启动期致命）
#[derive(Error, Debug)]
pub enum ClassifierError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{artifact} version {found} does not match scaler version {expected}")]
    VersionMismatch {
        artifact: &'static str,
        expected: String,
        found: String,
    },

    #[error("{artifact} feature order {found:?} differs from [score, time_spent, attempts]")]
    FeatureOrder {
        artifact: &'static str,
        found: Vec<String>,
    },

    #[error("artifact shape mismatch: {0}")]
    Shape(String),
}

/// 学习行为信号：测验分数、学习时长（分钟）、尝试次数
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LearnerSignals {
    pub score: f64,
    pub time_spent: f64,
    pub attempts: u32,
}

impl LearnerSignals {
    pub fn new(score: f64, time_spent: f64, attempts: u32) -> Self {
        Self {
            score,
            time_spent,
            attempts,
        }
    }

    /// 按特征顺序输出并截断到训练区间；NaN 取区间下界
    fn features(&self) -> [f64; 3] {
        let clamp = |v: f64, (lo, hi): (f64, f64)| if v.is_nan() { lo } else { v.clamp(lo, hi) };
        [
            clamp(self.score, SCORE_RANGE),
            clamp(self.time_spent, TIME_SPENT_RANGE),
            self.attempts.clamp(ATTEMPTS_RANGE.0, ATTEMPTS_RANGE.1) as f64,
        ]
    }
}

/// 已校验的分类流水线
#[derive(Debug, Clone)]
pub struct DifficultyClassifier {
    artifacts: ArtifactSet,
}

impl DifficultyClassifier {
    /// 从目录加载三件产物；任一缺失或不一致返回错误
    pub fn load(dir: impl AsRef<Path>) -> Result<Self, ClassifierError> {
        let dir = dir.as_ref();
        let artifacts = ArtifactSet::load(dir)?;
        tracing::info!(
            dir = %dir.display(),
            version = %artifacts.scaler.version,
            labels = ?artifacts.labels.labels,
            "difficulty classifier loaded"
        );
        Ok(Self { artifacts })
    }

    /// 由内存中的产物构建（同样做一致性检查）
    pub fn from_artifacts(artifacts: ArtifactSet) -> Result<Self, ClassifierError> {
        artifacts.check()?;
        Ok(Self { artifacts })
    }

    pub fn version(&self) -> &str {
        &self.artifacts.scaler.version
    }

    /// 全部可能的输出标签
    pub fn labels(&self) -> &[String] {
        &self.artifacts.labels.labels
    }

    pub fn classify(&self, signals: &LearnerSignals) -> String {
        let scaled = self.scale(signals.features());
        let class = self.decide(&scaled);
        let label = self.artifacts.labels.labels[class].clone();
        tracing::debug!(?signals, class, label = %label, "difficulty classified");
        label
    }

    fn scale(&self, x: [f64; 3]) -> [f64; 3] {
        let s = &self.artifacts.scaler;
        let mut out = [0.0; 3];
        for (i, v) in x.iter().enumerate() {
            out[i] = (v - s.mean[i]) / s.scale[i];
        }
        out
    }

    /// argmax(W·x + b)；并列时取下标最小的类别
    fn decide(&self, x: &[f64; 3]) -> usize {
        let m = &self.artifacts.model;
        let mut best = 0;
        let mut best_score = f64::NEG_INFINITY;
        for (k, (row, b)) in m.coefficients.iter().zip(&m.intercepts).enumerate() {
            let score: f64 = row.iter().zip(x).map(|(w, v)| w * v).sum::<f64>() + b;
            if score > best_score {
                best = k;
                best_score = score;
            }
        }
        best
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn sample_artifacts(version: &str) -> ArtifactSet {
        let order: Vec<String> = FEATURE_ORDER.iter().map(|s| s.to_string()).collect();
        ArtifactSet {
            scaler: ScalerArtifact {
                version: version.into(),
                feature_order: order.clone(),
                mean: vec![60.0, 45.0, 2.5],
                scale: vec![25.0, 30.0, 1.2],
            },
            model: LinearModelArtifact {
                version: version.into(),
                feature_order: order,
                coefficients: vec![
                    vec![-2.0, 1.0, 1.2],
                    vec![0.0, 0.0, 0.0],
                    vec![2.0, -1.0, -1.2],
                ],
                intercepts: vec![0.0, 1.0, 0.0],
            },
            labels: LabelArtifact {
                version: version.into(),
                labels: vec!["Beginner".into(), "Intermediate".into(), "Expert".into()],
            },
        }
    }

    fn classifier() -> DifficultyClassifier {
        DifficultyClassifier::from_artifacts(sample_artifacts("1.0.0")).unwrap()
    }

    #[test]
    fn test_classify_extremes() {
        let c = classifier();
        assert_eq!(c.classify(&LearnerSignals::new(5.0, 110.0, 5)), "Beginner");
        assert_eq!(c.classify(&LearnerSignals::new(98.0, 10.0, 1)), "Expert");
        assert_eq!(c.classify(&LearnerSignals::new(60.0, 45.0, 3)), "Intermediate");
    }

    #[test]
    fn test_boundaries_never_fail() {
        let c = classifier();
        for score in [0.0, 100.0] {
            for time in [5.0, 120.0] {
                for attempts in [1, 5] {
                    let label = c.classify(&LearnerSignals::new(score, time, attempts));
                    assert!(c.labels().contains(&label));
                }
            }
        }
    }

    #[test]
    fn test_out_of_range_is_clamped() {
        let c = classifier();
        assert_eq!(
            c.classify(&LearnerSignals::new(250.0, 0.0, 0)),
            c.classify(&LearnerSignals::new(100.0, 5.0, 1))
        );
        let label = c.classify(&LearnerSignals::new(f64::NAN, 30.0, 2));
        assert!(c.labels().contains(&label));
    }

    #[test]
    fn test_version_mismatch_rejected() {
        let mut set = sample_artifacts("1.0.0");
        set.labels.version = "2.0.0".into();
        let err = DifficultyClassifier::from_artifacts(set).unwrap_err();
        assert!(matches!(err, ClassifierError::VersionMismatch { artifact: "labels", .. }));
    }

    #[test]
    fn test_feature_order_rejected() {
        let mut set = sample_artifacts("1.0.0");
        set.scaler.feature_order.swap(0, 1);
        let err = DifficultyClassifier::from_artifacts(set).unwrap_err();
        assert!(matches!(err, ClassifierError::FeatureOrder { artifact: "scaler", .. }));
    }

    #[test]
    fn test_label_count_mismatch_rejected() {
        let mut set = sample_artifacts("1.0.0");
        set.labels.labels.pop();
        assert!(matches!(
            DifficultyClassifier::from_artifacts(set),
            Err(ClassifierError::Shape(_))
        ));
    }

    #[test]
    fn test_load_from_dir() {
        let dir = tempfile::tempdir().unwrap();
        let set = sample_artifacts("2024.1");
        std::fs::write(
            dir.path().join(artifacts::SCALER_FILE),
            serde_json::to_string(&set.scaler).unwrap(),
        )
        .unwrap();
        std::fs::write(
            dir.path().join(artifacts::CLASSIFIER_FILE),
            serde_json::to_string(&set.model).unwrap(),
        )
        .unwrap();
        std::fs::write(
            dir.path().join(artifacts::LABELS_FILE),
            serde_json::to_string(&set.labels).unwrap(),
        )
        .unwrap();

        let c = DifficultyClassifier::load(dir.path()).unwrap();
        assert_eq!(c.version(), "2024.1");
    }

    #[test]
    fn test_load_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = DifficultyClassifier::load(dir.path()).unwrap_err();
        assert!(matches!(err, ClassifierError::Read { .. }));
    }
}
