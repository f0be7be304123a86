use crate::adapters::TomlConditionCatalog;
use crate::config::StrategyKind;
use crate::core::knowledge::KnowledgeBase;
use crate::core::scoring::DEFAULT_TOP_K;
use crate::ml::classifier::{
    ClassifierConfig, DEFAULT_MODEL_FILE, DEFAULT_PROBABILITY_FLOOR, DEFAULT_VOCABULARY_FILE,
};
use crate::ml::corpus::CorpusConfig;
use crate::ml::forest::ForestParams;
use crate::utils::error::{MatchError, Result};
use crate::utils::validation::{
    validate_non_empty_string, validate_path, validate_positive_number, validate_range, Validate,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_ARTIFACT_DIR: &str = "./artifacts";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub engine: EngineConfig,
    pub knowledge: Option<KnowledgeConfig>,
    pub classifier: Option<ClassifierSection>,
    pub artifacts: Option<ArtifactsConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    pub strategy: Option<String>,
    pub top_k: Option<usize>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KnowledgeConfig {
    /// Replaces the bundled knowledge base.
    pub path: Option<String>,
    /// Replaces the bundled condition information.
    pub info_path: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClassifierSection {
    pub seed: Option<u64>,
    pub samples_per_condition: Option<usize>,
    pub noise_rate: Option<f64>,
    pub dropout_rate: Option<f64>,
    pub n_trees: Option<usize>,
    pub max_depth: Option<usize>,
    pub min_samples_split: Option<usize>,
    pub max_features: Option<usize>,
    pub probability_floor: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ArtifactsConfig {
    pub dir: Option<String>,
    pub model_file: Option<String>,
    pub vocabulary_file: Option<String>,
}

impl AppConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| MatchError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${ARTIFACT_DIR})，未定義的變數保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| MatchError::ConfigValidationError {
            field: "env_substitution".to_string(),
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn strategy(&self) -> Result<StrategyKind> {
        match &self.engine.strategy {
            Some(name) => name.parse(),
            None => Ok(StrategyKind::Weighted),
        }
    }

    pub fn top_k(&self) -> usize {
        self.engine.top_k.unwrap_or(DEFAULT_TOP_K)
    }

    pub fn artifact_dir(&self) -> &str {
        self.artifacts
            .as_ref()
            .and_then(|a| a.dir.as_deref())
            .unwrap_or(DEFAULT_ARTIFACT_DIR)
    }

    pub fn knowledge_path(&self) -> Option<&str> {
        self.knowledge.as_ref().and_then(|k| k.path.as_deref())
    }

    pub fn info_path(&self) -> Option<&str> {
        self.knowledge.as_ref().and_then(|k| k.info_path.as_deref())
    }

    pub fn load_knowledge(&self) -> Result<KnowledgeBase> {
        match self.knowledge_path() {
            Some(path) => {
                tracing::info!("📁 Loading knowledge base from: {}", path);
                KnowledgeBase::from_file(path)
            }
            None => KnowledgeBase::bundled(),
        }
    }

    pub fn load_condition_info(&self) -> Result<TomlConditionCatalog> {
        match self.info_path() {
            Some(path) => {
                tracing::info!("📁 Loading condition info from: {}", path);
                TomlConditionCatalog::from_file(path)
            }
            None => TomlConditionCatalog::bundled(),
        }
    }

    pub fn classifier_config(&self) -> ClassifierConfig {
        let section = self.classifier.clone().unwrap_or_default();
        let artifacts = self.artifacts.clone().unwrap_or_default();
        let corpus_defaults = CorpusConfig::default();
        let forest_defaults = ForestParams::default();
        let seed = section.seed.unwrap_or(corpus_defaults.seed);

        ClassifierConfig {
            corpus: CorpusConfig {
                samples_per_condition: section
                    .samples_per_condition
                    .unwrap_or(corpus_defaults.samples_per_condition),
                noise_rate: section.noise_rate.unwrap_or(corpus_defaults.noise_rate),
                dropout_rate: section.dropout_rate.unwrap_or(corpus_defaults.dropout_rate),
                seed,
            },
            forest: ForestParams {
                n_trees: section.n_trees.unwrap_or(forest_defaults.n_trees),
                max_depth: section.max_depth.unwrap_or(forest_defaults.max_depth),
                min_samples_split: section
                    .min_samples_split
                    .unwrap_or(forest_defaults.min_samples_split),
                max_features: section.max_features.or(forest_defaults.max_features),
                seed,
            },
            probability_floor: section.probability_floor.unwrap_or(DEFAULT_PROBABILITY_FLOOR),
            model_file: artifacts
                .model_file
                .unwrap_or_else(|| DEFAULT_MODEL_FILE.to_string()),
            vocabulary_file: artifacts
                .vocabulary_file
                .unwrap_or_else(|| DEFAULT_VOCABULARY_FILE.to_string()),
        }
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        self.strategy()?;
        validate_range("engine.top_k", self.top_k(), 1, 15)?;
        validate_path("artifacts.dir", self.artifact_dir())?;

        if let Some(path) = self.knowledge_path() {
            validate_path("knowledge.path", path)?;
        }
        if let Some(path) = self.info_path() {
            validate_path("knowledge.info_path", path)?;
        }

        let classifier = self.classifier_config();
        validate_positive_number(
            "classifier.samples_per_condition",
            classifier.corpus.samples_per_condition,
            1,
        )?;
        validate_range("classifier.noise_rate", classifier.corpus.noise_rate, 0.0, 1.0)?;
        validate_range("classifier.dropout_rate", classifier.corpus.dropout_rate, 0.0, 1.0)?;
        validate_positive_number("classifier.n_trees", classifier.forest.n_trees, 1)?;
        validate_positive_number(
            "classifier.min_samples_split",
            classifier.forest.min_samples_split,
            2,
        )?;
        if let Some(max_features) = classifier.forest.max_features {
            validate_positive_number("classifier.max_features", max_features, 1)?;
        }
        validate_range(
            "classifier.probability_floor",
            classifier.probability_floor,
            0.0,
            100.0,
        )?;
        validate_non_empty_string("artifacts.model_file", &classifier.model_file)?;
        validate_non_empty_string("artifacts.vocabulary_file", &classifier.vocabulary_file)?;

        if classifier.model_file == classifier.vocabulary_file {
            return Err(MatchError::InvalidConfigValueError {
                field: "artifacts.vocabulary_file".to_string(),
                value: classifier.vocabulary_file,
                reason: "Model and vocabulary must be stored in different files".to_string(),
            });
        }

        Ok(())
    }
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
