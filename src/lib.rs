pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod ml;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::CliConfig;

pub use adapters::{LocalArtifactStore, TomlConditionCatalog};
pub use config::{toml_config::AppConfig, StrategyKind};
pub use core::{
    context::EngineContext, engine::MatchEngine, knowledge::KnowledgeBase,
    profile_store::ProfileStore, scoring::ProfileScorer, vocabulary::SymptomVocabulary,
};
pub use domain::model::{
    ConditionInfo, ConditionProfile, Diagnosis, DiagnosisReport, MatchResult, ProfileKind,
    RuleProfile, SelectedSymptomSet, Symptom, WeightedProfile,
};
pub use domain::ports::{ArtifactStore, ConditionInfoLookup, ScoringStrategy};
pub use ml::{ClassifierConfig, ClassifierStrategy, TrainedModel};
pub use utils::error::{MatchError, Result};
