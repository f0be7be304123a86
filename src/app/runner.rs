use crate::adapters::LocalArtifactStore;
use crate::config::toml_config::AppConfig;
use crate::config::StrategyKind;
use crate::core::context::EngineContext;
use crate::core::engine::MatchEngine;
use crate::core::scoring::ProfileScorer;
use crate::domain::model::{DiagnosisReport, SelectedSymptomSet};
use crate::ml::classifier::ClassifierStrategy;
use crate::utils::error::Result;

/// Builds the read-only context for the configured strategy.
pub fn build_context(config: &AppConfig) -> Result<EngineContext> {
    let strategy = config.strategy()?;
    let knowledge = config.load_knowledge()?;
    let info = config.load_condition_info()?;
    EngineContext::new(&knowledge, strategy.profile_kind(), info)
}

/// Runs one diagnosis request with the configured strategy.
pub fn diagnose(
    config: &AppConfig,
    context: &EngineContext,
    symptoms: &SelectedSymptomSet,
) -> Result<DiagnosisReport> {
    let top_k = config.top_k();

    match config.strategy()? {
        StrategyKind::Weighted | StrategyKind::Rule => MatchEngine::new(context, ProfileScorer::new())
            .with_top_k(top_k)
            .diagnose(symptoms),
        StrategyKind::Classifier => {
            let store = LocalArtifactStore::new(config.artifact_dir());
            let strategy = ClassifierStrategy::new(context, store, config.classifier_config());
            MatchEngine::new(context, strategy)
                .with_top_k(top_k)
                .diagnose(symptoms)
        }
    }
}
