use crate::core::context::EngineContext;
use crate::core::vocabulary::SymptomVocabulary;
use crate::domain::model::{
    ConditionProfile, GeneratorPattern, MatchResult, SelectedSymptomSet, Symptom,
};
use crate::domain::ports::{sort_descending, ArtifactStore, ScoringStrategy};
use crate::ml::corpus::{self, CorpusConfig};
use crate::ml::forest::{ForestParams, RandomForest};
use crate::utils::error::{MatchError, Result};
use std::cell::OnceCell;
use std::collections::HashMap;

pub const DEFAULT_MODEL_FILE: &str = "disease_model.json";
pub const DEFAULT_VOCABULARY_FILE: &str = "symptoms_list.json";
pub const DEFAULT_PROBABILITY_FLOOR: f64 = 5.0;

#[derive(Debug, Clone, PartialEq)]
pub struct ClassifierConfig {
    pub corpus: CorpusConfig,
    pub forest: ForestParams,
    /// Minimum probability, in percent, for a class to be reported.
    pub probability_floor: f64,
    pub model_file: String,
    pub vocabulary_file: String,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            corpus: CorpusConfig::default(),
            forest: ForestParams::default(),
            probability_floor: DEFAULT_PROBABILITY_FLOOR,
            model_file: DEFAULT_MODEL_FILE.to_string(),
            vocabulary_file: DEFAULT_VOCABULARY_FILE.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrainingReport {
    pub samples: usize,
    pub classes: usize,
    pub trees: usize,
    /// Accuracy on the training corpus itself, a sanity signal only.
    pub training_accuracy: f64,
}

/// Forest plus the vocabulary ordering it was trained on.
#[derive(Debug, Clone)]
pub struct TrainedModel {
    forest: RandomForest,
    vocabulary: SymptomVocabulary,
}

impl TrainedModel {
    pub fn train(context: &EngineContext, config: &ClassifierConfig) -> Result<(Self, TrainingReport)> {
        let vocabulary = context.vocabulary().clone();
        let corpus = corpus::generate(&vocabulary, context.patterns(), &config.corpus)?;

        tracing::info!(
            "🌲 Training {} trees on {} synthetic samples ({} conditions)",
            config.forest.n_trees,
            corpus.len(),
            corpus.classes.len()
        );

        let forest = RandomForest::fit(
            &corpus.samples,
            corpus.n_features,
            corpus.classes.clone(),
            config.forest.clone(),
        )?;
        let training_accuracy = forest.accuracy(&corpus.samples)?;

        tracing::info!("📊 Training accuracy: {:.2}%", training_accuracy * 100.0);

        let report = TrainingReport {
            samples: corpus.len(),
            classes: corpus.classes.len(),
            trees: config.forest.n_trees,
            training_accuracy,
        };
        Ok((Self { forest, vocabulary }, report))
    }

    pub fn forest(&self) -> &RandomForest {
        &self.forest
    }

    pub fn vocabulary(&self) -> &SymptomVocabulary {
        &self.vocabulary
    }

    /// Serialized model and vocabulary, in that order.
    pub fn to_artifacts(&self) -> Result<(Vec<u8>, Vec<u8>)> {
        let model = serde_json::to_vec(&self.forest)?;
        let vocabulary = serde_json::to_vec(self.vocabulary.symptoms())?;
        Ok((model, vocabulary))
    }

    pub fn from_artifacts(model: &[u8], vocabulary: &[u8]) -> Result<Self> {
        let forest: RandomForest = serde_json::from_slice(model)?;
        forest.validate()?;
        let symptoms: Vec<Symptom> = serde_json::from_slice(vocabulary)?;
        let vocabulary = SymptomVocabulary::new(symptoms)?;

        if forest.n_features() != vocabulary.len() {
            return Err(MatchError::ArtifactError {
                artifact: "model".to_string(),
                message: format!(
                    "model expects {} features but the vocabulary has {}",
                    forest.n_features(),
                    vocabulary.len()
                ),
            });
        }
        Ok(Self { forest, vocabulary })
    }

    pub fn persist<A: ArtifactStore>(&self, store: &A, config: &ClassifierConfig) -> Result<()> {
        let (model, vocabulary) = self.to_artifacts()?;
        store.write_file(&config.model_file, &model)?;
        store.write_file(&config.vocabulary_file, &vocabulary)?;
        tracing::info!(
            "💾 Saved {} ({} bytes) and {}",
            config.model_file,
            model.len(),
            config.vocabulary_file
        );
        Ok(())
    }

    /// `Ok(None)` when either artifact is absent.
    pub fn load<A: ArtifactStore>(store: &A, config: &ClassifierConfig) -> Result<Option<Self>> {
        if !store.exists(&config.model_file) || !store.exists(&config.vocabulary_file) {
            return Ok(None);
        }
        let model = store.read_file(&config.model_file)?;
        let vocabulary = store.read_file(&config.vocabulary_file)?;
        Self::from_artifacts(&model, &vocabulary).map(Some)
    }

    /// Rejects a model whose classes differ from the conditions it will be asked about.
    pub fn ensure_classes(&self, conditions: &[(String, GeneratorPattern)]) -> Result<()> {
        let expected = conditions.iter().map(|(name, _)| name.as_str());
        if self.forest.classes().iter().map(String::as_str).eq(expected) {
            return Ok(());
        }
        Err(MatchError::ArtifactError {
            artifact: "model".to_string(),
            message: format!(
                "model was trained on {} conditions that differ from the {} configured ones",
                self.forest.classes().len(),
                conditions.len()
            ),
        })
    }

    /// Class probabilities in percent, keyed by condition name.
    pub fn probabilities(&self, selected: &SelectedSymptomSet) -> Result<HashMap<&str, f64>> {
        let features = self.vocabulary.encode(selected);
        let probabilities = self.forest.predict_proba(&features)?;
        Ok(self
            .forest
            .classes()
            .iter()
            .map(String::as_str)
            .zip(probabilities.into_iter().map(|p| p * 100.0))
            .collect())
    }
}

/// Serves the trained forest through the scoring interface. The model is loaded
/// or trained on first use and kept for the lifetime of the strategy.
pub struct ClassifierStrategy<'a, A: ArtifactStore> {
    context: &'a EngineContext,
    store: A,
    config: ClassifierConfig,
    model: OnceCell<TrainedModel>,
}

impl<'a, A: ArtifactStore> ClassifierStrategy<'a, A> {
    pub fn new(context: &'a EngineContext, store: A, config: ClassifierConfig) -> Self {
        Self {
            context,
            store,
            config,
            model: OnceCell::new(),
        }
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    pub fn is_ready(&self) -> bool {
        self.model.get().is_some()
    }

    pub fn model(&self) -> Result<&TrainedModel> {
        if let Some(model) = self.model.get() {
            return Ok(model);
        }
        let model = self.load_or_train()?;
        Ok(self.model.get_or_init(|| model))
    }

    fn load_or_train(&self) -> Result<TrainedModel> {
        let loaded = TrainedModel::load(&self.store, &self.config).and_then(|model| match model {
            Some(model) => model
                .ensure_classes(self.context.patterns())
                .map(|()| Some(model)),
            None => Ok(None),
        });

        match loaded {
            Ok(Some(model)) => {
                tracing::info!("📦 Loaded classifier from {}", self.config.model_file);
                return Ok(model);
            }
            Ok(None) => {
                tracing::info!("No stored classifier found, generating synthetic corpus");
            }
            Err(e) => {
                tracing::warn!("⚠️ Stored classifier is unusable ({}), retraining", e);
            }
        }

        let (model, _report) = TrainedModel::train(self.context, &self.config)?;
        if let Err(e) = model.persist(&self.store, &self.config) {
            tracing::warn!("⚠️ Could not save classifier artifacts: {}", e);
        }
        Ok(model)
    }
}

impl<A: ArtifactStore> ScoringStrategy for ClassifierStrategy<'_, A> {
    fn name(&self) -> &'static str {
        "classifier"
    }

    fn score(&self, selected: &SelectedSymptomSet, profile: &ConditionProfile) -> Result<f64> {
        let model = self.model()?;
        let probabilities = model.probabilities(selected)?;
        Ok(probabilities
            .get(profile.name.as_str())
            .copied()
            .unwrap_or(0.0)
            .clamp(0.0, 100.0))
    }

    fn relevance_threshold(&self, _profile: &ConditionProfile) -> f64 {
        self.config.probability_floor
    }

    fn rank<'p, I>(
        &self,
        selected: &SelectedSymptomSet,
        profiles: I,
        top_k: usize,
    ) -> Result<Vec<MatchResult>>
    where
        I: IntoIterator<Item = &'p ConditionProfile>,
    {
        // 一次預測所有類別
        let model = self.model()?;
        let probabilities = model.probabilities(selected)?;

        let mut results: Vec<MatchResult> = profiles
            .into_iter()
            .filter_map(|profile| {
                let score = probabilities
                    .get(profile.name.as_str())
                    .copied()?
                    .clamp(0.0, 100.0);
                (score > self.relevance_threshold(profile))
                    .then(|| MatchResult::new(profile.name.clone(), score))
            })
            .collect();

        sort_descending(&mut results);
        results.truncate(top_k);
        Ok(results)
    }
}
