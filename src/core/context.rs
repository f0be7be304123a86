use crate::core::knowledge::KnowledgeBase;
use crate::core::profile_store::ProfileStore;
use crate::core::vocabulary::SymptomVocabulary;
use crate::domain::model::{GeneratorPattern, ProfileKind};
use crate::domain::ports::ConditionInfoLookup;
use crate::utils::error::Result;

/// Read-only state built once at startup and shared by every request.
pub struct EngineContext {
    vocabulary: SymptomVocabulary,
    profiles: ProfileStore,
    patterns: Vec<(String, GeneratorPattern)>,
    info: Box<dyn ConditionInfoLookup>,
}

impl EngineContext {
    pub fn new(
        knowledge: &KnowledgeBase,
        kind: ProfileKind,
        info: impl ConditionInfoLookup + 'static,
    ) -> Result<Self> {
        let vocabulary = knowledge.vocabulary()?;
        let profiles = knowledge.profile_store(kind)?;
        let patterns = knowledge.patterns();

        tracing::debug!(
            "Context ready: {} symptoms, {} {} profiles, {} generator patterns",
            vocabulary.len(),
            profiles.len(),
            kind.as_str(),
            patterns.len()
        );

        Ok(Self {
            vocabulary,
            profiles,
            patterns,
            info: Box::new(info),
        })
    }

    pub fn vocabulary(&self) -> &SymptomVocabulary {
        &self.vocabulary
    }

    pub fn profiles(&self) -> &ProfileStore {
        &self.profiles
    }

    pub fn patterns(&self) -> &[(String, GeneratorPattern)] {
        &self.patterns
    }

    pub fn info(&self) -> &dyn ConditionInfoLookup {
        self.info.as_ref()
    }
}

impl std::fmt::Debug for EngineContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineContext")
            .field("symptoms", &self.vocabulary.len())
            .field("profiles", &self.profiles.len())
            .field("patterns", &self.patterns.len())
            .finish()
    }
}
