use crate::core::profile_store::ProfileStore;
use crate::core::vocabulary::SymptomVocabulary;
use crate::domain::model::{
    ConditionProfile, GeneratorPattern, ProfileKind, RuleProfile, Symptom, WeightedProfile,
};
use crate::utils::error::{MatchError, Result};
use crate::utils::validation::{validate_range, Validate};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Knowledge base bundled with the binary.
pub const BUNDLED_KNOWLEDGE: &str = include_str!("../../data/knowledge.toml");

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SymptomEntry {
    pub id: Symptom,
    pub label: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConditionEntry {
    pub name: String,
    pub weighted: Option<WeightedProfile>,
    pub rule: Option<RuleProfile>,
    pub pattern: Option<GeneratorPattern>,
}

/// Static definition of symptoms and condition profiles.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeBase {
    #[serde(rename = "symptom")]
    pub symptoms: Vec<SymptomEntry>,
    #[serde(rename = "condition")]
    pub conditions: Vec<ConditionEntry>,
}

impl KnowledgeBase {
    pub fn bundled() -> Result<Self> {
        Self::from_toml_str(BUNDLED_KNOWLEDGE)
    }

    /// 從 TOML 檔案載入知識庫
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let knowledge: KnowledgeBase =
            toml::from_str(content).map_err(|e| MatchError::KnowledgeError {
                message: format!("TOML parsing error: {}", e),
            })?;
        knowledge.validate()?;
        Ok(knowledge)
    }

    pub fn vocabulary(&self) -> Result<SymptomVocabulary> {
        SymptomVocabulary::with_labels(
            self.symptoms.iter().map(|s| s.id.clone()).collect(),
            self.symptoms.iter().map(|s| s.label.clone()).collect(),
        )
    }

    /// Builds a store holding the requested profile shape of every condition.
    pub fn profile_store(&self, kind: ProfileKind) -> Result<ProfileStore> {
        let mut profiles = Vec::with_capacity(self.conditions.len());
        for condition in &self.conditions {
            let profile = match kind {
                ProfileKind::Weighted => condition
                    .weighted
                    .clone()
                    .map(|p| ConditionProfile::weighted(&condition.name, p)),
                ProfileKind::Rule => condition
                    .rule
                    .clone()
                    .map(|p| ConditionProfile::rule(&condition.name, p)),
            };
            match profile {
                Some(profile) => profiles.push(profile),
                None => tracing::debug!(
                    "Condition '{}' has no {} profile, skipping",
                    condition.name,
                    kind.as_str()
                ),
            }
        }

        if profiles.is_empty() {
            return Err(MatchError::KnowledgeError {
                message: format!("no condition defines a {} profile", kind.as_str()),
            });
        }

        ProfileStore::new(profiles)
    }

    /// Generator patterns in condition order.
    pub fn patterns(&self) -> Vec<(String, GeneratorPattern)> {
        self.conditions
            .iter()
            .filter_map(|c| c.pattern.clone().map(|p| (c.name.clone(), p)))
            .collect()
    }

    fn log_unknown_references(&self, vocabulary: &SymptomVocabulary) {
        for condition in &self.conditions {
            let mut referenced: Vec<&Symptom> = Vec::new();
            if let Some(weighted) = &condition.weighted {
                referenced.extend(weighted.symptoms());
            }
            if let Some(rule) = &condition.rule {
                referenced.extend(rule.symptoms());
            }
            if let Some(pattern) = &condition.pattern {
                referenced.extend(pattern.primary.iter());
            }

            for symptom in referenced {
                if !vocabulary.contains(symptom) {
                    tracing::debug!(
                        "Condition '{}' references '{}' which is not in the vocabulary",
                        condition.name,
                        symptom
                    );
                }
            }
        }
    }
}

impl Validate for KnowledgeBase {
    fn validate(&self) -> Result<()> {
        let vocabulary = self.vocabulary()?;

        if self.conditions.is_empty() {
            return Err(MatchError::KnowledgeError {
                message: "no conditions defined".to_string(),
            });
        }

        let mut names = HashSet::new();
        for condition in &self.conditions {
            if condition.name.trim().is_empty() {
                return Err(MatchError::KnowledgeError {
                    message: "condition with an empty name".to_string(),
                });
            }
            if !names.insert(condition.name.as_str()) {
                return Err(MatchError::KnowledgeError {
                    message: format!("duplicate condition '{}'", condition.name),
                });
            }
            if let Some(pattern) = &condition.pattern {
                validate_range(
                    &format!("{}.pattern.probability", condition.name),
                    pattern.probability,
                    0.0,
                    1.0,
                )?;
            }
        }

        self.log_unknown_references(&vocabulary);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SMALL: &str = r#"
[[symptom]]
id = "fever"
label = "Fever"

[[symptom]]
id = "rash"
label = "Skin Rash"

[[condition]]
name = "Measles"

[condition.weighted]
critical = { fever = 10 }
negative = { itching = -5 }

[condition.pattern]
primary = ["fever", "rash"]
probability = 0.9

[[condition]]
name = "Hives"

[condition.rule]
mandatory = ["rash"]
exclude = ["fever"]
"#;

    #[test]
    fn test_bundled_knowledge_loads() {
        let knowledge = KnowledgeBase::bundled().unwrap();
        assert_eq!(knowledge.symptoms.len(), 45);
        assert_eq!(knowledge.conditions.len(), 15);

        let vocabulary = knowledge.vocabulary().unwrap();
        assert_eq!(vocabulary.label(&Symptom::new("persistent_cough")), Some("Persistent Cough (>3 weeks)"));

        let store = knowledge.profile_store(ProfileKind::Weighted).unwrap();
        assert_eq!(store.names().next(), Some("Common Cold"));
        assert_eq!(knowledge.profile_store(ProfileKind::Rule).unwrap().len(), 15);
        assert_eq!(knowledge.patterns().len(), 15);
    }

    #[test]
    fn test_missing_shapes_are_skipped() {
        let knowledge = KnowledgeBase::from_toml_str(SMALL).unwrap();
        let weighted = knowledge.profile_store(ProfileKind::Weighted).unwrap();
        let rule = knowledge.profile_store(ProfileKind::Rule).unwrap();

        assert_eq!(weighted.names().collect::<Vec<_>>(), vec!["Measles"]);
        assert_eq!(rule.names().collect::<Vec<_>>(), vec!["Hives"]);
        assert_eq!(knowledge.patterns().len(), 1);
    }

    #[test]
    fn test_duplicate_condition_is_rejected() {
        let content = format!("{}\n[[condition]]\nname = \"Hives\"\n", SMALL);
        let result = KnowledgeBase::from_toml_str(&content);
        assert!(matches!(result, Err(MatchError::KnowledgeError { .. })));
    }

    #[test]
    fn test_invalid_probability_is_rejected() {
        let content = SMALL.replace("probability = 0.9", "probability = 1.4");
        assert!(KnowledgeBase::from_toml_str(&content).is_err());
    }

    #[test]
    fn test_knowledge_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(SMALL.as_bytes()).unwrap();

        let knowledge = KnowledgeBase::from_file(temp_file.path()).unwrap();
        assert_eq!(knowledge.conditions[0].name, "Measles");
    }
}
