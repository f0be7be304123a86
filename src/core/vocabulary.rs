use crate::domain::model::{SelectedSymptomSet, Symptom};
use crate::utils::error::{MatchError, Result};
use std::collections::HashMap;

/// Ordered, fixed set of known symptoms. Positions define the column layout of
/// classifier feature vectors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymptomVocabulary {
    symptoms: Vec<Symptom>,
    labels: Vec<String>,
    index: HashMap<Symptom, usize>,
}

impl SymptomVocabulary {
    pub fn new(symptoms: Vec<Symptom>) -> Result<Self> {
        let labels = symptoms.iter().map(|s| s.to_string()).collect();
        Self::with_labels(symptoms, labels)
    }

    pub fn with_labels(symptoms: Vec<Symptom>, labels: Vec<String>) -> Result<Self> {
        if symptoms.len() != labels.len() {
            return Err(MatchError::KnowledgeError {
                message: format!(
                    "{} symptoms but {} labels",
                    symptoms.len(),
                    labels.len()
                ),
            });
        }

        let mut index = HashMap::with_capacity(symptoms.len());
        for (position, symptom) in symptoms.iter().enumerate() {
            if symptom.as_str().is_empty() {
                return Err(MatchError::KnowledgeError {
                    message: format!("empty symptom identifier at position {}", position),
                });
            }
            if index.insert(symptom.clone(), position).is_some() {
                return Err(MatchError::KnowledgeError {
                    message: format!("duplicate symptom '{}' in vocabulary", symptom),
                });
            }
        }

        Ok(Self {
            symptoms,
            labels,
            index,
        })
    }

    pub fn len(&self) -> usize {
        self.symptoms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symptoms.is_empty()
    }

    pub fn contains(&self, symptom: &Symptom) -> bool {
        self.index.contains_key(symptom)
    }

    pub fn position(&self, symptom: &Symptom) -> Option<usize> {
        self.index.get(symptom).copied()
    }

    pub fn symptoms(&self) -> &[Symptom] {
        &self.symptoms
    }

    pub fn label(&self, symptom: &Symptom) -> Option<&str> {
        self.position(symptom).map(|i| self.labels[i].as_str())
    }

    /// Splits a selection into known symptoms and the identifiers that were ignored.
    pub fn sanitize(&self, selected: &SelectedSymptomSet) -> (SelectedSymptomSet, Vec<String>) {
        let mut known = SelectedSymptomSet::new();
        let mut ignored = Vec::new();
        for symptom in selected.iter() {
            if self.contains(symptom) {
                known.insert(symptom.clone());
            } else {
                ignored.push(symptom.to_string());
            }
        }
        (known, ignored)
    }

    /// Binary vector in vocabulary order. Unknown symptoms are dropped.
    pub fn encode(&self, selected: &SelectedSymptomSet) -> Vec<u8> {
        let mut features = vec![0u8; self.len()];
        for symptom in selected.iter() {
            if let Some(position) = self.position(symptom) {
                features[position] = 1;
            }
        }
        features
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vocabulary() -> SymptomVocabulary {
        SymptomVocabulary::new(vec![
            Symptom::new("fever"),
            Symptom::new("cough"),
            Symptom::new("rash"),
        ])
        .unwrap()
    }

    #[test]
    fn test_encode_uses_vocabulary_order() {
        let vocab = vocabulary();
        let selected: SelectedSymptomSet = ["rash", "fever", "unknown"].into_iter().collect();
        assert_eq!(vocab.encode(&selected), vec![1, 0, 1]);
    }

    #[test]
    fn test_sanitize_reports_unknown_symptoms() {
        let vocab = vocabulary();
        let selected: SelectedSymptomSet = ["cough", "purple_tongue"].into_iter().collect();
        let (known, ignored) = vocab.sanitize(&selected);
        assert_eq!(known.len(), 1);
        assert_eq!(ignored, vec!["purple_tongue".to_string()]);
    }

    #[test]
    fn test_duplicate_symptoms_are_rejected() {
        let result = SymptomVocabulary::new(vec![Symptom::new("fever"), Symptom::new("fever")]);
        assert!(matches!(result, Err(MatchError::KnowledgeError { .. })));
    }
}
