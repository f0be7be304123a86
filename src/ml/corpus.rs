//! Synthetic training corpus generated from condition patterns.

use crate::core::vocabulary::SymptomVocabulary;
use crate::domain::model::{GeneratorPattern, TrainingSample};
use crate::utils::error::{MatchError, Result};
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::io::Write;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorpusConfig {
    pub samples_per_condition: usize,
    /// Chance that a non-primary symptom is switched on.
    pub noise_rate: f64,
    /// Chance that one present primary symptom is removed afterwards.
    pub dropout_rate: f64,
    pub seed: u64,
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self {
            samples_per_condition: 150,
            noise_rate: 0.05,
            dropout_rate: 0.10,
            seed: 42,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SyntheticCorpus {
    pub classes: Vec<String>,
    pub samples: Vec<TrainingSample>,
    pub n_features: usize,
}

impl SyntheticCorpus {
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Writes one row per sample: vocabulary columns followed by `disease`.
    pub fn write_csv<W: Write>(&self, vocabulary: &SymptomVocabulary, writer: W) -> Result<()> {
        let mut csv_writer = csv::Writer::from_writer(writer);

        let mut header: Vec<&str> = vocabulary.symptoms().iter().map(|s| s.as_str()).collect();
        header.push("disease");
        csv_writer.write_record(&header)?;

        for sample in &self.samples {
            let mut row: Vec<String> = sample.features.iter().map(|v| v.to_string()).collect();
            row.push(self.classes[sample.label].clone());
            csv_writer.write_record(&row)?;
        }

        csv_writer.flush()?;
        Ok(())
    }
}

pub fn generate(
    vocabulary: &SymptomVocabulary,
    patterns: &[(String, GeneratorPattern)],
    config: &CorpusConfig,
) -> Result<SyntheticCorpus> {
    if vocabulary.is_empty() {
        return Err(MatchError::TrainingError {
            message: "vocabulary is empty".to_string(),
        });
    }
    if patterns.is_empty() {
        return Err(MatchError::TrainingError {
            message: "no generator patterns defined".to_string(),
        });
    }

    let mut rng = StdRng::seed_from_u64(config.seed);
    let n_features = vocabulary.len();
    let mut classes = Vec::with_capacity(patterns.len());
    let mut samples = Vec::with_capacity(patterns.len() * config.samples_per_condition);

    for (label, (condition, pattern)) in patterns.iter().enumerate() {
        classes.push(condition.clone());

        let mut primary: Vec<usize> = pattern
            .primary
            .iter()
            .filter_map(|s| vocabulary.position(s))
            .collect();
        primary.sort_unstable();
        primary.dedup();

        if primary.is_empty() {
            tracing::warn!(
                "Pattern for '{}' has no symptoms in the vocabulary, samples are pure noise",
                condition
            );
        }

        let mut is_primary = vec![false; n_features];
        for &position in &primary {
            is_primary[position] = true;
        }

        for _ in 0..config.samples_per_condition {
            let mut features = vec![0u8; n_features];

            for &position in &primary {
                if rng.gen::<f64>() < pattern.probability {
                    features[position] = 1;
                }
            }

            for (position, value) in features.iter_mut().enumerate() {
                if !is_primary[position] && rng.gen::<f64>() < config.noise_rate {
                    *value = 1;
                }
            }

            // 偶爾移除一個主要症狀，模擬不完整的表現
            if rng.gen::<f64>() < config.dropout_rate {
                let present: Vec<usize> =
                    primary.iter().copied().filter(|&p| features[p] == 1).collect();
                if !present.is_empty() {
                    let victim = present[rng.gen_range(0..present.len())];
                    features[victim] = 0;
                }
            }

            samples.push(TrainingSample { features, label });
        }
    }

    tracing::debug!(
        "Generated {} samples for {} conditions over {} symptoms",
        samples.len(),
        classes.len(),
        n_features
    );

    Ok(SyntheticCorpus {
        classes,
        samples,
        n_features,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::Symptom;

    fn vocabulary() -> SymptomVocabulary {
        SymptomVocabulary::new(
            ["fever", "cough", "rash", "itching", "nausea"]
                .into_iter()
                .map(Symptom::new)
                .collect(),
        )
        .unwrap()
    }

    fn patterns() -> Vec<(String, GeneratorPattern)> {
        vec![
            (
                "Flu".to_string(),
                GeneratorPattern {
                    primary: vec![Symptom::new("fever"), Symptom::new("cough"), Symptom::new("chills")],
                    probability: 1.0,
                },
            ),
            (
                "Eczema".to_string(),
                GeneratorPattern {
                    primary: vec![Symptom::new("rash"), Symptom::new("itching")],
                    probability: 0.8,
                },
            ),
        ]
    }

    #[test]
    fn test_sample_counts_and_labels() {
        let config = CorpusConfig {
            samples_per_condition: 20,
            ..Default::default()
        };
        let corpus = generate(&vocabulary(), &patterns(), &config).unwrap();

        assert_eq!(corpus.len(), 40);
        assert_eq!(corpus.classes, vec!["Flu".to_string(), "Eczema".to_string()]);
        assert!(corpus.samples[..20].iter().all(|s| s.label == 0));
        assert!(corpus.samples.iter().all(|s| s.features.len() == 5));
    }

    #[test]
    fn test_without_noise_only_primary_symptoms_appear() {
        let config = CorpusConfig {
            samples_per_condition: 30,
            noise_rate: 0.0,
            dropout_rate: 0.0,
            seed: 7,
        };
        let corpus = generate(&vocabulary(), &patterns(), &config).unwrap();

        for sample in corpus.samples.iter().filter(|s| s.label == 0) {
            // probability 1.0, so fever and cough are always present
            assert_eq!(sample.features, vec![1, 1, 0, 0, 0]);
        }
    }

    #[test]
    fn test_dropout_removes_one_primary_symptom() {
        let config = CorpusConfig {
            samples_per_condition: 10,
            noise_rate: 0.0,
            dropout_rate: 1.0,
            seed: 7,
        };
        let corpus = generate(&vocabulary(), &patterns(), &config).unwrap();

        for sample in corpus.samples.iter().filter(|s| s.label == 0) {
            assert_eq!(sample.features.iter().map(|&v| v as usize).sum::<usize>(), 1);
        }
    }

    #[test]
    fn test_same_seed_same_corpus() {
        let config = CorpusConfig::default();
        let a = generate(&vocabulary(), &patterns(), &config).unwrap();
        let b = generate(&vocabulary(), &patterns(), &config).unwrap();
        assert_eq!(a, b);

        let other = CorpusConfig {
            seed: 43,
            ..CorpusConfig::default()
        };
        assert_ne!(a, generate(&vocabulary(), &patterns(), &other).unwrap());
    }

    #[test]
    fn test_csv_export() {
        let config = CorpusConfig {
            samples_per_condition: 2,
            ..Default::default()
        };
        let vocab = vocabulary();
        let corpus = generate(&vocab, &patterns(), &config).unwrap();

        let mut buffer = Vec::new();
        corpus.write_csv(&vocab, &mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "fever,cough,rash,itching,nausea,disease");
        assert_eq!(lines.len(), 5);
        assert!(lines[4].ends_with(",Eczema"));
    }

    #[test]
    fn test_empty_patterns_are_an_error() {
        let result = generate(&vocabulary(), &[], &CorpusConfig::default());
        assert!(matches!(result, Err(MatchError::TrainingError { .. })));
    }
}
