use crate::core::context::EngineContext;
use crate::core::scoring::DEFAULT_TOP_K;
use crate::domain::model::{Diagnosis, DiagnosisReport, SelectedSymptomSet};
use crate::domain::ports::ScoringStrategy;
use crate::utils::error::Result;

pub struct MatchEngine<'a, S: ScoringStrategy> {
    context: &'a EngineContext,
    strategy: S,
    top_k: usize,
}

impl<'a, S: ScoringStrategy> MatchEngine<'a, S> {
    pub fn new(context: &'a EngineContext, strategy: S) -> Self {
        Self {
            context,
            strategy,
            top_k: DEFAULT_TOP_K,
        }
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn strategy(&self) -> &S {
        &self.strategy
    }

    pub fn diagnose(&self, symptoms: &SelectedSymptomSet) -> Result<DiagnosisReport> {
        let (selected, ignored) = self.context.vocabulary().sanitize(symptoms);
        for symptom in &ignored {
            tracing::warn!("⚠️ Unknown symptom '{}' ignored", symptom);
        }

        if selected.is_empty() {
            tracing::info!("No known symptoms selected, nothing to match");
            return Ok(DiagnosisReport {
                strategy: self.strategy.name().to_string(),
                selected,
                ignored,
                matches: Vec::new(),
            });
        }

        tracing::debug!(
            "Scoring {} symptoms against {} conditions with '{}'",
            selected.len(),
            self.context.profiles().len(),
            self.strategy.name()
        );

        let ranked = self
            .strategy
            .rank(&selected, self.context.profiles(), self.top_k)?;

        let matches = ranked
            .into_iter()
            .enumerate()
            .map(|(i, result)| {
                let info = self.context.info().lookup(&result.condition);
                if info.is_none() {
                    tracing::debug!("No condition info for '{}'", result.condition);
                }
                Diagnosis {
                    rank: i + 1,
                    condition: result.condition,
                    score: result.score,
                    info,
                }
            })
            .collect::<Vec<_>>();

        tracing::info!("🎯 {} condition(s) above the relevance threshold", matches.len());

        Ok(DiagnosisReport {
            strategy: self.strategy.name().to_string(),
            selected,
            ignored,
            matches,
        })
    }
}
