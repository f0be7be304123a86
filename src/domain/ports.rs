use crate::domain::model::{ConditionInfo, ConditionProfile, MatchResult, SelectedSymptomSet};
use crate::utils::error::Result;
use std::cmp::Ordering;

/// Turns a symptom selection into a bounded score for one condition.
pub trait ScoringStrategy {
    fn name(&self) -> &'static str;

    /// Score in `[0, 100]`.
    fn score(&self, selected: &SelectedSymptomSet, profile: &ConditionProfile) -> Result<f64>;

    /// Minimum score (exclusive) for a condition to be reported.
    fn relevance_threshold(&self, profile: &ConditionProfile) -> f64;

    /// Scores every profile, keeps the relevant ones and returns the best `top_k`.
    /// Equal scores keep the order of `profiles`.
    fn rank<'a, I>(
        &self,
        selected: &SelectedSymptomSet,
        profiles: I,
        top_k: usize,
    ) -> Result<Vec<MatchResult>>
    where
        Self: Sized,
        I: IntoIterator<Item = &'a ConditionProfile>,
    {
        let mut results = Vec::new();
        for profile in profiles {
            let score = self.score(selected, profile)?;
            if score > self.relevance_threshold(profile) {
                results.push(MatchResult::new(profile.name.clone(), score));
            }
        }
        sort_descending(&mut results);
        results.truncate(top_k);
        Ok(results)
    }
}

/// Stable descending sort on score.
pub fn sort_descending(results: &mut [MatchResult]) {
    results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
}

/// Display text lookup for a condition name.
pub trait ConditionInfoLookup {
    fn lookup(&self, condition: &str) -> Option<ConditionInfo>;
    fn conditions(&self) -> Vec<String>;
}

/// Byte storage for persisted model artifacts.
pub trait ArtifactStore {
    fn read_file(&self, path: &str) -> Result<Vec<u8>>;
    fn write_file(&self, path: &str, data: &[u8]) -> Result<()>;
    fn exists(&self, path: &str) -> bool;
}
