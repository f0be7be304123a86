//! Rule-based scoring: weighted-category and mandatory/strong/supporting/exclude profiles.

use crate::domain::model::{
    ConditionProfile, ProfileKind, ProfileShape, RuleProfile, SelectedSymptomSet, WeightedProfile,
};
use crate::domain::ports::ScoringStrategy;
use crate::utils::error::Result;

pub const WEIGHTED_RELEVANCE_THRESHOLD: f64 = 15.0;
pub const RULE_RELEVANCE_THRESHOLD: f64 = 5.0;
pub const DEFAULT_TOP_K: usize = 3;

const MANDATORY_POINTS: f64 = 50.0;
const STRONG_POINTS: f64 = 30.0;
const SUPPORTING_POINTS: f64 = 20.0;
const EXCLUDE_PENALTY: f64 = 20.0;
const MANDATORY_GATE: f64 = 0.5;

fn clamp_percent(value: f64) -> f64 {
    value.clamp(0.0, 100.0)
}

/// Weighted match: matched positive weight plus penalties, over the total positive weight.
pub fn weighted_score(selected: &SelectedSymptomSet, profile: &WeightedProfile) -> f64 {
    let mut raw: i64 = 0;
    let mut max_possible: i64 = 0;

    for category in profile.positive_categories() {
        for (symptom, &weight) in category {
            max_possible += i64::from(weight);
            if selected.contains(symptom) {
                raw += i64::from(weight);
            }
        }
    }

    // 懲罰分數不計入分母
    for (symptom, &penalty) in &profile.negative {
        if selected.contains(symptom) {
            raw += i64::from(penalty);
        }
    }

    if max_possible <= 0 {
        return 0.0;
    }

    clamp_percent(raw as f64 / max_possible as f64 * 100.0)
}

/// Rule match. Fewer than half of the mandatory symptoms rejects the condition outright.
pub fn rule_score(selected: &SelectedSymptomSet, profile: &RuleProfile) -> f64 {
    let mut points = 0.0;
    // 沒有必要症狀時跳過門檻，但 50 分仍計入分母
    let mut max_points = MANDATORY_POINTS;

    if !profile.mandatory.is_empty() {
        let ratio =
            selected.count_present(&profile.mandatory) as f64 / profile.mandatory.len() as f64;
        if ratio < MANDATORY_GATE {
            return 0.0;
        }
        points += ratio * MANDATORY_POINTS;
    }

    for (category, weight) in [
        (&profile.strong, STRONG_POINTS),
        (&profile.supporting, SUPPORTING_POINTS),
    ] {
        if category.is_empty() {
            continue;
        }
        points += selected.count_present(category) as f64 / category.len() as f64 * weight;
        max_points += weight;
    }

    points -= EXCLUDE_PENALTY * selected.count_present(&profile.exclude) as f64;

    clamp_percent(points / max_points * 100.0)
}

pub fn relevance_threshold(kind: ProfileKind) -> f64 {
    match kind {
        ProfileKind::Weighted => WEIGHTED_RELEVANCE_THRESHOLD,
        ProfileKind::Rule => RULE_RELEVANCE_THRESHOLD,
    }
}

/// Scores each condition with the formula matching its profile shape.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProfileScorer;

impl ProfileScorer {
    pub fn new() -> Self {
        Self
    }
}

impl ScoringStrategy for ProfileScorer {
    fn name(&self) -> &'static str {
        "profile"
    }

    fn score(&self, selected: &SelectedSymptomSet, profile: &ConditionProfile) -> Result<f64> {
        let score = match &profile.shape {
            ProfileShape::Weighted(p) => weighted_score(selected, p),
            ProfileShape::Rule(p) => rule_score(selected, p),
        };
        tracing::trace!("{} ({}) -> {:.1}", profile.name, profile.kind().as_str(), score);
        Ok(score)
    }

    fn relevance_threshold(&self, profile: &ConditionProfile) -> f64 {
        relevance_threshold(profile.kind())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::Symptom;
    use std::collections::{BTreeMap, BTreeSet};

    fn weights(entries: &[(&str, i32)]) -> BTreeMap<Symptom, i32> {
        entries.iter().map(|(s, w)| (Symptom::new(*s), *w)).collect()
    }

    fn set(entries: &[&str]) -> BTreeSet<Symptom> {
        entries.iter().map(|s| Symptom::new(*s)).collect()
    }

    fn selected(entries: &[&str]) -> SelectedSymptomSet {
        entries.iter().copied().collect()
    }

    fn fever_profile() -> WeightedProfile {
        WeightedProfile {
            critical: weights(&[("fever", 10)]),
            negative: weights(&[("rash", -8)]),
            ..Default::default()
        }
    }

    #[test]
    fn test_weighted_single_critical_symptom() {
        let profile = fever_profile();
        assert_eq!(weighted_score(&selected(&["fever"]), &profile), 100.0);
        assert_eq!(weighted_score(&selected(&["fever", "rash"]), &profile), 20.0);
    }

    #[test]
    fn test_weighted_penalties_clamp_to_zero() {
        let profile = fever_profile();
        assert_eq!(weighted_score(&selected(&["rash"]), &profile), 0.0);
    }

    #[test]
    fn test_weighted_without_positive_categories_is_zero() {
        let profile = WeightedProfile {
            negative: weights(&[("rash", -8)]),
            ..Default::default()
        };
        assert_eq!(weighted_score(&selected(&["rash", "fever"]), &profile), 0.0);
    }

    #[test]
    fn test_weighted_partial_match() {
        let profile = WeightedProfile {
            critical: weights(&[("runny_nose", 10), ("sneezing", 10)]),
            major: weights(&[("cough", 8)]),
            minor: weights(&[("fever", 2)]),
            negative: BTreeMap::new(),
        };
        // (10 + 8) / 30
        let score = weighted_score(&selected(&["runny_nose", "cough"]), &profile);
        assert!((score - 60.0).abs() < 1e-9);
    }

    fn rule_profile() -> RuleProfile {
        RuleProfile {
            mandatory: set(&["wheezing", "shortness_of_breath"]),
            strong: set(&["chest_pain", "cough"]),
            supporting: set(&["fatigue"]),
            exclude: set(&["fever"]),
        }
    }

    #[test]
    fn test_rule_gate_rejects_below_half() {
        let profile = RuleProfile {
            mandatory: set(&["a", "b", "c"]),
            strong: set(&["d"]),
            supporting: set(&["e"]),
            exclude: BTreeSet::new(),
        };
        assert_eq!(rule_score(&selected(&["a", "d", "e"]), &profile), 0.0);
    }

    #[test]
    fn test_rule_full_match_is_hundred() {
        let all = selected(&["wheezing", "shortness_of_breath", "chest_pain", "cough", "fatigue"]);
        assert_eq!(rule_score(&all, &rule_profile()), 100.0);
    }

    #[test]
    fn test_rule_half_mandatory_passes_gate() {
        // 0.5 * 50 = 25 of 100
        let score = rule_score(&selected(&["wheezing"]), &rule_profile());
        assert!((score - 25.0).abs() < 1e-9);
    }

    #[test]
    fn test_rule_exclude_penalty() {
        // 50 + 30 + 20 - 20 = 80
        let with_fever = selected(&[
            "wheezing",
            "shortness_of_breath",
            "chest_pain",
            "cough",
            "fatigue",
            "fever",
        ]);
        let score = rule_score(&with_fever, &rule_profile());
        assert!((score - 80.0).abs() < 1e-9);
    }

    #[test]
    fn test_rule_empty_categories_leave_denominator() {
        let profile = RuleProfile {
            mandatory: set(&["increased_thirst", "frequent_urination"]),
            strong: set(&["fatigue"]),
            ..Default::default()
        };
        // (50 + 30) / 80
        let score = rule_score(&selected(&["increased_thirst", "frequent_urination", "fatigue"]), &profile);
        assert_eq!(score, 100.0);
    }

    #[test]
    fn test_rule_without_mandatory_skips_gate() {
        let profile = RuleProfile {
            strong: set(&["cough"]),
            supporting: set(&["fatigue"]),
            ..Default::default()
        };
        // 30 / (50 + 30 + 20)
        let score = rule_score(&selected(&["cough"]), &profile);
        assert!((score - 30.0).abs() < 1e-9);

        let both = rule_score(&selected(&["cough", "fatigue"]), &profile);
        assert!((both - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_rule_empty_profile_is_zero() {
        assert_eq!(rule_score(&selected(&["cough"]), &RuleProfile::default()), 0.0);
    }

    #[test]
    fn test_ranking_threshold_and_stable_ties() {
        let profiles = vec![
            ConditionProfile::weighted("First", fever_profile()),
            ConditionProfile::weighted("Second", fever_profile()),
            ConditionProfile::weighted(
                "Weak",
                WeightedProfile {
                    critical: weights(&[("fever", 1), ("cough", 9)]),
                    ..Default::default()
                },
            ),
        ];
        let scorer = ProfileScorer::new();
        let ranked = scorer.rank(&selected(&["fever"]), &profiles, DEFAULT_TOP_K).unwrap();

        // "Weak" scores 10, below the weighted threshold of 15
        let names: Vec<_> = ranked.iter().map(|r| r.condition.as_str()).collect();
        assert_eq!(names, vec!["First", "Second"]);
    }

    #[test]
    fn test_ranking_mixed_shapes_use_their_own_threshold() {
        let profiles = vec![
            ConditionProfile::weighted(
                "Weighted",
                WeightedProfile {
                    critical: weights(&[("fever", 1), ("cough", 9)]),
                    ..Default::default()
                },
            ),
            ConditionProfile::rule(
                "Rule",
                RuleProfile {
                    strong: set(&["fever"]),
                    supporting: set(&["a", "b", "c", "d", "e", "f", "g", "h", "i", "j"]),
                    ..Default::default()
                },
            ),
        ];
        let ranked = ProfileScorer::new()
            .rank(&selected(&["fever"]), &profiles, DEFAULT_TOP_K)
            .unwrap();
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].condition, "Rule");
    }
}
