use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Opaque symptom identifier, e.g. `runny_nose`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Symptom(String);

impl Symptom {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Symptom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Symptom {
    fn from(id: &str) -> Self {
        Self::new(id.trim())
    }
}

impl From<String> for Symptom {
    fn from(id: String) -> Self {
        Self::new(id.trim())
    }
}

/// Symptoms reported for one request. Duplicates collapse, order is irrelevant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SelectedSymptomSet(BTreeSet<Symptom>);

impl SelectedSymptomSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, symptom: Symptom) -> bool {
        self.0.insert(symptom)
    }

    pub fn contains(&self, symptom: &Symptom) -> bool {
        self.0.contains(symptom)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Symptom> {
        self.0.iter()
    }

    /// Number of `symptoms` present in this set.
    pub fn count_present<'a, I>(&self, symptoms: I) -> usize
    where
        I: IntoIterator<Item = &'a Symptom>,
    {
        symptoms.into_iter().filter(|s| self.contains(s)).count()
    }
}

impl<S: Into<Symptom>> FromIterator<S> for SelectedSymptomSet {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// Weighted-category profile: positive weights for `critical`, `major` and
/// `minor`, penalties in `negative`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeightedProfile {
    pub critical: BTreeMap<Symptom, i32>,
    pub major: BTreeMap<Symptom, i32>,
    pub minor: BTreeMap<Symptom, i32>,
    pub negative: BTreeMap<Symptom, i32>,
}

impl WeightedProfile {
    /// Positive categories in severity order.
    pub fn positive_categories(&self) -> [&BTreeMap<Symptom, i32>; 3] {
        [&self.critical, &self.major, &self.minor]
    }

    pub fn symptoms(&self) -> impl Iterator<Item = &Symptom> {
        self.positive_categories()
            .into_iter()
            .chain(std::iter::once(&self.negative))
            .flat_map(|category| category.keys())
    }
}

/// Rule-set profile: a `mandatory` gate, graduated `strong` and `supporting`
/// evidence, and `exclude` symptoms that contradict the condition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleProfile {
    pub mandatory: BTreeSet<Symptom>,
    pub strong: BTreeSet<Symptom>,
    pub supporting: BTreeSet<Symptom>,
    pub exclude: BTreeSet<Symptom>,
}

impl RuleProfile {
    pub fn symptoms(&self) -> impl Iterator<Item = &Symptom> {
        self.mandatory
            .iter()
            .chain(&self.strong)
            .chain(&self.supporting)
            .chain(&self.exclude)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProfileKind {
    Weighted,
    Rule,
}

impl ProfileKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProfileKind::Weighted => "weighted",
            ProfileKind::Rule => "rule",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ProfileShape {
    Weighted(WeightedProfile),
    Rule(RuleProfile),
}

impl ProfileShape {
    pub fn kind(&self) -> ProfileKind {
        match self {
            ProfileShape::Weighted(_) => ProfileKind::Weighted,
            ProfileShape::Rule(_) => ProfileKind::Rule,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionProfile {
    pub name: String,
    pub shape: ProfileShape,
}

impl ConditionProfile {
    pub fn weighted(name: impl Into<String>, profile: WeightedProfile) -> Self {
        Self {
            name: name.into(),
            shape: ProfileShape::Weighted(profile),
        }
    }

    pub fn rule(name: impl Into<String>, profile: RuleProfile) -> Self {
        Self {
            name: name.into(),
            shape: ProfileShape::Rule(profile),
        }
    }

    pub fn kind(&self) -> ProfileKind {
        self.shape.kind()
    }

    pub fn symptoms(&self) -> Box<dyn Iterator<Item = &Symptom> + '_> {
        match &self.shape {
            ProfileShape::Weighted(p) => Box::new(p.symptoms()),
            ProfileShape::Rule(p) => Box::new(p.symptoms()),
        }
    }
}

/// Pattern used by the synthetic corpus generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratorPattern {
    pub primary: Vec<Symptom>,
    pub probability: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub condition: String,
    pub score: f64,
}

impl MatchResult {
    pub fn new(condition: impl Into<String>, score: f64) -> Self {
        Self {
            condition: condition.into(),
            score,
        }
    }
}

/// One labeled row of the synthetic corpus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainingSample {
    pub features: Vec<u8>,
    pub label: usize,
}

/// Display text for one condition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionInfo {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub otc_medicines: Vec<String>,
    #[serde(default)]
    pub prescription_medicines: Vec<String>,
    #[serde(default)]
    pub home_remedies: Vec<String>,
    #[serde(default)]
    pub diet: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnosis {
    pub rank: usize,
    pub condition: String,
    pub score: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub info: Option<ConditionInfo>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosisReport {
    pub strategy: String,
    pub selected: SelectedSymptomSet,
    /// Identifiers that were not in the vocabulary and took no part in scoring.
    pub ignored: Vec<String>,
    pub matches: Vec<Diagnosis>,
}

impl DiagnosisReport {
    pub fn has_matches(&self) -> bool {
        !self.matches.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selected_set_collapses_duplicates() {
        let set: SelectedSymptomSet = ["fever", "cough", "fever", " cough "].into_iter().collect();
        assert_eq!(set.len(), 2);
        assert!(set.contains(&Symptom::new("cough")));
    }

    #[test]
    fn test_count_present() {
        let set: SelectedSymptomSet = ["fever", "rash"].into_iter().collect();
        let candidates = [Symptom::new("fever"), Symptom::new("chills"), Symptom::new("rash")];
        assert_eq!(set.count_present(&candidates), 2);
    }

    #[test]
    fn test_profile_shape_serializes_with_kind_tag() {
        let profile = ConditionProfile::rule("Asthma", RuleProfile::default());
        let json = serde_json::to_value(&profile).unwrap();
        assert_eq!(json["shape"]["kind"], "rule");
        assert_eq!(profile.kind(), ProfileKind::Rule);
    }
}
