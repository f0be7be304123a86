pub mod context;
pub mod engine;
pub mod knowledge;
pub mod profile_store;
pub mod scoring;
pub mod vocabulary;

pub use crate::domain::model::{
    ConditionProfile, DiagnosisReport, MatchResult, ProfileKind, SelectedSymptomSet, Symptom,
};
pub use crate::domain::ports::{ArtifactStore, ConditionInfoLookup, ScoringStrategy};
pub use crate::utils::error::Result;
