use crate::domain::model::ConditionProfile;
use crate::utils::error::{MatchError, Result};
use std::collections::HashMap;

/// Immutable mapping from condition name to profile, enumerated in definition order.
#[derive(Debug, Clone)]
pub struct ProfileStore {
    profiles: Vec<ConditionProfile>,
    by_name: HashMap<String, usize>,
}

impl ProfileStore {
    pub fn new(profiles: Vec<ConditionProfile>) -> Result<Self> {
        let mut by_name = HashMap::with_capacity(profiles.len());
        for (position, profile) in profiles.iter().enumerate() {
            if by_name.insert(profile.name.clone(), position).is_some() {
                return Err(MatchError::KnowledgeError {
                    message: format!("duplicate condition '{}'", profile.name),
                });
            }
        }
        Ok(Self { profiles, by_name })
    }

    pub fn get(&self, name: &str) -> Option<&ConditionProfile> {
        self.by_name.get(name).map(|&i| &self.profiles[i])
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.profiles.iter().map(|p| p.name.as_str())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ConditionProfile> {
        self.profiles.iter()
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

impl<'a> IntoIterator for &'a ProfileStore {
    type Item = &'a ConditionProfile;
    type IntoIter = std::slice::Iter<'a, ConditionProfile>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
