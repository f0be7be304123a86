#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

use crate::domain::model::ProfileKind;
use crate::utils::error::{MatchError, Result};
use crate::utils::validation::validate_one_of;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategyKind {
    Weighted,
    Rule,
    Classifier,
}

impl StrategyKind {
    pub const NAMES: [&'static str; 3] = ["weighted", "rule", "classifier"];

    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyKind::Weighted => "weighted",
            StrategyKind::Rule => "rule",
            StrategyKind::Classifier => "classifier",
        }
    }

    /// Profile shape loaded into the store for this strategy.
    pub fn profile_kind(&self) -> ProfileKind {
        match self {
            StrategyKind::Rule => ProfileKind::Rule,
            StrategyKind::Weighted | StrategyKind::Classifier => ProfileKind::Weighted,
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StrategyKind {
    type Err = MatchError;

    fn from_str(s: &str) -> Result<Self> {
        let name = s.trim().to_ascii_lowercase();
        validate_one_of("engine.strategy", &name, &Self::NAMES)?;
        Ok(match name.as_str() {
            "rule" => StrategyKind::Rule,
            "classifier" => StrategyKind::Classifier,
            _ => StrategyKind::Weighted,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_strategy() {
        assert_eq!("Rule".parse::<StrategyKind>().unwrap(), StrategyKind::Rule);
        assert_eq!(StrategyKind::Classifier.profile_kind(), ProfileKind::Weighted);
        assert!("bayes".parse::<StrategyKind>().is_err());
    }
}
