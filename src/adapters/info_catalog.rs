use crate::domain::model::ConditionInfo;
use crate::domain::ports::ConditionInfoLookup;
use crate::utils::error::{MatchError, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

pub const BUNDLED_CONDITION_INFO: &str = include_str!("../../data/condition_info.toml");

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    condition: Vec<ConditionInfo>,
}

/// Condition descriptions, medicines, home care and diet read from TOML.
#[derive(Debug, Clone, Default)]
pub struct TomlConditionCatalog {
    order: Vec<String>,
    entries: HashMap<String, ConditionInfo>,
}

impl TomlConditionCatalog {
    pub fn bundled() -> Result<Self> {
        Self::from_toml_str(BUNDLED_CONDITION_INFO)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: CatalogFile =
            toml::from_str(content).map_err(|e| MatchError::ConfigValidationError {
                field: "condition_info".to_string(),
                message: format!("TOML parsing error: {}", e),
            })?;

        let mut catalog = Self::default();
        for info in file.condition {
            if catalog.entries.contains_key(&info.name) {
                tracing::warn!("Duplicate condition info for '{}', keeping the last", info.name);
            } else {
                catalog.order.push(info.name.clone());
            }
            catalog.entries.insert(info.name.clone(), info);
        }
        Ok(catalog)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

impl ConditionInfoLookup for TomlConditionCatalog {
    fn lookup(&self, condition: &str) -> Option<ConditionInfo> {
        self.entries.get(condition).cloned()
    }

    fn conditions(&self) -> Vec<String> {
        self.order.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundled_catalog_covers_all_conditions() {
        let catalog = TomlConditionCatalog::bundled().unwrap();
        assert_eq!(catalog.len(), 15);

        let flu = catalog.lookup("Influenza (Flu)").unwrap();
        assert!(flu.description.contains("influenza"));
        assert!(!flu.prescription_medicines.is_empty());
        assert!(catalog.lookup("Scurvy").is_none());
    }

    #[test]
    fn test_lists_default_to_empty() {
        let catalog = TomlConditionCatalog::from_toml_str(
            r#"
[[condition]]
name = "Sunburn"
description = "Skin damage from ultraviolet light."
"#,
        )
        .unwrap();

        let info = catalog.lookup("Sunburn").unwrap();
        assert!(info.diet.is_empty());
        assert_eq!(catalog.conditions(), vec!["Sunburn".to_string()]);
    }
}
