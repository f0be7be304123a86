// Adapters layer: concrete implementations for external collaborators (artifact storage, condition info).

pub mod info_catalog;
pub mod storage;

pub use info_catalog::TomlConditionCatalog;
pub use storage::LocalArtifactStore;
