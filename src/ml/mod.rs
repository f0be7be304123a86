pub mod classifier;
pub mod corpus;
pub mod forest;

pub use classifier::{ClassifierConfig, ClassifierStrategy, TrainedModel, TrainingReport};
pub use corpus::{CorpusConfig, SyntheticCorpus};
pub use forest::{ForestParams, RandomForest};
