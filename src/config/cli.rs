use crate::config::toml_config::{AppConfig, ArtifactsConfig};
use crate::config::StrategyKind;
use crate::domain::model::SelectedSymptomSet;
use crate::utils::error::Result;
use crate::utils::validation::Validate;
use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "symptom-match")]
#[command(about = "Rank possible conditions for a set of symptoms (educational use only)")]
pub struct CliConfig {
    /// Comma separated symptom identifiers, e.g. fever,cough,chills
    #[arg(short, long, value_delimiter = ',')]
    pub symptoms: Vec<String>,

    /// Scoring strategy: weighted, rule or classifier
    #[arg(long)]
    pub strategy: Option<StrategyKind>,

    /// Path to TOML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Directory holding the classifier artifacts
    #[arg(long)]
    pub artifact_dir: Option<String>,

    /// Number of conditions to report
    #[arg(long)]
    pub top: Option<usize>,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,

    /// List the known symptom identifiers and exit
    #[arg(long)]
    pub list_symptoms: bool,

    /// List the known conditions and exit
    #[arg(long)]
    pub list_conditions: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub log_json: bool,
}

impl CliConfig {
    pub fn selected_symptoms(&self) -> SelectedSymptomSet {
        self.symptoms
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .collect()
    }

    /// Loads the configuration file, if any, and applies the command-line overrides.
    pub fn resolve(&self) -> Result<AppConfig> {
        let mut config = match &self.config {
            Some(path) => {
                tracing::info!("📁 Loading configuration from: {}", path);
                AppConfig::from_file(path)?
            }
            None => AppConfig::default(),
        };

        // 應用命令列覆蓋設定
        if let Some(strategy) = self.strategy {
            config.engine.strategy = Some(strategy.as_str().to_string());
            tracing::debug!("🔧 Strategy overridden to: {}", strategy);
        }
        if let Some(top) = self.top {
            config.engine.top_k = Some(top);
        }
        if let Some(dir) = &self.artifact_dir {
            config
                .artifacts
                .get_or_insert_with(ArtifactsConfig::default)
                .dir = Some(dir.clone());
        }

        config.validate()?;
        Ok(config)
    }
}
