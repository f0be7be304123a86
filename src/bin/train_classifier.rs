use anyhow::Context;
use clap::Parser;
use std::fs::File;
use std::io::BufWriter;
use symptom_match::app::runner;
use symptom_match::ml::corpus;
use symptom_match::utils::{logger, validation::Validate};
use symptom_match::{AppConfig, LocalArtifactStore, TrainedModel};

#[derive(Parser)]
#[command(name = "train_classifier")]
#[command(about = "Generate the synthetic corpus, train the forest and save the artifacts")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long)]
    config: Option<String>,

    /// Directory the artifacts are written to
    #[arg(long)]
    artifact_dir: Option<String>,

    /// Override the random seed
    #[arg(long)]
    seed: Option<u64>,

    /// Override samples generated per condition
    #[arg(long)]
    samples: Option<usize>,

    /// Override the number of trees
    #[arg(long)]
    trees: Option<usize>,

    /// Also write the synthetic corpus as CSV
    #[arg(long)]
    export_corpus: Option<String>,

    /// Dry run - show the training parameters without training
    #[arg(long)]
    dry_run: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn load_config(args: &Args) -> anyhow::Result<AppConfig> {
    let mut config = match &args.config {
        Some(path) => AppConfig::from_file(path)
            .with_context(|| format!("Failed to load config file '{}'", path))?,
        None => AppConfig::default(),
    };

    // 應用命令列覆蓋設定
    let classifier = config.classifier.get_or_insert_with(Default::default);
    if let Some(seed) = args.seed {
        classifier.seed = Some(seed);
    }
    if let Some(samples) = args.samples {
        classifier.samples_per_condition = Some(samples);
    }
    if let Some(trees) = args.trees {
        classifier.n_trees = Some(trees);
    }
    if let Some(dir) = &args.artifact_dir {
        config.artifacts.get_or_insert_with(Default::default).dir = Some(dir.clone());
    }

    config.validate()?;
    Ok(config)
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    logger::init_cli_logger(args.verbose);

    tracing::info!("🚀 Starting classifier training");

    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ {:#}", e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    let classifier = config.classifier_config();
    let context = runner::build_context(&config)?;

    tracing::info!(
        "📋 {} conditions x {} samples, noise {:.0}%, dropout {:.0}%, seed {}",
        context.patterns().len(),
        classifier.corpus.samples_per_condition,
        classifier.corpus.noise_rate * 100.0,
        classifier.corpus.dropout_rate * 100.0,
        classifier.corpus.seed
    );
    tracing::info!(
        "📋 {} trees, max depth {}, artifacts in {}",
        classifier.forest.n_trees,
        classifier.forest.max_depth,
        config.artifact_dir()
    );

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - No training will occur");
        return Ok(());
    }

    if let Some(path) = &args.export_corpus {
        let corpus = corpus::generate(context.vocabulary(), context.patterns(), &classifier.corpus)?;
        let file = File::create(path).with_context(|| format!("Failed to create '{}'", path))?;
        corpus.write_csv(context.vocabulary(), BufWriter::new(file))?;
        tracing::info!("📁 Corpus with {} samples written to: {}", corpus.len(), path);
    }

    let (model, report) = TrainedModel::train(&context, &classifier)?;
    let store = LocalArtifactStore::new(config.artifact_dir());
    model.persist(&store, &classifier)?;

    println!(
        "✅ Trained {} trees on {} samples over {} conditions",
        report.trees, report.samples, report.classes
    );
    println!(
        "📊 Training accuracy: {:.2}% (measured on the synthetic corpus)",
        report.training_accuracy * 100.0
    );
    println!("📁 Artifacts saved to: {}", store.base_path().display());
    Ok(())
}
