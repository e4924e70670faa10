use anyhow::{Context as AnyhowContext, Result};
use clap::{Args, Parser, Subcommand};
use contextionary_classifier::{Classifier, ClassifierConfig};
use contextionary_model::{ModelBuilder, ModelConfig, ModelSnapshot};
use contextionary_protocol::ClassifyRequest;
use contextionary_store::MemoryStore;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "contextionary")]
#[command(about = "Build a topic model from a phrase store and classify text against it", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors (stdout is reserved for JSON)
    #[arg(long, global = true)]
    quiet: bool,

    /// TOML file with [model] and [classifier] tables
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run every build stage and write the derived relations back to the store
    Build(BuildArgs),

    /// Rank contexts for a text and locate its keywords
    Classify(ClassifyArgs),
}

#[derive(Args)]
struct BuildArgs {
    /// JSON store to read
    #[arg(long)]
    store: PathBuf,

    /// Where to write the rebuilt store (defaults to --store)
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Args)]
struct ClassifyArgs {
    /// JSON store holding a built model
    #[arg(long)]
    store: PathBuf,

    /// Text to classify
    #[arg(long, conflicts_with = "encoded", required_unless_present = "encoded")]
    text: Option<String>,

    /// Text with '_' standing in for spaces
    #[arg(long)]
    encoded: Option<String>,

    /// Distinct score levels to return (ties included)
    #[arg(long)]
    top_count: Option<usize>,

    /// Longest phrase extracted from the text
    #[arg(long)]
    phrase_max_length: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FileConfig {
    model: ModelConfig,
    classifier: ClassifierConfig,
}

impl FileConfig {
    fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: Self = toml::from_str(&raw)
            .with_context(|| format!("Invalid config {}", path.display()))?;
        config.model.validate()?;
        config.classifier.validate()?;
        Ok(config)
    }
}

#[derive(Debug, Serialize)]
struct BuildSummary {
    contexts: usize,
    independent_contexts: usize,
    phrases: usize,
    lexical_memberships: usize,
    related_pairs: usize,
    weights: usize,
    supplementary: bool,
    store: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();

    let config = FileConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Build(args) => run_build(args, config).await?,
        Commands::Classify(args) => run_classify(args, config).await?,
    }

    Ok(())
}

async fn run_build(args: BuildArgs, config: FileConfig) -> Result<()> {
    let mut store = MemoryStore::load(&args.store)
        .await
        .with_context(|| format!("Failed to load store {}", args.store.display()))?;

    let model = ModelBuilder::new(&mut store, config.model)
        .build()
        .context("Model build failed")?;

    let output = args.output.unwrap_or(args.store);
    store
        .save(&output)
        .await
        .with_context(|| format!("Failed to save store {}", output.display()))?;

    let derived = store.derived();
    let summary = BuildSummary {
        contexts: model.taxonomy.len(),
        independent_contexts: model.taxonomy.dimension(),
        phrases: model.catalog.len(),
        lexical_memberships: derived.context_phrases.len(),
        related_pairs: derived.related_phrases.len(),
        weights: derived.phrase_weights.len(),
        supplementary: model.supplementary.is_some(),
        store: output,
    };
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

async fn run_classify(args: ClassifyArgs, config: FileConfig) -> Result<()> {
    let store = MemoryStore::load(&args.store)
        .await
        .with_context(|| format!("Failed to load store {}", args.store.display()))?;
    let snapshot = ModelSnapshot::from_store(&store).context("Store holds no usable model")?;
    let classifier = Classifier::new(Arc::new(snapshot), config.classifier)?;

    let mut request = match (args.text, args.encoded) {
        (Some(text), _) => ClassifyRequest::new(text),
        (None, Some(encoded)) => ClassifyRequest::from_encoded(&encoded),
        (None, None) => anyhow::bail!("Either --text or --encoded is required"),
    };
    request.top_count = args.top_count;
    request.phrase_max_length = args.phrase_max_length;

    let response = classifier.handle(&request)?;
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}
