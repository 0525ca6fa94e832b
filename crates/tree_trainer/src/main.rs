//! Entropy tree CLI
//!
//! Builds an information-gain decision tree from a CSV table and prints it
//! as an indented outline. Optionally classifies a second table and writes
//! the predictions as CSV.

use anyhow::{Context, Result};
use clap::Parser;
use entropy_tree_trainer::{
    accuracy, classify_table, predict, Bound, BuilderConfig, CsvOptions, Dataset, FeatureTable,
    TreeBuilder,
};
use std::io;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "entropy-tree")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Build an entropy decision tree from a CSV table", long_about = None)]
struct Args {
    /// Input CSV dataset path (header row required)
    #[arg(short, long)]
    input: PathBuf,

    /// Label (class) column name
    #[arg(short, long, default_value = "species")]
    label: String,

    /// Feature columns to use, in order (default: every non-label column)
    #[arg(long, value_delimiter = ',')]
    columns: Option<Vec<String>>,

    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Threshold step granularity
    #[arg(long)]
    step: Option<f64>,

    /// Lower bound of the threshold range for every feature
    #[arg(long)]
    low: Option<f64>,

    /// Upper bound (exclusive) of the threshold range for every feature
    #[arg(long)]
    high: Option<f64>,

    /// Maximum tree depth
    #[arg(long)]
    max_depth: Option<usize>,

    /// Write the rendered tree to this file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// CSV table to classify with the built tree
    #[arg(long, requires = "predictions")]
    predict: Option<PathBuf>,

    /// Output CSV for predictions (must not exist)
    #[arg(long, requires = "predict")]
    predictions: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Setup logging
    let log_level = if args.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to set tracing subscriber: {e}"))?;

    info!("Entropy Tree Builder v{}", env!("CARGO_PKG_VERSION"));

    let config = load_config(&args)?;
    info!("Build configuration:");
    info!("  Step: {}", config.step);
    info!(
        "  Default bound: [{}, {})",
        config.default_bound.low, config.default_bound.high
    );
    for (column, bound) in &config.bounds {
        info!("  Bound {}: [{}, {})", column, bound.low, bound.high);
    }
    info!("  Max depth: {}", config.max_depth);

    // Load dataset
    let mut options = CsvOptions::new(args.label.as_str());
    if let Some(columns) = &args.columns {
        options = options.with_columns(columns.iter().cloned());
    }

    info!("Loading dataset from: {}", args.input.display());
    let dataset = Dataset::from_csv(&args.input, &options).context("Failed to load dataset")?;

    info!(
        "Loaded {} samples with {} features, classes: {}",
        dataset.len(),
        dataset.feature_count(),
        dataset.classes().join(", ")
    );

    for (name, (min, max)) in dataset.feature_names.iter().zip(dataset.feature_stats()) {
        info!("  {}: min={}, max={}", name, min, max);
        let bound = config.bound_for(name);
        if min < bound.low || max >= bound.high {
            warn!(
                "  {} values fall outside the threshold range [{}, {})",
                name, bound.low, bound.high
            );
        }
    }

    // Build tree
    let started = Instant::now();
    let tree = TreeBuilder::new(&dataset, config)?
        .build()
        .context("Failed to build tree")?;
    info!(
        "Tree produced in {:.3} seconds ({} nodes, {} leaves, depth {})",
        started.elapsed().as_secs_f64(),
        tree.len(),
        tree.leaf_count(),
        tree.depth()
    );

    match &args.output {
        Some(path) => {
            let file = predict::create_output(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            predict::write_tree(io::BufWriter::new(file), &tree)
                .context("Failed to write tree")?;
            info!("Tree written to: {}", path.display());
        }
        None => predict::write_tree(io::stdout().lock(), &tree)?,
    }

    if let (Some(input), Some(output)) = (&args.predict, &args.predictions) {
        info!("Classifying rows from: {}", input.display());
        let table =
            FeatureTable::from_csv(input, &options).context("Failed to load table to classify")?;
        let predictions = classify_table(&tree, &table).context("Failed to classify table")?;

        let file = predict::create_output(output)
            .with_context(|| format!("Failed to create {}", output.display()))?;
        predict::write_predictions(io::BufWriter::new(file), &predictions)
            .context("Failed to write predictions")?;

        info!(
            "Wrote {} predictions to: {}",
            predictions.len(),
            output.display()
        );
        if let Some(acc) = accuracy(&predictions) {
            info!("  Accuracy: {:.2}%", acc * 100.0);
        }
    }

    Ok(())
}

/// Defaults, then the config file, then environment, then flags
fn load_config(args: &Args) -> Result<BuilderConfig> {
    let config = match &args.config {
        Some(path) => BuilderConfig::load_from_file(path)?,
        None => BuilderConfig::default(),
    };
    let mut config = config
        .apply_env()
        .context("Invalid environment override")?;

    if let Some(step) = args.step {
        config.step = step;
    }
    if let Some(low) = args.low {
        config.default_bound = Bound::new(low, config.default_bound.high);
    }
    if let Some(high) = args.high {
        config.default_bound = Bound::new(config.default_bound.low, high);
    }
    if let Some(max_depth) = args.max_depth {
        config.max_depth = max_depth;
    }

    config.validate()?;
    Ok(config)
}
