use clap::{Parser, Subcommand};
use feedback_topology::algo::clustering::Linkage;
use feedback_topology::engine::{
    ClusteringEngine, HttpGenerator, LexiconSentiment, PrecomputedClusters, TfidfClusterer,
};
use feedback_topology::{input, Config, Engines, Pipeline, Result, TopologyError};
use serde::Serialize;
use serde_json::json;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Environment variable read for the generation API key when the config has none.
const API_KEY_ENV: &str = "FEEDBACK_TOPOLOGY_API_KEY";

#[derive(Parser)]
#[command(
    name = "feedback-topology",
    version,
    about = "Turn free-text customer feedback into a named topic hierarchy report"
)]
struct Cli {
    /// Config file (defaults to $FEEDBACK_TOPOLOGY_CONFIG, then the XDG config dir)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full pipeline and write the CSV report
    Run {
        /// Feedback CSV file
        #[arg(short, long)]
        input: PathBuf,
        /// Report destination
        #[arg(short, long, default_value = "output.csv")]
        output: PathBuf,
        /// Column holding the feedback text
        #[arg(long)]
        column: Option<String>,
        /// Precomputed clustering output (JSON) instead of the built-in clusterer
        #[arg(long)]
        clusters: Option<PathBuf>,
        /// Seed keyword lists (JSON array of string arrays)
        #[arg(long)]
        seeds: Option<PathBuf>,
        /// Maximum report rows
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
        max_rows: Option<u64>,
        /// HAC linkage: single, complete, average, ward
        #[arg(long)]
        linkage: Option<String>,
    },
    /// Run only the built-in clusterer and print its output as JSON
    Cluster {
        /// Feedback CSV file
        #[arg(short, long)]
        input: PathBuf,
        /// Column holding the feedback text
        #[arg(long)]
        column: Option<String>,
        /// Seed keyword lists (JSON array of string arrays)
        #[arg(long)]
        seeds: Option<PathBuf>,
        /// HAC linkage: single, complete, average, ward
        #[arg(long)]
        linkage: Option<String>,
    },
    /// Resolve the parent topic name of a cluster id
    Resolve {
        /// Clustering output (JSON) holding the merge table
        #[arg(long)]
        clusters: PathBuf,
        /// Cluster id to resolve
        #[arg(allow_negative_numbers = true)]
        leaf_id: i64,
    },
    /// Print the embedded default configuration
    Config,
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run {
            input,
            output,
            column,
            clusters,
            seeds,
            max_rows,
            linkage,
        } => cmd_run(
            cli.config.as_deref(),
            &input,
            &output,
            Overrides { column, linkage },
            clusters.as_deref(),
            seeds.as_deref(),
            max_rows,
        ),
        Commands::Cluster {
            input,
            column,
            seeds,
            linkage,
        } => cmd_cluster(
            cli.config.as_deref(),
            &input,
            Overrides { column, linkage },
            seeds.as_deref(),
        ),
        Commands::Resolve { clusters, leaf_id } => cmd_resolve(&clusters, leaf_id),
        Commands::Config => {
            println!("{}", feedback_topology::config::embedded_default_json().trim_end());
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

/// Logs go to stderr so stdout carries only JSON.
fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Command-line values that take precedence over the resolved config.
struct Overrides {
    column: Option<String>,
    linkage: Option<String>,
}

fn load_config(path: Option<&Path>, overrides: Overrides) -> Result<Config> {
    let mut config = Config::resolve(path)?;
    if let Some(column) = overrides.column {
        config.input.column = column;
    }
    if let Some(name) = overrides.linkage {
        config.clustering.linkage = Linkage::from_str(&name)
            .ok_or_else(|| TopologyError::Config(format!("unknown linkage '{name}'")))?;
    }
    if config.generation.api_key.is_none() {
        config.generation.api_key = std::env::var(API_KEY_ENV).ok().filter(|k| !k.trim().is_empty());
    }
    Ok(config)
}

fn load_seeds(path: Option<&Path>) -> Result<Option<Vec<Vec<String>>>> {
    let Some(path) = path else {
        return Ok(None);
    };
    if !path.exists() {
        return Err(TopologyError::InputNotFound(path.to_path_buf()));
    }
    let seeds: Vec<Vec<String>> = serde_json::from_str(&std::fs::read_to_string(path)?)?;
    Ok(Some(seeds))
}

fn cmd_run(
    config_path: Option<&Path>,
    input_path: &Path,
    output: &Path,
    overrides: Overrides,
    clusters: Option<&Path>,
    seeds: Option<&Path>,
    max_rows: Option<u64>,
) -> Result<()> {
    let mut config = load_config(config_path, overrides)?;
    if let Some(n) = max_rows {
        config.report.max_rows = n as usize;
    }
    input::validate_path(input_path, &config.input.extension)?;
    let seeds = load_seeds(seeds)?;

    let clustering: Box<dyn ClusteringEngine> = match clusters {
        Some(path) => Box::new(PrecomputedClusters::from_path(path)?),
        None => Box::new(TfidfClusterer::new(config.clustering.clone())),
    };
    let sentiment = LexiconSentiment::new();
    let generation = HttpGenerator::new(config.generation.clone())?;
    let engines = Engines {
        clustering: clustering.as_ref(),
        sentiment: &sentiment,
        generation: &generation,
    };

    let mut pipeline = Pipeline::new(engines, config);
    if let Some(seeds) = seeds {
        pipeline = pipeline.with_seeds(seeds);
    }
    let summary = pipeline.run_file(input_path, output)?;
    print_json(&json!({
        "output": output.display().to_string(),
        "summary": summary,
    }))
}

fn cmd_cluster(
    config_path: Option<&Path>,
    input_path: &Path,
    overrides: Overrides,
    seeds: Option<&Path>,
) -> Result<()> {
    let config = load_config(config_path, overrides)?;
    let feedback = input::load_feedback(input_path, &config.input.column, &config.input.extension)?;
    let seeds = load_seeds(seeds)?;
    let output = TfidfClusterer::new(config.clustering).cluster(&feedback, seeds.as_deref())?;
    print_json(&output)
}

fn cmd_resolve(clusters: &Path, leaf_id: i64) -> Result<()> {
    let engine = PrecomputedClusters::from_path(clusters)?;
    let hierarchy = &engine.output().hierarchy;
    print_json(&json!({
        "leaf_id": leaf_id,
        "parent_name": hierarchy.resolve(leaf_id),
        "parent_id": hierarchy.enclosing(leaf_id).map(|node| node.parent_id),
    }))
}
