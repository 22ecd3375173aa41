use anyhow::{Context, Result};
use clap::Parser;

use trigger_cell_clustering::config::{ClusterType, ClusteringConfig};
use trigger_cell_clustering::{data, storage, ClusteringEngine};

#[derive(Parser, Debug)]
#[clap(
    name = "trigger-cell-clustering",
    about = "Two-dimensional clustering of calorimeter trigger cells for one bunch crossing"
)]
struct Cli {
    /// Path to the trigger cells (JSON array or Parquet file)
    #[clap(long)]
    cells: String,

    /// Path to the neighbor map JSON file
    #[clap(long)]
    geometry: String,

    /// Path to a JSON clustering configuration (defaults are used when omitted)
    #[clap(long)]
    config: Option<String>,

    /// Output directory for results
    #[clap(long, default_value = "cluster_results")]
    output_dir: String,

    /// Override the configured algorithm (DR, NN or DR-NN)
    #[clap(long)]
    cluster_type: Option<ClusterType>,

    /// Number of worker threads (0 = use all available cores)
    #[clap(long, default_value = "0")]
    threads: usize,

    /// Verbose logging
    #[clap(long, short)]
    verbose: bool,
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Cli::parse();

    // Configure logging
    let log_level = if args.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::new()
        .filter_level(log_level)
        .format_timestamp_millis()
        .init();

    // Set number of threads
    let num_threads = if args.threads > 0 {
        args.threads
    } else {
        num_cpus::get()
    };

    log::info!("Using {} worker threads", num_threads);
    rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build_global()?;

    // 1. Configuration
    let mut config = match &args.config {
        Some(path) => ClusteringConfig::from_json_file(path)?,
        None => ClusteringConfig::default(),
    };
    if let Some(cluster_type) = args.cluster_type {
        config.cluster_type = cluster_type;
    }
    let engine = ClusteringEngine::new(config).context("invalid clustering configuration")?;

    // 2. Load data
    let cells = data::load_trigger_cells(&args.cells)?;
    let geometry = data::json::load_neighbor_map(&args.geometry)?;

    // 3. Cluster
    let collection = engine
        .run(&cells, &geometry)
        .context("clustering aborted")?;

    log::info!("Found {} clusters", collection.len());

    // 4. Save results
    storage::save_results(&collection, &args.output_dir)?;

    log::info!("Clustering complete. Results saved to {}", args.output_dir);

    Ok(())
}
