use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use email_network_analyzer::data;
use email_network_analyzer::graph::{build_graph_parallel, RawRecord};
use email_network_analyzer::{analyze_graph, storage, viz, AnalysisConfig, CentralityKind};

#[derive(Parser, Debug)]
#[clap(
    name = "email-network-analyzer",
    about = "Centrality and community analysis of email communication networks"
)]
struct Cli {
    /// Path to input file (CSV or Parquet edge list with From/To columns)
    #[clap(long)]
    input: PathBuf,

    /// Treat the input as a CSV of raw messages in a `message` column
    #[clap(long)]
    raw_messages: bool,

    /// Where to cache the edge list parsed from raw messages
    #[clap(long, default_value = "email_edges.csv")]
    cache: PathBuf,

    /// Output directory for results
    #[clap(long, default_value = "network_results")]
    output_dir: PathBuf,

    /// Number of core-community nodes to keep
    #[clap(long, default_value = "150")]
    top_k: usize,

    /// Number of top nodes to label
    #[clap(long, default_value = "15")]
    label_count: usize,

    /// Centrality measure used to rank the core community
    #[clap(long, value_enum, default_value = "in-degree")]
    ranking: CentralityKind,

    /// Eigenvector power iteration tolerance
    #[clap(long, default_value = "1e-6")]
    tolerance: f64,

    /// Eigenvector power iteration cap
    #[clap(long, default_value = "1000")]
    max_iterations: usize,

    /// Louvain aggregation pass cap
    #[clap(long, default_value = "100")]
    max_passes: usize,

    /// Keep the last eigenvector iterate if power iteration does not converge
    #[clap(long)]
    accept_unconverged: bool,

    /// Number of worker threads (0 = use all available cores)
    #[clap(long, default_value = "0")]
    threads: usize,

    /// Verbose logging
    #[clap(long, short)]
    verbose: bool,
}

impl Cli {
    fn analysis_config(&self) -> AnalysisConfig {
        AnalysisConfig {
            top_k: self.top_k,
            label_count: self.label_count,
            ranking: self.ranking,
            eigenvector_tolerance: self.tolerance,
            eigenvector_max_iterations: self.max_iterations,
            louvain_max_passes: self.max_passes,
            accept_unconverged: self.accept_unconverged,
        }
    }
}

/// Load records, parsing raw messages once and reusing the cached edge list after
fn load_records(args: &Cli) -> Result<Vec<RawRecord>> {
    if !args.raw_messages {
        return data::load_edge_list(&args.input);
    }

    if args.cache.exists() {
        log::info!("Cleaned data file found at {}; skipping parsing", args.cache.display());
        return data::load_edge_list(&args.cache);
    }

    let records = data::load_message_records(&args.input)?;
    data::write_edge_list(&args.cache, &records)?;
    Ok(records)
}

fn run(args: &Cli, config: &AnalysisConfig) -> Result<()> {
    // 1. Load and clean records
    let records = load_records(args)?;
    let (records, cleaning) = data::clean_records(records);

    // 2. Build graph
    let graph = build_graph_parallel(&records)?;
    drop(records);
    log::info!(
        "Graph uses about {} MiB",
        graph.memory_usage() / (1024 * 1024)
    );

    // 3. Centrality, communities and core subgraph
    let report = analyze_graph(graph, config)?;

    // 4. Save results and the render handoff
    storage::save_results(&report, Some(&cleaning), &args.output_dir)?;
    viz::write_core_network(&report.core, &args.output_dir)?;

    Ok(())
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

    let config = args.analysis_config();
    config.validate()?;

    log::info!("Starting email network analysis");
    log::info!("Input: {}", args.input.display());
    log::info!("Output: {}", args.output_dir.display());

    if let Err(err) = run(&args, &config) {
        log::error!("Analysis failed: {:#}", err);
        return Err(err);
    }

    log::info!("Analysis complete. Results saved to {}", args.output_dir.display());

    Ok(())
}
