//! CLI entry point for the traffic graph pipeline.
//!
//! Downloads (or loads) a street network, enriches its edges with traffic
//! observations from a CSV file, computes centralities and writes the map,
//! heatmap and edge list exports.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};
use traffic_graph::{
    dataset::load_csv,
    fetch::BasicClient,
    graph::centrality::CentralityOptions,
    infra::overpass::{OsmFileProvider, OverpassClient},
    matching::{AliasTable, Aggregation, EdgeMatcher},
    pipeline::{PipelineConfig, run_pipeline},
    services::street_network::{NetworkType, StreetNetworkProvider},
};

#[derive(Parser)]
#[command(name = "traffic_graph")]
#[command(about = "Map traffic observations onto a city street network", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full pipeline and write every export
    Run {
        /// Traffic observations CSV
        #[arg(long, default_value = "Banglore_traffic_Dataset.csv")]
        csv: PathBuf,

        /// Directory the exports are written to
        #[arg(short, long, default_value = "outputs")]
        output_dir: PathBuf,

        /// Place name to download the street network for
        #[arg(long, default_value = "Bangalore, India")]
        place: String,

        /// Which roads to include in the network
        #[arg(long, value_enum, default_value_t = NetworkType::Drive)]
        network_type: NetworkType,

        /// Load the network from a saved Overpass JSON response instead of downloading it
        #[arg(long)]
        osm_json: Option<PathBuf>,

        /// JSON object of extra road-name aliases, replacing the built-in table
        #[arg(long)]
        aliases: Option<String>,

        /// How multiple observations of one road are combined
        #[arg(long, value_enum, default_value_t = Aggregation::Mean)]
        aggregation: Aggregation,

        /// Number of sampled sources for betweenness centrality
        #[arg(short, long)]
        k: Option<usize>,

        /// Seed for betweenness source sampling
        #[arg(long)]
        seed: Option<u64>,

        /// Prefix for output file names
        #[arg(long, default_value = "bangalore")]
        prefix: String,

        /// Log unmatched and fuzzy-matched road names
        #[arg(short, long, default_value_t = false)]
        verbose: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/traffic_graph.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("traffic_graph.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            csv,
            output_dir,
            place,
            network_type,
            osm_json,
            aliases,
            aggregation,
            k,
            seed,
            prefix,
            verbose,
        } => {
            let dataset = load_csv(&csv)
                .with_context(|| format!("failed to load traffic data from {}", csv.display()))?;
            info!(rows = dataset.len(), path = %csv.display(), "Traffic data loaded");

            let graph = match osm_json {
                Some(path) => {
                    OsmFileProvider::new(path)
                        .fetch_road_graph(&place, network_type)
                        .await?
                }
                None => {
                    OverpassClient::new(BasicClient::new())
                        .fetch_road_graph(&place, network_type)
                        .await?
                }
            };
            info!(
                nodes = graph.node_count(),
                edges = graph.edge_count(),
                "Street network ready"
            );

            let matcher = match aliases {
                Some(path) => EdgeMatcher::new(
                    AliasTable::load(&path)
                        .with_context(|| format!("failed to load aliases from {path}"))?,
                ),
                None => EdgeMatcher::default(),
            };

            let config = PipelineConfig {
                output_dir,
                title: format!("{} Traffic", city_name(&place)),
                prefix,
                aggregation,
                centrality: CentralityOptions { k, seed },
                verbose,
                ..PipelineConfig::default()
            };

            let report = run_pipeline(graph, &dataset, &matcher, &config)?;
            for path in report.outputs.all() {
                info!(path = %path.display(), "Wrote export");
            }
        }
    }

    Ok(())
}

/// First component of a geocoder place name, e.g. "Bangalore" for
/// "Bangalore, India".
fn city_name(place: &str) -> &str {
    place.split(',').next().unwrap_or(place).trim()
}
