use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

use hotel_match_viz::catalog::{load_snapshot, DataFiles, DummyDataGenerator};
use hotel_match_viz::config::Config;
use hotel_match_viz::logging;
use hotel_match_viz::server::{self, AppState};
use hotel_match_viz::steps::MatchingSteps;
use hotel_match_viz::storage::CsvCatalogRepository;

#[derive(Parser)]
#[command(name = "hotel_match_viz")]
#[command(about = "Demo backend for the hotel matching visualization")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the step endpoints and the frontend
    Serve {
        #[arg(long)]
        host: Option<String>,
        #[arg(short, long)]
        port: Option<u16>,
        /// Directory holding property_data.csv and catalog_data.csv
        #[arg(long)]
        data_dir: Option<PathBuf>,
        /// Directory served under /static
        #[arg(long)]
        static_dir: Option<PathBuf>,
        /// Keep the catalog grid in pool order
        #[arg(long)]
        no_shuffle: bool,
    },
    /// Write a fresh dummy data set
    Generate {
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
        /// Seed for a reproducible data set
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Run every step against the data files and print the bucket sizes
    Triage {
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let _log_guard = logging::init_logging("logs");

    let cli = Cli::parse();
    let mut config = Config::load().context("loading configuration")?;

    match cli.command {
        Commands::Serve {
            host,
            port,
            data_dir,
            static_dir,
            no_shuffle,
        } => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            if let Some(dir) = data_dir {
                config.data.dir = dir;
            }
            if let Some(dir) = static_dir {
                config.server.static_dir = dir;
            }
            if no_shuffle {
                config.display.shuffle_catalog = false;
            }
            serve(config).await?;
        }
        Commands::Generate { out_dir, seed } => {
            let mut generator = match seed {
                Some(seed) => DummyDataGenerator::from_seed(seed),
                None => DummyDataGenerator::from_entropy(),
            };
            let dataset = generator.generate();
            let files = dataset.write_csv(&out_dir)?;
            let summary = dataset.summary();

            println!("✅ Dummy data written");
            println!("   Property: 1 ({})", files.property.display());
            println!("   Catalog: {} ({})", summary.total, files.catalog.display());
            println!("   Correct answers: {}", summary.correct);
            println!("   High similarity (>0.7): {}", summary.high_similarity);
            println!("   Mid similarity (0.3-0.7): {}", summary.mid_similarity);
            println!("   Low similarity (<0.3): {}", summary.low_similarity);
        }
        Commands::Triage { data_dir } => {
            let files = match data_dir {
                Some(dir) => DataFiles::in_dir(dir),
                None => config.data_files(),
            };
            let snapshot = load_snapshot(&files)?;
            let steps = MatchingSteps::default();
            let records = &snapshot.records;

            let pool = steps.pool(records);
            let shortlist = steps.shortlist(records);
            let triage = steps.triage(records);
            let last = steps.finalize(records);

            println!("📊 Triage for property {}", snapshot.property.supplier_property_seq);
            println!("   Pool: {}", pool.total_count);
            println!("   Shortlist: {}", shortlist.selected_count);
            println!(
                "   Triage: {} confirmed / {} rejected / {} pending",
                triage.confirmed.len(),
                triage.rejected.len(),
                triage.pending.len()
            );
            println!(
                "   Final: {} confirmed / {} rejected",
                last.confirmed.len(),
                last.rejected.len()
            );
        }
    }
    Ok(())
}

async fn serve(config: Config) -> Result<()> {
    let repository = Arc::new(CsvCatalogRepository::new(config.data_files()));

    // A missing data set is not fatal; requests retry the load
    match repository.warm() {
        Ok(()) => info!("Catalog data loaded"),
        Err(e) => warn!("Catalog data not loaded yet ({}); run `generate` first", e),
    }

    let mut state = AppState::new(repository);
    state.shuffle_catalog = config.display.shuffle_catalog;
    let addr = config.bind_addr()?;
    server::start_server(state, &config.server.static_dir, addr).await
}
