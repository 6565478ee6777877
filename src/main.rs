use anyhow::Context;
use clap::{Parser, Subcommand};
use std::fs;
use std::path::PathBuf;
use tracing::{error, info};

use ev_reconcile::config::Config;
use ev_reconcile::constants::DEFAULT_CONFIG_FILE;
use ev_reconcile::logging::init_logging;
use ev_reconcile::observability;
use ev_reconcile::pipeline::ingestion::load_data_dir;
use ev_reconcile::pipeline::parser::StationParser;
use ev_reconcile::pipeline::processing::conflation::{check_preconditions, Reconciler};
use ev_reconcile::pipeline::Pipeline;

#[derive(Parser)]
#[command(name = "ev_reconcile")]
#[command(about = "Reconciles scraped EV charging station listings into one catalog")]
#[command(version = "0.1.0")]
struct Cli {
    /// Path to the TOML config file
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load every provider, reconcile, and write the catalog
    Run {
        /// Directory holding provider scrapes (overrides config and env)
        #[arg(long)]
        data_dir: Option<PathBuf>,
        /// Directory the catalog is written to (overrides config and env)
        #[arg(long)]
        output_dir: Option<PathBuf>,
        /// Also write Prometheus metrics for the run to this file
        #[arg(long)]
        metrics_out: Option<PathBuf>,
    },
    /// Load and validate provider data without reconciling
    Check {
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },
    /// Print the matching passes in the order they run
    Passes,
}

fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let cli = Cli::parse();
    let (config, source) = Config::load_with_source(&cli.config)?;
    let config = config.with_env_overrides();
    let _guard = init_logging(&config.logging.dir)?;
    source.log();

    match cli.command {
        Commands::Run {
            data_dir,
            output_dir,
            metrics_out,
        } => {
            let config = config.with_overrides(data_dir, output_dir);
            if metrics_out.is_some() {
                observability::init().map_err(|e| anyhow::anyhow!("{}", e))?;
            }

            let summary = match Pipeline::run(&config) {
                Ok(summary) => summary,
                Err(e) => {
                    error!("Reconciliation failed: {}", e);
                    return Err(e).context("reconciliation run failed");
                }
            };

            println!("\n📊 Reconciliation results (run {}):", summary.run_id);
            println!("   Input stations: {}", summary.input_stations);
            println!("   Output stations: {}", summary.output_stations);
            println!("   Needing review: {}", summary.review_stations);
            for pass in &summary.passes {
                println!(
                    "   {:<28} candidates {:>6}  merges {:>6}  output {:>6}",
                    pass.name, pass.candidates, pass.merges, pass.output
                );
            }
            println!("   Catalog: {} (sha256 {})", config.stations_path().display(), summary.stations_sha256);

            if let Some(path) = metrics_out {
                let rendered = observability::render().unwrap_or_default();
                fs::write(&path, rendered)
                    .with_context(|| format!("failed to write metrics to {}", path.display()))?;
                info!(path = %path.display(), "Wrote metrics");
            }
        }
        Commands::Check { data_dir } => {
            let config = config.with_overrides(data_dir, None);
            let inputs = load_data_dir(&config.input.data_dir, &StationParser)?;

            let mut total = 0;
            for input in &inputs {
                check_preconditions(&input.stations)
                    .with_context(|| format!("provider {} has unusable records", input.provider))?;
                println!("   {:<24} {:>6} stations", input.provider, input.stations.len());
                total += input.stations.len();
            }
            println!("✅ {} providers, {} stations ready to reconcile", inputs.len(), total);
        }
        Commands::Passes => {
            let reconciler = Reconciler::new(&config.pass_options(), config.reconcile.network_conflict);
            for (index, pass) in reconciler.passes().iter().enumerate() {
                println!("{:>2}. {}", index + 1, pass.name);
            }
            println!("Network conflicts: {:?}", reconciler.policy());
        }
    }

    Ok(())
}
