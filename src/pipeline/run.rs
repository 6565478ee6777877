use chrono::Utc;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::config::Config;
use crate::domain::Station;
use crate::error::Result;
use crate::pipeline::ingestion::{load_data_dir, ProviderInput};
use crate::pipeline::output::{self, render_catalog, ProviderSummary, RenderedCatalog, RunSummary};
use crate::pipeline::processing::conflation::{Reconciler, Reconciliation};
use crate::pipeline::processing::parser::StationParser;

/// Result of reconciling an in-memory batch, before anything is written.
#[derive(Debug, Clone)]
pub struct BatchOutcome {
    pub input_stations: usize,
    pub reconciliation: Reconciliation,
    pub catalog: RenderedCatalog,
}

pub struct Pipeline;

impl Pipeline {
    /// Reconcile and render a batch of stations.
    pub fn reconcile_batch(stations: Vec<Station>, reconciler: &Reconciler) -> Result<BatchOutcome> {
        let input_stations = stations.len();
        let reconciliation = reconciler.reconcile(stations)?;
        let catalog = render_catalog(reconciliation.stations.clone());

        Ok(BatchOutcome {
            input_stations,
            reconciliation,
            catalog,
        })
    }

    /// Load the data directory, reconcile, and write the catalog, the review
    /// list and the run summary.
    #[instrument(skip(config), fields(data_dir = %config.input.data_dir.display()))]
    pub fn run(config: &Config) -> Result<RunSummary> {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        info!(%run_id, "🚀 Starting reconciliation run");

        let inputs = load_data_dir(&config.input.data_dir, &StationParser)?;
        let providers: Vec<ProviderSummary> = inputs.iter().map(ProviderSummary::from).collect();
        let stations: Vec<Station> = inputs.into_iter().flat_map(|input: ProviderInput| input.stations).collect();
        info!(stations = stations.len(), providers = providers.len(), "📥 Loaded stations");

        let reconciler = Reconciler::new(&config.pass_options(), config.reconcile.network_conflict);
        let outcome = Self::reconcile_batch(stations, &reconciler)?;
        info!(
            output = outcome.reconciliation.stations.len(),
            merges = outcome.reconciliation.total_merges(),
            review = outcome.catalog.review.len(),
            "🔧 Reconciled stations"
        );

        let stations_sha256 = output::write_catalog(&outcome.catalog, &config.stations_path(), &config.review_path())?;

        let summary = RunSummary {
            run_id,
            started_at,
            finished_at: Utc::now(),
            providers,
            input_stations: outcome.input_stations,
            output_stations: outcome.catalog.stations.len(),
            review_stations: outcome.catalog.review.len(),
            total_merges: outcome.reconciliation.total_merges(),
            passes: outcome.reconciliation.passes,
            stations_sha256,
        };
        output::write_json(&config.summary_path(), &summary)?;
        info!(%run_id, "✅ Reconciliation run complete");

        Ok(summary)
    }
}
