//! Run metrics for the reconciliation pipeline.
//!
//! Recording functions are grouped by stage. Nothing is exported over the
//! network; `render` produces Prometheus text for `--metrics-out`.

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::fmt;
use std::sync::OnceLock;
use tracing::{debug, info};

/// Every metric name the pipeline emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricName {
    // Ingestion
    IngestionFilesLoaded,
    IngestionFilesSkipped,
    IngestionRecordsParsed,

    // Reconciliation
    ReconcileStationsIn,
    ReconcileStationsOut,
    ReconcilePassCandidates,
    ReconcilePassMerges,
    ReconcileNetworkConflicts,

    // Output
    OutputStationsWritten,
    OutputReviewWritten,
}

impl MetricName {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricName::IngestionFilesLoaded => "ev_ingestion_files_loaded_total",
            MetricName::IngestionFilesSkipped => "ev_ingestion_files_skipped_total",
            MetricName::IngestionRecordsParsed => "ev_ingestion_records_parsed_total",
            MetricName::ReconcileStationsIn => "ev_reconcile_stations_in",
            MetricName::ReconcileStationsOut => "ev_reconcile_stations_out",
            MetricName::ReconcilePassCandidates => "ev_reconcile_pass_candidates",
            MetricName::ReconcilePassMerges => "ev_reconcile_pass_merges_total",
            MetricName::ReconcileNetworkConflicts => "ev_reconcile_network_conflicts_total",
            MetricName::OutputStationsWritten => "ev_output_stations_written",
            MetricName::OutputReviewWritten => "ev_output_review_written",
        }
    }

    pub fn all_metrics() -> impl Iterator<Item = MetricName> {
        [
            MetricName::IngestionFilesLoaded,
            MetricName::IngestionFilesSkipped,
            MetricName::IngestionRecordsParsed,
            MetricName::ReconcileStationsIn,
            MetricName::ReconcileStationsOut,
            MetricName::ReconcilePassCandidates,
            MetricName::ReconcilePassMerges,
            MetricName::ReconcileNetworkConflicts,
            MetricName::OutputStationsWritten,
            MetricName::OutputReviewWritten,
        ]
        .into_iter()
    }
}

impl fmt::Display for MetricName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Install the Prometheus recorder. Calling it twice is a no-op.
pub fn init() -> Result<(), Box<dyn std::error::Error>> {
    if METRICS_HANDLE.get().is_some() {
        debug!("Metrics recorder already installed");
        return Ok(());
    }

    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| format!("Failed to install Prometheus recorder: {}", e))?;
    METRICS_HANDLE.set(handle).ok();

    info!("Metrics system initialized");
    Ok(())
}

/// Prometheus text for everything recorded so far, if `init` ran.
pub fn render() -> Option<String> {
    METRICS_HANDLE.get().map(|handle| handle.render())
}

// ============================================================================
// Ingestion Metrics
// ============================================================================

pub mod ingestion {
    use super::MetricName;

    pub fn file_loaded(provider: &str) {
        ::metrics::counter!(MetricName::IngestionFilesLoaded.as_str(), "provider" => provider.to_string()).increment(1);
    }

    /// A file was unreadable or unparseable and contributed nothing.
    pub fn file_skipped(provider: &str) {
        ::metrics::counter!(MetricName::IngestionFilesSkipped.as_str(), "provider" => provider.to_string()).increment(1);
    }

    pub fn records_parsed(provider: &str, count: usize) {
        ::metrics::counter!(MetricName::IngestionRecordsParsed.as_str(), "provider" => provider.to_string())
            .increment(count as u64);
    }
}

// ============================================================================
// Reconciliation Metrics
// ============================================================================

pub mod reconcile {
    use super::MetricName;

    pub fn stations_in(count: usize) {
        ::metrics::gauge!(MetricName::ReconcileStationsIn.as_str()).set(count as f64);
    }

    pub fn stations_out(count: usize) {
        ::metrics::gauge!(MetricName::ReconcileStationsOut.as_str()).set(count as f64);
    }

    pub fn pass_completed(pass: &str, candidates: usize, merges: usize) {
        ::metrics::gauge!(MetricName::ReconcilePassCandidates.as_str(), "pass" => pass.to_string())
            .set(candidates as f64);
        ::metrics::counter!(MetricName::ReconcilePassMerges.as_str(), "pass" => pass.to_string())
            .increment(merges as u64);
    }

    pub fn network_conflict() {
        ::metrics::counter!(MetricName::ReconcileNetworkConflicts.as_str()).increment(1);
    }
}

// ============================================================================
// Output Metrics
// ============================================================================

pub mod output {
    use super::MetricName;

    pub fn stations_written(count: usize) {
        ::metrics::gauge!(MetricName::OutputStationsWritten.as_str()).set(count as f64);
    }

    pub fn review_written(count: usize) {
        ::metrics::gauge!(MetricName::OutputReviewWritten.as_str()).set(count as f64);
    }
}
