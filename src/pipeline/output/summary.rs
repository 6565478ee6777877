use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::pipeline::ingestion::ProviderInput;
use crate::pipeline::processing::conflation::PassReport;

/// Per-provider line of the run summary.
#[derive(Debug, Clone, Serialize)]
pub struct ProviderSummary {
    pub provider: String,
    pub file: Option<String>,
    pub stations: usize,
}

impl From<&ProviderInput> for ProviderSummary {
    fn from(input: &ProviderInput) -> Self {
        Self {
            provider: input.provider.clone(),
            file: input.file.as_ref().map(|path| path.display().to_string()),
            stations: input.stations.len(),
        }
    }
}

/// Record of one reconciliation run, written next to the catalog.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub providers: Vec<ProviderSummary>,
    pub input_stations: usize,
    pub output_stations: usize,
    pub review_stations: usize,
    pub total_merges: usize,
    pub passes: Vec<PassReport>,
    /// Hex SHA-256 of the stations document as written.
    pub stations_sha256: String,
}
