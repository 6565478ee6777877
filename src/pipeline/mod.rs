// Reconciliation pipeline: ingestion, processing, and output

pub mod ingestion;
pub mod output;
pub mod processing;
pub mod run;

// Re-export key types and functions from each stage
pub use processing::{conflation, normalize, parser};
pub use run::{BatchOutcome, Pipeline};
