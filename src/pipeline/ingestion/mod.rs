// Pipeline ingestion: discovering and loading provider scrapes from the data directory

pub mod data_dir;

pub use data_dir::{discover_providers, load_data_dir, load_provider, ProviderInput, ProviderSource};
