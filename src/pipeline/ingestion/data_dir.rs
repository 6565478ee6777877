use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::domain::Station;
use crate::error::{ReconcileError, Result};
use crate::observability::metrics;
use crate::pipeline::processing::parser::Parser;

/// Where one provider's scrape lives in the data directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderSource {
    /// A single `<provider>.json` document.
    File(PathBuf),
    /// A `<provider>/` directory of dated snapshots; the newest non-empty one is used.
    Snapshots(PathBuf),
}

/// Stations loaded from one provider.
#[derive(Debug, Clone)]
pub struct ProviderInput {
    pub provider: String,
    /// The file the stations came from, `None` when nothing usable was found.
    pub file: Option<PathBuf>,
    pub stations: Vec<Station>,
}

/// Map provider name to its source, in provider-name order. A snapshot
/// directory shadows a file of the same provider name.
pub fn discover_providers(data_dir: &Path) -> Result<BTreeMap<String, ProviderSource>> {
    let mut providers = BTreeMap::new();

    for entry in fs::read_dir(data_dir)? {
        let path = entry?.path();
        let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if file_name.starts_with('.') {
            continue;
        }

        if path.is_dir() {
            providers.insert(file_name.to_string(), ProviderSource::Snapshots(path.clone()));
        } else if let Some(provider) = file_name.strip_suffix(".json") {
            providers
                .entry(provider.to_string())
                .or_insert_with(|| ProviderSource::File(path.clone()));
        }
    }

    Ok(providers)
}

/// Load every provider in the data directory. The concatenated station
/// order (provider name, then record order) is stable across runs.
pub fn load_data_dir(data_dir: &Path, parser: &dyn Parser) -> Result<Vec<ProviderInput>> {
    if !data_dir.is_dir() {
        return Err(ReconcileError::Config(format!(
            "data directory {} does not exist",
            data_dir.display()
        )));
    }

    let providers = discover_providers(data_dir)?;
    info!(data_dir = %data_dir.display(), providers = providers.len(), "Loading provider data");

    let mut inputs = Vec::with_capacity(providers.len());
    for (provider, source) in providers {
        let input = load_provider(&provider, &source, parser)?;
        metrics::ingestion::records_parsed(&provider, input.stations.len());
        info!(provider = %provider, stations = input.stations.len(), "Loaded provider");
        inputs.push(input);
    }

    Ok(inputs)
}

pub fn load_provider(provider: &str, source: &ProviderSource, parser: &dyn Parser) -> Result<ProviderInput> {
    let chosen = match source {
        ProviderSource::File(path) => read_records(provider, path).map(|records| (path.clone(), records)),
        ProviderSource::Snapshots(dir) => newest_snapshot(provider, dir)?,
    };

    let Some((file, records)) = chosen else {
        return Ok(ProviderInput {
            provider: provider.to_string(),
            file: None,
            stations: Vec::new(),
        });
    };

    let stations = parser.parse(&file.display().to_string(), records)?;
    metrics::ingestion::file_loaded(provider);

    Ok(ProviderInput {
        provider: provider.to_string(),
        file: Some(file),
        stations,
    })
}

fn newest_snapshot(provider: &str, dir: &Path) -> Result<Option<(PathBuf, Vec<Value>)>> {
    let mut snapshots: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file() && path.extension().map_or(false, |ext| ext == "json"))
        .collect();
    snapshots.sort_by(|a, b| b.file_name().cmp(&a.file_name()));

    for snapshot in snapshots {
        match read_records(provider, &snapshot) {
            Some(records) if !records.is_empty() => return Ok(Some((snapshot, records))),
            _ => debug!(provider, file = %snapshot.display(), "Snapshot empty, trying older one"),
        }
    }

    warn!(provider, dir = %dir.display(), "No usable snapshot found");
    Ok(None)
}

/// Read a provider document. Unreadable or unparseable files are skipped
/// with a warning; `null` reads as no records.
fn read_records(provider: &str, path: &Path) -> Option<Vec<Value>> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) => {
            warn!(provider, file = %path.display(), error = %e, "Failed to read provider file");
            metrics::ingestion::file_skipped(provider);
            return None;
        }
    };

    match serde_json::from_str::<Value>(&contents) {
        Ok(Value::Array(records)) => Some(records),
        Ok(Value::Null) => Some(Vec::new()),
        Ok(other) => Some(vec![other]),
        Err(e) => {
            warn!(provider, file = %path.display(), error = %e, "Provider file is not valid JSON, skipping");
            metrics::ingestion::file_skipped(provider);
            None
        }
    }
}
