// Pipeline output: GeoJSON catalog, review list and run summary

pub mod geojson;
pub mod summary;

use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::Path;
use tracing::info;

use crate::error::Result;
use crate::observability::metrics;

pub use geojson::{render_catalog, station_feature, Feature, FeatureCollection, Geometry, RenderedCatalog};
pub use summary::{ProviderSummary, RunSummary};

/// Serialize with four-space indentation.
pub fn to_pretty_json<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut bytes, formatter);
    value.serialize(&mut serializer)?;
    bytes.push(b'\n');
    Ok(bytes)
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Write a JSON document, creating parent directories. Returns the
/// SHA-256 of the bytes written.
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<String> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let bytes = to_pretty_json(value)?;
    fs::write(path, &bytes)?;
    let digest = sha256_hex(&bytes);

    info!(path = %path.display(), bytes = bytes.len(), sha256 = %digest, "Wrote output");
    Ok(digest)
}

/// Write both collections. Returns the digest of the stations document.
pub fn write_catalog(catalog: &RenderedCatalog, stations_path: &Path, review_path: &Path) -> Result<String> {
    let digest = write_json(stations_path, &catalog.stations)?;
    metrics::output::stations_written(catalog.stations.len());

    write_json(review_path, &catalog.review)?;
    metrics::output::review_written(catalog.review.len());

    Ok(digest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn digest_matches_written_bytes() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("doc.json");

        let digest = write_json(&path, &serde_json::json!({"a": 1})).unwrap();
        let written = fs::read(&path).unwrap();

        assert_eq!(digest, sha256_hex(&written));
        assert_eq!(String::from_utf8(written).unwrap(), "{\n    \"a\": 1\n}\n");
    }

    #[test]
    fn sha256_of_empty_input() {
        assert_eq!(
            sha256_hex(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn empty_catalog_writes_empty_collections() {
        let dir = TempDir::new().unwrap();
        let catalog = render_catalog(Vec::new());
        let stations = dir.path().join("stations.geojson");
        let review = dir.path().join("review.geojson");

        write_catalog(&catalog, &stations, &review).unwrap();

        let parsed: serde_json::Value = serde_json::from_slice(&fs::read(&review).unwrap()).unwrap();
        assert_eq!(parsed, serde_json::json!({"type": "FeatureCollection", "features": []}));
    }
}
