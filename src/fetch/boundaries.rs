// src/fetch/boundaries.rs

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use reqwest::Client;
use serde::Deserialize;
use tokio::fs;
use tracing::{debug, info};
use url::Url;

use crate::process::ProvinceSummary;

/// Province and territory polygons the choropleth layer draws.
pub static BOUNDARY_URL: &str =
    "https://raw.githubusercontent.com/codeforgermany/click_that_hood/master/public/data/canada.geojson";

static BOUNDARY_FILENAME: &str = "canada.geojson";

/// Path the boundary file occupies under a cache directory.
pub fn cache_path(cache_dir: impl AsRef<Path>) -> PathBuf {
    cache_dir.as_ref().join(BOUNDARY_FILENAME)
}

/// Download the boundary GeoJSON into `dest_dir`.
/// Returns the full path of the saved file.
pub async fn download(client: &Client, dest_dir: impl AsRef<Path>) -> Result<PathBuf> {
    let url = Url::parse(BOUNDARY_URL)?;
    let dest_path = cache_path(dest_dir);

    if let Some(parent) = dest_path.parent() {
        fs::create_dir_all(parent).await?;
    }

    let resp = client.get(url.as_str()).send().await?.error_for_status()?;
    let bytes = resp.bytes().await?;
    fs::write(&dest_path, &bytes).await?;
    info!(path = %dest_path.display(), bytes = bytes.len(), "downloaded boundary file");

    Ok(dest_path)
}

/// Return the cached boundary file, touching the network only when it is
/// absent. Repeated calls are idempotent.
pub async fn cached_or_fetch(client: &Client, cache_dir: impl AsRef<Path>) -> Result<PathBuf> {
    let cached = cache_path(&cache_dir);
    if cached.exists() {
        debug!(path = %cached.display(), "boundary file already cached");
        return Ok(cached);
    }
    download(client, cache_dir).await
}

#[derive(Debug, Deserialize)]
struct FeatureCollection {
    features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    properties: Properties,
}

#[derive(Debug, Deserialize)]
struct Properties {
    name: String,
}

/// Feature names present in a boundary file.
///
/// The choropleth joins summary rows to polygons by display name, so a
/// summary name missing from the file would render as a hole on the map.
/// This index exists to report that before anything is drawn.
#[derive(Debug)]
pub struct BoundaryIndex {
    names: BTreeSet<String>,
}

impl BoundaryIndex {
    /// Parse `features[].properties.name` out of a GeoJSON file.
    pub fn load(path: &Path) -> Result<BoundaryIndex> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading boundary file {}", path.display()))?;
        let collection: FeatureCollection = serde_json::from_str(&text)
            .with_context(|| format!("parsing boundary file {}", path.display()))?;
        let names = collection
            .features
            .into_iter()
            .map(|feature| feature.properties.name)
            .collect();
        Ok(BoundaryIndex { names })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Display names from the summary with no polygon in the boundary file.
    pub fn missing_names(&self, rows: &[ProvinceSummary]) -> Vec<&'static str> {
        rows.iter()
            .map(|row| row.display_name)
            .filter(|name| !self.names.contains(*name))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::region::Province;
    use std::fs as std_fs;
    use tempfile::tempdir;

    fn summary_row(code: Province, name: &'static str) -> ProvinceSummary {
        ProvinceSummary {
            code,
            display_name: name,
            total_loss: 1.0,
            event_count: 1,
            severity: None,
        }
    }

    fn write_fixture(dir: &Path) -> PathBuf {
        let path = dir.join("fixture.geojson");
        let body = r#"{
            "type": "FeatureCollection",
            "features": [
                {"type": "Feature", "properties": {"name": "Ontario", "cartodb_id": 1}, "geometry": null},
                {"type": "Feature", "properties": {"name": "Quebec", "cartodb_id": 2}, "geometry": null}
            ]
        }"#;
        std_fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn index_reads_feature_names() -> Result<()> {
        let dir = tempdir()?;
        let path = write_fixture(dir.path());
        let index = BoundaryIndex::load(&path)?;
        assert_eq!(index.len(), 2);
        assert!(index.contains("Ontario"));
        assert!(!index.contains("Alberta"));
        Ok(())
    }

    #[test]
    fn missing_names_lists_only_absent_rows() -> Result<()> {
        let dir = tempdir()?;
        let path = write_fixture(dir.path());
        let index = BoundaryIndex::load(&path)?;

        let rows = vec![
            summary_row(Province::Ontario, "Ontario"),
            summary_row(Province::Alberta, "Alberta"),
            summary_row(Province::Quebec, "Quebec"),
        ];
        assert_eq!(index.missing_names(&rows), vec!["Alberta"]);
        Ok(())
    }

    #[test]
    fn malformed_boundary_file_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.geojson");
        std_fs::write(&path, "{ not json").unwrap();
        assert!(BoundaryIndex::load(&path).is_err());
    }

    #[tokio::test]
    async fn cached_file_short_circuits_the_network() -> Result<()> {
        let dir = tempdir()?;
        let cached = cache_path(dir.path());
        std_fs::write(&cached, "cached content")?;

        let client = Client::new();
        let path = cached_or_fetch(&client, dir.path()).await?;
        assert_eq!(path, cached);
        assert_eq!(std_fs::read_to_string(&path)?, "cached content");
        Ok(())
    }
}
