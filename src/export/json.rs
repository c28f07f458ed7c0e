//! Static JSON export.
//!
//! Writes the files the JSON backend and the fallback chain read:
//! `businesses.json`, `reviews.json`, `reports.json` and the combined
//! `directory.json`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::info;
use serde::Serialize;

use super::types::ExportReport;
use crate::storage::{DirectorySnapshot, DirectoryStore};

pub const BUSINESSES_FILE: &str = "businesses.json";
pub const REVIEWS_FILE: &str = "reviews.json";
pub const REPORTS_FILE: &str = "reports.json";
pub const DIRECTORY_FILE: &str = "directory.json";

/// Exports the whole store into `output_dir` as pretty-printed JSON.
pub async fn export_directory(store: &dyn DirectoryStore, output_dir: &Path) -> Result<ExportReport> {
    let (businesses, reviews, reports) = futures::try_join!(
        store.all_businesses(),
        store.all_reviews(),
        store.all_reports()
    )
    .with_context(|| format!("Failed to read from {} backend", store.backend_name()))?;

    tokio::fs::create_dir_all(output_dir)
        .await
        .with_context(|| format!("Failed to create output directory: {}", output_dir.display()))?;

    let snapshot = DirectorySnapshot {
        businesses,
        reviews,
        reports,
    };

    let mut files = Vec::new();
    files.push(write_json(output_dir, BUSINESSES_FILE, &snapshot.businesses).await?);
    files.push(write_json(output_dir, REVIEWS_FILE, &snapshot.reviews).await?);
    files.push(write_json(output_dir, REPORTS_FILE, &snapshot.reports).await?);
    files.push(write_json(output_dir, DIRECTORY_FILE, &snapshot).await?);

    info!(
        "Exported {} businesses, {} reviews, {} reports to {}",
        snapshot.businesses.len(),
        snapshot.reviews.len(),
        snapshot.reports.len(),
        output_dir.display()
    );

    Ok(ExportReport {
        output_dir: output_dir.to_path_buf(),
        businesses: snapshot.businesses.len(),
        reviews: snapshot.reviews.len(),
        reports: snapshot.reports.len(),
        files,
    })
}

async fn write_json<T: Serialize + ?Sized>(dir: &Path, name: &str, value: &T) -> Result<PathBuf> {
    let path = dir.join(name);
    let mut content =
        serde_json::to_string_pretty(value).with_context(|| format!("Failed to serialize {name}"))?;
    content.push('\n');
    tokio::fs::write(&path, content)
        .await
        .with_context(|| format!("Failed to write output file: {}", path.display()))?;
    Ok(path)
}
