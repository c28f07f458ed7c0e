//! JSON import into any writable backend.

use std::path::Path;

use anyhow::{Context, Result};
use log::{debug, info, warn};

use super::types::{ImportCounts, ImportReport};
use crate::error_handling::StoreError;
use crate::storage::json::parse_snapshot;
use crate::storage::validation::{build_report, build_review, validate_business};
use crate::storage::{DirectorySnapshot, DirectoryStore, NewReview, NewScamReport};

/// Reads a combined export or a bare business array from `path` and imports it.
pub async fn import_file(store: &dyn DirectoryStore, path: &Path) -> Result<ImportReport> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read import file: {}", path.display()))?;
    let snapshot = parse_snapshot(&content)
        .with_context(|| format!("Failed to parse import file: {}", path.display()))?;
    info!(
        "Importing {} businesses, {} reviews, {} reports from {}",
        snapshot.businesses.len(),
        snapshot.reviews.len(),
        snapshot.reports.len(),
        path.display()
    );
    import_snapshot(store, snapshot).await
}

/// Writes every record of `snapshot`, keeping ids and timestamps. Existing ids
/// are skipped; invalid records are logged and skipped.
pub async fn import_snapshot(
    store: &dyn DirectoryStore,
    snapshot: DirectorySnapshot,
) -> Result<ImportReport> {
    let now = crate::storage::now_ms();
    let mut report = ImportReport::default();

    for mut business in snapshot.businesses {
        if business.id.trim().is_empty() {
            business.id = crate::storage::validation::new_id();
        }
        if business.created_at_ms == 0 {
            business.created_at_ms = now;
        }
        if business.updated_at_ms == 0 {
            business.updated_at_ms = business.created_at_ms;
        }
        let result = match validate_business(&business) {
            Ok(()) => store.insert_business(&business).await,
            Err(e) => Err(e),
        };
        tally(&mut report.businesses, "business", &business.id, result)?;
    }

    for review in snapshot.reviews {
        let id = review.id.clone();
        let result = match store.get_business(&review.business_id).await? {
            None => Err(StoreError::validation("business_id", "unknown business")),
            Some(_) => {
                let new = NewReview {
                    id: Some(review.id),
                    business_id: review.business_id,
                    author_name: review.author_name,
                    rating: review.rating,
                    text: review.text,
                    source: review.source,
                    created_at_ms: Some(review.created_at_ms).filter(|t| *t > 0),
                };
                match build_review(new, now) {
                    Ok(review) => store.insert_review(&review).await,
                    Err(e) => Err(e),
                }
            }
        };
        tally(&mut report.reviews, "review", &id, result)?;
    }

    for scam in snapshot.reports {
        let id = scam.id.clone();
        let business_id = match &scam.business_id {
            Some(bid) if store.get_business(bid).await?.is_none() => {
                debug!("Report {id} links missing business {bid}, importing unlinked");
                None
            }
            other => other.clone(),
        };
        let new = NewScamReport {
            id: Some(scam.id),
            business_id,
            business_name: scam.business_name,
            reporter_name: scam.reporter_name,
            reporter_email: scam.reporter_email,
            description: scam.description,
            amount_lost: scam.amount_lost,
            currency: Some(scam.currency),
            incident_date: scam.incident_date,
            evidence_urls: scam.evidence_urls,
            created_at_ms: Some(scam.created_at_ms).filter(|t| *t > 0),
        };
        let result = match build_report(new, now) {
            Ok(built) => store.insert_report(&built).await,
            Err(e) => Err(e),
        };
        tally(&mut report.reports, "report", &id, result)?;
    }

    info!(
        "Import finished: {} created, {} skipped as duplicates, {} invalid",
        report.created(),
        report.skipped(),
        report.businesses.invalid + report.reviews.invalid + report.reports.invalid
    );
    Ok(report)
}

/// Counts one record outcome. Backend failures abort the import.
fn tally(
    counts: &mut ImportCounts,
    entity: &str,
    id: &str,
    result: Result<(), StoreError>,
) -> Result<()> {
    match result {
        Ok(()) => counts.created += 1,
        Err(StoreError::Conflict { .. }) => {
            debug!("Skipping existing {entity} {id}");
            counts.skipped += 1;
        }
        Err(StoreError::Validation { field, message }) => {
            warn!("Skipping invalid {entity} {id}: {field} {message}");
            counts.invalid += 1;
        }
        Err(e) => return Err(e).with_context(|| format!("Failed to import {entity} {id}")),
    }
    Ok(())
}
