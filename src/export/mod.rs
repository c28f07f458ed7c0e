//! Export and import of directory data.
//!
//! This module writes the static JSON files consumed by the JSON backend and
//! the fallback chain, and loads such files back into any writable backend.

mod import;
mod json;
mod types;

pub use import::{import_file, import_snapshot};
pub use json::{export_directory, BUSINESSES_FILE, DIRECTORY_FILE, REPORTS_FILE, REVIEWS_FILE};
pub use types::{ExportReport, ImportCounts, ImportReport};

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use tempfile::TempDir;

    use crate::storage::test_helpers::{create_test_pool, new_business};
    use crate::storage::{
        DirectoryStore, JsonStore, NewReview, NewScamReport, SqliteStore,
    };

    async fn seeded_store() -> Arc<dyn DirectoryStore> {
        let store: Arc<dyn DirectoryStore> = Arc::new(SqliteStore::new(create_test_pool().await));
        let business = store
            .create_business(new_business("Amer Centre Deira", "Visa Services"))
            .await
            .unwrap();
        store
            .create_business(new_business("Tasheel Al Barsha", "Immigration Services"))
            .await
            .unwrap();
        store
            .create_review(NewReview {
                business_id: business.id.clone(),
                author_name: "Sara".to_string(),
                rating: 5,
                text: "Quick renewal".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();
        store
            .create_report(NewScamReport {
                business_id: Some(business.id),
                description: "Charged twice for the medical test".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();
        store
    }

    #[tokio::test]
    async fn test_export_writes_all_files() {
        let store = seeded_store().await;
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("public/data");

        let report = export_directory(store.as_ref(), &out).await.unwrap();
        assert_eq!(report.businesses, 2);
        assert_eq!(report.reviews, 1);
        assert_eq!(report.reports, 1);
        assert_eq!(report.files.len(), 4);
        for file in &report.files {
            assert!(file.exists(), "{} missing", file.display());
        }

        // Both the split and the combined files load into the JSON backend.
        let listing = JsonStore::open(&out.join(BUSINESSES_FILE)).unwrap();
        assert_eq!(listing.all_businesses().await.unwrap().len(), 2);
        let combined = JsonStore::open(&out.join(DIRECTORY_FILE)).unwrap();
        assert_eq!(combined.all_reviews().await.unwrap().len(), 1);
        assert_eq!(combined.all_reports().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_import_into_empty_store_then_skip_duplicates() {
        let source = seeded_store().await;
        let dir = TempDir::new().unwrap();
        export_directory(source.as_ref(), dir.path()).await.unwrap();

        let target: Arc<dyn DirectoryStore> = Arc::new(SqliteStore::new(create_test_pool().await));
        let path = dir.path().join(DIRECTORY_FILE);

        let first = import_file(target.as_ref(), &path).await.unwrap();
        assert_eq!(first.created(), 4);
        assert_eq!(first.skipped(), 0);
        assert_eq!(
            target.all_businesses().await.unwrap(),
            source.all_businesses().await.unwrap()
        );

        let second = import_file(target.as_ref(), &path).await.unwrap();
        assert_eq!(second.created(), 0);
        assert_eq!(second.skipped(), 4);
    }

    #[tokio::test]
    async fn test_import_skips_orphan_reviews() {
        let target: Arc<dyn DirectoryStore> = Arc::new(SqliteStore::new(create_test_pool().await));
        let snapshot = crate::storage::json::parse_snapshot(
            r#"{"businesses": [], "reviews": [{"id": "r1", "business_id": "ghost", "rating": 4}]}"#,
        )
        .unwrap();
        let report = import_snapshot(target.as_ref(), snapshot).await.unwrap();
        assert_eq!(report.reviews.invalid, 1);
        assert_eq!(report.created(), 0);
    }

    #[tokio::test]
    async fn test_import_into_json_backend_fails() {
        let target = JsonStore::from_snapshot(Default::default());
        let snapshot = crate::storage::json::parse_snapshot(r#"[{"id": "b1", "name": "Amer"}]"#)
            .unwrap();
        let err = import_snapshot(&target, snapshot).await.unwrap_err();
        assert!(format!("{err:#}").contains("read-only"));
    }
}
