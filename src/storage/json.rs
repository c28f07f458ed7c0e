//! Read-only backend over a static JSON export.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::Value;

use super::filter::{distinct_categories, paginate, sort_businesses};
use super::models::{
    Business, BusinessQuery, CachedPlace, DirectorySnapshot, Page, Review, ScamReport,
};
use super::store::DirectoryStore;
use crate::error_handling::StoreError;

/// Directory served from a JSON file loaded at startup.
pub struct JsonStore {
    source: Option<PathBuf>,
    snapshot: DirectorySnapshot,
}

impl JsonStore {
    /// Loads `path`. Accepts a combined export or a bare array of businesses.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let content = std::fs::read_to_string(path)?;
        let snapshot = parse_snapshot(&content)?;
        log::info!(
            "Loaded {} businesses from {}",
            snapshot.businesses.len(),
            path.display()
        );
        Ok(Self {
            source: Some(path.to_path_buf()),
            snapshot,
        })
    }

    pub fn from_snapshot(mut snapshot: DirectorySnapshot) -> Self {
        sort_businesses(&mut snapshot.businesses);
        Self {
            source: None,
            snapshot,
        }
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }
}

/// Parses a combined export (`{"businesses": [...], ...}`) or a bare array of businesses.
pub fn parse_snapshot(content: &str) -> Result<DirectorySnapshot, StoreError> {
    let value: Value = serde_json::from_str(content)?;
    let mut snapshot = match value {
        Value::Array(_) => DirectorySnapshot {
            businesses: serde_json::from_value(value)?,
            ..Default::default()
        },
        other => serde_json::from_value(other)?,
    };
    sort_businesses(&mut snapshot.businesses);
    Ok(snapshot)
}

fn newest_first<T>(items: &mut [T], key: impl Fn(&T) -> (i64, &str)) {
    items.sort_by(|a, b| {
        let (a_ts, a_id) = key(a);
        let (b_ts, b_id) = key(b);
        b_ts.cmp(&a_ts).then_with(|| a_id.cmp(b_id))
    });
}

#[async_trait]
impl DirectoryStore for JsonStore {
    fn backend_name(&self) -> &'static str {
        "json"
    }

    async fn list_businesses(&self, query: &BusinessQuery) -> Result<Page<Business>, StoreError> {
        Ok(paginate(self.snapshot.businesses.clone(), query))
    }

    async fn all_businesses(&self) -> Result<Vec<Business>, StoreError> {
        Ok(self.snapshot.businesses.clone())
    }

    async fn get_business(&self, id: &str) -> Result<Option<Business>, StoreError> {
        Ok(self
            .snapshot
            .businesses
            .iter()
            .find(|b| b.id == id)
            .cloned())
    }

    async fn insert_business(&self, _business: &Business) -> Result<(), StoreError> {
        Err(StoreError::ReadOnly("json"))
    }

    async fn save_business(&self, _business: &Business) -> Result<bool, StoreError> {
        Err(StoreError::ReadOnly("json"))
    }

    async fn delete_business(&self, _id: &str) -> Result<bool, StoreError> {
        Err(StoreError::ReadOnly("json"))
    }

    async fn categories(&self) -> Result<Vec<String>, StoreError> {
        Ok(distinct_categories(&self.snapshot.businesses))
    }

    async fn list_reviews(&self, business_id: &str) -> Result<Vec<Review>, StoreError> {
        let mut reviews: Vec<Review> = self
            .snapshot
            .reviews
            .iter()
            .filter(|r| r.business_id == business_id)
            .cloned()
            .collect();
        newest_first(&mut reviews, |r| (r.created_at_ms, r.id.as_str()));
        Ok(reviews)
    }

    async fn all_reviews(&self) -> Result<Vec<Review>, StoreError> {
        let mut reviews = self.snapshot.reviews.clone();
        newest_first(&mut reviews, |r| (r.created_at_ms, r.id.as_str()));
        Ok(reviews)
    }

    async fn insert_review(&self, _review: &Review) -> Result<(), StoreError> {
        Err(StoreError::ReadOnly("json"))
    }

    async fn list_reports(&self, business_id: Option<&str>) -> Result<Vec<ScamReport>, StoreError> {
        let mut reports: Vec<ScamReport> = self
            .snapshot
            .reports
            .iter()
            .filter(|r| business_id.is_none() || r.business_id.as_deref() == business_id)
            .cloned()
            .collect();
        newest_first(&mut reports, |r| (r.created_at_ms, r.id.as_str()));
        Ok(reports)
    }

    async fn insert_report(&self, _report: &ScamReport) -> Result<(), StoreError> {
        Err(StoreError::ReadOnly("json"))
    }

    async fn cached_place(&self, _place_id: &str) -> Result<Option<CachedPlace>, StoreError> {
        Ok(None)
    }

    async fn store_place(&self, _place: &CachedPlace) -> Result<(), StoreError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::models::NewBusiness;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_bare_array() {
        let snapshot =
            parse_snapshot(r#"[{"id":"2","name":"Zenith"},{"id":"1","name":"Amer"}]"#).unwrap();
        assert_eq!(snapshot.businesses.len(), 2);
        assert_eq!(snapshot.businesses[0].name, "Amer");
        assert!(snapshot.reviews.is_empty());
    }

    #[test]
    fn test_parse_combined_export() {
        let snapshot = parse_snapshot(
            r#"{"businesses":[{"id":"1","name":"Amer"}],
                "reviews":[{"id":"r1","business_id":"1","rating":5}],
                "reports":[]}"#,
        )
        .unwrap();
        assert_eq!(snapshot.businesses.len(), 1);
        assert_eq!(snapshot.reviews.len(), 1);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_snapshot("not json").is_err());
        assert!(parse_snapshot("42").is_err());
    }

    #[tokio::test]
    async fn test_open_and_query() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"id":"1","name":"Amer Centre","category":"Visa Services"}},
                {{"id":"2","name":"Golden Gate","category":"PRO Services"}}]"#
        )
        .unwrap();

        let store = JsonStore::open(file.path()).unwrap();
        assert_eq!(store.source(), Some(file.path()));
        assert_eq!(store.all_businesses().await.unwrap().len(), 2);
        assert_eq!(
            store.get_business("2").await.unwrap().unwrap().name,
            "Golden Gate"
        );
        assert_eq!(
            store.categories().await.unwrap(),
            vec!["PRO Services", "Visa Services"]
        );
    }

    #[tokio::test]
    async fn test_writes_are_rejected() {
        let store = JsonStore::from_snapshot(DirectorySnapshot::default());
        let err = store
            .create_business(NewBusiness {
                name: "Amer Centre".into(),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::ReadOnly("json")));
        assert!(store.delete_business("1").await.is_err());
    }
}
