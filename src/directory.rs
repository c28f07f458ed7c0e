//! Directory operations shared by the API and the CLI.
//!
//! Wraps the primary store with the fallback chain for reads and keeps
//! derived business fields (rating, review count) in step with writes.

use std::sync::Arc;

use log::{debug, warn};
use serde::Serialize;

use crate::error_handling::StoreError;
use crate::loader::FallbackChain;
use crate::storage::filter::{distinct_categories, paginate};
use crate::storage::validation::{validate_business, validate_web_url};
use crate::storage::{
    Business, BusinessQuery, BusinessUpdate, DirectoryStore, NewBusiness, NewReview,
    NewScamReport, Page, Review, ScamReport,
};

/// A page of businesses and the source that served it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Listing {
    #[serde(flatten)]
    pub page: Page<Business>,
    pub source: String,
}

/// The primary store plus the read fallbacks.
#[derive(Clone)]
pub struct Directory {
    store: Arc<dyn DirectoryStore>,
    chain: FallbackChain,
}

impl Directory {
    pub fn new(store: Arc<dyn DirectoryStore>, chain: FallbackChain) -> Self {
        Self { store, chain }
    }

    pub fn store(&self) -> &Arc<dyn DirectoryStore> {
        &self.store
    }

    pub fn backend_name(&self) -> &'static str {
        self.store.backend_name()
    }

    /// Lists from the primary store, or from the fallback chain when it fails or is empty.
    pub async fn list_businesses(&self, query: &BusinessQuery) -> Listing {
        match self.store.list_businesses(query).await {
            Ok(page) if page.total > 0 => {
                return Listing {
                    page,
                    source: self.backend_name().to_string(),
                }
            }
            Ok(page) => match self.primary_is_empty(query).await {
                Ok(false) => {
                    return Listing {
                        page,
                        source: self.backend_name().to_string(),
                    }
                }
                Ok(true) => debug!("Primary store is empty, using fallback chain"),
                Err(e) => warn!("Primary store count failed: {e}. Using fallback chain"),
            },
            Err(e) => warn!("Primary store listing failed: {e}. Using fallback chain"),
        }

        let loaded = self.chain.load().await;
        Listing {
            page: paginate(loaded.businesses, query),
            source: loaded.source,
        }
    }

    /// Whether the listing came from somewhere other than the primary store.
    pub fn is_fallback(&self, listing: &Listing) -> bool {
        listing.source != self.backend_name()
    }

    /// One business, from the primary store or, when it fails or is empty, the fallback chain.
    pub async fn get_business(&self, id: &str) -> Result<Option<Business>, StoreError> {
        match self.store.get_business(id).await {
            Ok(Some(business)) => return Ok(Some(business)),
            Ok(None) => match self.store_is_empty().await {
                Ok(false) => return Ok(None),
                Ok(true) => debug!("Primary store is empty, looking up {id} in fallback chain"),
                Err(e) => warn!("Primary store count failed: {e}. Using fallback chain"),
            },
            Err(e) => warn!("Primary store lookup of {id} failed: {e}. Using fallback chain"),
        }
        let loaded = self.chain.load().await;
        Ok(loaded.businesses.into_iter().find(|b| b.id == id))
    }

    pub async fn categories(&self) -> Vec<String> {
        match self.store.categories().await {
            Ok(categories) if !categories.is_empty() => categories,
            Ok(_) => distinct_categories(&self.chain.load().await.businesses),
            Err(e) => {
                warn!("Primary store categories failed: {e}. Using fallback chain");
                distinct_categories(&self.chain.load().await.businesses)
            }
        }
    }

    pub async fn list_reviews(&self, business_id: &str) -> Result<Vec<Review>, StoreError> {
        self.store.list_reviews(business_id).await
    }

    pub async fn list_reports(
        &self,
        business_id: Option<&str>,
    ) -> Result<Vec<ScamReport>, StoreError> {
        self.store.list_reports(business_id).await
    }

    pub async fn create_business(&self, new: NewBusiness) -> Result<Business, StoreError> {
        self.store.create_business(new).await
    }

    pub async fn update_business(
        &self,
        id: &str,
        update: BusinessUpdate,
    ) -> Result<Option<Business>, StoreError> {
        self.store.update_business(id, update).await
    }

    pub async fn delete_business(&self, id: &str) -> Result<bool, StoreError> {
        self.store.delete_business(id).await
    }

    /// Stores a review and refreshes the business rating. Businesses linked to
    /// Google keep the rating Places reports.
    pub async fn create_review(&self, new: NewReview) -> Result<Review, StoreError> {
        let business = self
            .store
            .get_business(new.business_id.trim())
            .await?
            .ok_or_else(|| StoreError::validation("business_id", "unknown business"))?;

        let review = self.store.create_review(new).await?;

        if business.place_id.is_none() {
            let reviews = self.store.list_reviews(&business.id).await?;
            self.refresh_rating(business, &reviews).await?;
        }
        Ok(review)
    }

    /// Stores a scam report. A linked business must exist and lends its name
    /// when the report has none.
    pub async fn create_report(&self, mut new: NewScamReport) -> Result<ScamReport, StoreError> {
        if let Some(id) = new.business_id.as_deref().map(str::trim).filter(|id| !id.is_empty()) {
            let business = self
                .store
                .get_business(id)
                .await?
                .ok_or_else(|| StoreError::validation("business_id", "unknown business"))?;
            if new.business_name.trim().is_empty() {
                new.business_name = business.name;
            }
        }
        self.store.create_report(new).await
    }

    /// Appends a photo URL.
    pub async fn add_image(&self, id: &str, url: &str) -> Result<Option<Business>, StoreError> {
        let url = url.trim();
        validate_web_url("url", url)?;
        let Some(business) = self.store.get_business(id).await? else {
            return Ok(None);
        };
        let mut photos = business.photos;
        photos.push(url.to_string());
        self.update_business(
            id,
            BusinessUpdate {
                photos: Some(photos),
                ..Default::default()
            },
        )
        .await
    }

    /// Removes the photo at `index`.
    pub async fn remove_image(
        &self,
        id: &str,
        index: usize,
    ) -> Result<Option<Business>, StoreError> {
        let Some(business) = self.store.get_business(id).await? else {
            return Ok(None);
        };
        let mut photos = business.photos;
        if index >= photos.len() {
            return Err(StoreError::validation(
                "index",
                format!("no photo at index {index} ({} photos)", photos.len()),
            ));
        }
        photos.remove(index);
        self.update_business(
            id,
            BusinessUpdate {
                photos: Some(photos),
                ..Default::default()
            },
        )
        .await
    }

    pub async fn set_logo(&self, id: &str, url: &str) -> Result<Option<Business>, StoreError> {
        let url = url.trim();
        validate_web_url("url", url)?;
        self.update_business(
            id,
            BusinessUpdate {
                logo_url: Some(url.to_string()),
                ..Default::default()
            },
        )
        .await
    }

    async fn refresh_rating(
        &self,
        mut business: Business,
        reviews: &[Review],
    ) -> Result<(), StoreError> {
        if reviews.is_empty() {
            return Ok(());
        }
        let sum: i64 = reviews.iter().map(|r| r.rating).sum();
        let average = sum as f64 / reviews.len() as f64;
        business.rating = Some((average * 10.0).round() / 10.0);
        business.review_count = reviews.len() as i64;
        business.updated_at_ms = crate::storage::now_ms();
        validate_business(&business)?;
        self.store.save_business(&business).await?;
        Ok(())
    }

    async fn primary_is_empty(&self, query: &BusinessQuery) -> Result<bool, StoreError> {
        let filtered = query.category_filter().is_some()
            || query.city_filter().is_some()
            || query.search_term().is_some();
        if !filtered {
            return Ok(true);
        }
        self.store_is_empty().await
    }

    async fn store_is_empty(&self) -> Result<bool, StoreError> {
        let unfiltered = BusinessQuery {
            limit: Some(1),
            ..Default::default()
        };
        Ok(self.store.list_businesses(&unfiltered).await?.total == 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::{NamedSource, FALLBACK_SOURCE};
    use crate::storage::test_helpers::{create_test_pool, new_business};
    use crate::storage::{DirectorySnapshot, JsonStore, SqliteStore};

    async fn sqlite_directory(sources: Vec<NamedSource>) -> Directory {
        let store = Arc::new(SqliteStore::new(create_test_pool().await));
        Directory::new(store, FallbackChain::new(sources))
    }

    fn export_source(names: &[&str]) -> NamedSource {
        let businesses = names
            .iter()
            .enumerate()
            .map(|(i, name)| Business {
                id: format!("export-{i}"),
                name: name.to_string(),
                category: "Visa Services".to_string(),
                city: "Dubai".to_string(),
                ..Default::default()
            })
            .collect();
        NamedSource::new(
            "public/data/businesses.json",
            Arc::new(JsonStore::from_snapshot(DirectorySnapshot {
                businesses,
                ..Default::default()
            })),
        )
    }

    #[tokio::test]
    async fn test_listing_uses_primary_when_populated() {
        let directory = sqlite_directory(vec![export_source(&["Exported"])]).await;
        directory
            .create_business(new_business("Amer Centre", "Visa Services"))
            .await
            .unwrap();

        let listing = directory.list_businesses(&BusinessQuery::default()).await;
        assert_eq!(listing.source, "sqlite");
        assert_eq!(listing.page.total, 1);
        assert!(!directory.is_fallback(&listing));
    }

    #[tokio::test]
    async fn test_empty_primary_falls_back_to_export() {
        let directory =
            sqlite_directory(vec![export_source(&["Golden Gate", "Al Ahli"])]).await;
        let listing = directory.list_businesses(&BusinessQuery::default()).await;
        assert_eq!(listing.source, "public/data/businesses.json");
        assert_eq!(listing.page.items[0].name, "Al Ahli");
        assert!(directory.is_fallback(&listing));
    }

    #[tokio::test]
    async fn test_filtered_miss_on_populated_primary_stays_primary() {
        let directory = sqlite_directory(vec![export_source(&["Exported"])]).await;
        directory
            .create_business(new_business("Amer Centre", "Visa Services"))
            .await
            .unwrap();

        let query = BusinessQuery {
            category: Some("Legal".to_string()),
            ..Default::default()
        };
        let listing = directory.list_businesses(&query).await;
        assert_eq!(listing.source, "sqlite");
        assert_eq!(listing.page.total, 0);
    }

    #[tokio::test]
    async fn test_no_sources_serves_sample() {
        let directory = sqlite_directory(vec![]).await;
        let listing = directory.list_businesses(&BusinessQuery::default()).await;
        assert_eq!(listing.source, FALLBACK_SOURCE);
        assert!(listing.page.total > 0);
        assert!(!directory.categories().await.is_empty());
    }

    #[tokio::test]
    async fn test_detail_lookup_follows_fallback_listing() {
        let directory = sqlite_directory(vec![]).await;
        let listing = directory.list_businesses(&BusinessQuery::default()).await;
        assert_eq!(listing.source, FALLBACK_SOURCE);
        let first = &listing.page.items[0];

        let found = directory.get_business(&first.id).await.unwrap();
        assert_eq!(found.map(|b| b.name), Some(first.name.clone()));
        assert!(directory.get_business("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_detail_lookup_on_populated_primary_ignores_fallback() {
        let directory = sqlite_directory(vec![export_source(&["Exported"])]).await;
        directory
            .create_business(new_business("Amer Centre", "Visa Services"))
            .await
            .unwrap();

        assert!(directory.get_business("export-0").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_review_updates_rating() {
        let directory = sqlite_directory(vec![]).await;
        let business = directory
            .create_business(new_business("Amer Centre", "Visa Services"))
            .await
            .unwrap();

        for rating in [5, 4, 4] {
            directory
                .create_review(NewReview {
                    business_id: business.id.clone(),
                    author_name: "Visitor".to_string(),
                    rating,
                    text: "ok".to_string(),
                    ..Default::default()
                })
                .await
                .unwrap();
        }

        let updated = directory.get_business(&business.id).await.unwrap().unwrap();
        assert_eq!(updated.review_count, 3);
        assert_eq!(updated.rating, Some(4.3));
    }

    #[tokio::test]
    async fn test_review_keeps_places_rating() {
        let directory = sqlite_directory(vec![]).await;
        let business = directory
            .create_business(NewBusiness {
                place_id: Some("ChIJlinked".to_string()),
                rating: Some(4.7),
                review_count: 210,
                ..new_business("Amer Centre", "Visa Services")
            })
            .await
            .unwrap();

        directory
            .create_review(NewReview {
                business_id: business.id.clone(),
                author_name: "Visitor".to_string(),
                rating: 1,
                text: "Closed early".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();

        let after = directory.get_business(&business.id).await.unwrap().unwrap();
        assert_eq!(after.rating, Some(4.7));
        assert_eq!(after.review_count, 210);
        assert_eq!(directory.list_reviews(&business.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_review_for_unknown_business_rejected() {
        let directory = sqlite_directory(vec![]).await;
        let err = directory
            .create_review(NewReview {
                business_id: "nope".to_string(),
                rating: 3,
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Validation { field: "business_id", .. }));
    }

    #[tokio::test]
    async fn test_report_borrows_business_name() {
        let directory = sqlite_directory(vec![]).await;
        let business = directory
            .create_business(new_business("Quick Visa LLC", "Visa Services"))
            .await
            .unwrap();

        let report = directory
            .create_report(NewScamReport {
                business_id: Some(business.id.clone()),
                description: "Took a deposit and disappeared".to_string(),
                amount_lost: Some(2500.0),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(report.business_name, "Quick Visa LLC");
        assert_eq!(report.currency, "AED");
    }

    #[tokio::test]
    async fn test_image_management() {
        let directory = sqlite_directory(vec![]).await;
        let business = directory
            .create_business(new_business("Amer Centre", "Visa Services"))
            .await
            .unwrap();

        directory
            .add_image(&business.id, "https://cdn.example.com/a.jpg")
            .await
            .unwrap();
        let updated = directory
            .add_image(&business.id, "https://cdn.example.com/b.jpg")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.photos.len(), 2);

        let updated = directory.remove_image(&business.id, 0).await.unwrap().unwrap();
        assert_eq!(updated.photos, vec!["https://cdn.example.com/b.jpg"]);

        assert!(directory.remove_image(&business.id, 5).await.is_err());
        assert!(directory.add_image(&business.id, "ftp://x/y.jpg").await.is_err());
        assert!(directory.add_image("missing", "https://x.com/a.jpg").await.unwrap().is_none());

        let updated = directory
            .set_logo(&business.id, "https://cdn.example.com/logo.png")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.logo_url.as_deref(), Some("https://cdn.example.com/logo.png"));
    }
}
