//! The storage seam.
//!
//! Every backend implements the primitive reads and writes. Record
//! construction and validation live in the provided methods, so backends only
//! move rows.

use async_trait::async_trait;

use super::models::{
    Business, BusinessQuery, BusinessUpdate, CachedPlace, NewBusiness, NewReview, NewScamReport,
    Page, Review, ScamReport,
};
use super::now_ms;
use super::validation::{apply_update, build_business, build_report, build_review};
use crate::error_handling::StoreError;

/// A directory storage backend.
#[async_trait]
pub trait DirectoryStore: Send + Sync {
    /// Short backend name (`sqlite`, `postgres`, `supabase`, `json`).
    fn backend_name(&self) -> &'static str;

    async fn list_businesses(&self, query: &BusinessQuery) -> Result<Page<Business>, StoreError>;

    /// Every business, ordered by name then id.
    async fn all_businesses(&self) -> Result<Vec<Business>, StoreError>;

    async fn get_business(&self, id: &str) -> Result<Option<Business>, StoreError>;

    /// Inserts a validated business. Fails with `Conflict` when the id exists.
    async fn insert_business(&self, business: &Business) -> Result<(), StoreError>;

    /// Overwrites every column of an existing business. Returns `false` when it does not exist.
    async fn save_business(&self, business: &Business) -> Result<bool, StoreError>;

    /// Deletes a business and its reviews, and unlinks its scam reports.
    async fn delete_business(&self, id: &str) -> Result<bool, StoreError>;

    /// Distinct non-empty categories, sorted.
    async fn categories(&self) -> Result<Vec<String>, StoreError>;

    /// Reviews of one business, newest first.
    async fn list_reviews(&self, business_id: &str) -> Result<Vec<Review>, StoreError>;

    async fn all_reviews(&self) -> Result<Vec<Review>, StoreError>;

    async fn insert_review(&self, review: &Review) -> Result<(), StoreError>;

    /// Scam reports, newest first, optionally for one business.
    async fn list_reports(&self, business_id: Option<&str>) -> Result<Vec<ScamReport>, StoreError>;

    async fn all_reports(&self) -> Result<Vec<ScamReport>, StoreError> {
        self.list_reports(None).await
    }

    async fn insert_report(&self, report: &ScamReport) -> Result<(), StoreError>;

    async fn cached_place(&self, place_id: &str) -> Result<Option<CachedPlace>, StoreError>;

    /// Inserts or replaces the cache entry for `place.place_id`.
    async fn store_place(&self, place: &CachedPlace) -> Result<(), StoreError>;

    async fn create_business(&self, new: NewBusiness) -> Result<Business, StoreError> {
        let business = build_business(new, now_ms())?;
        self.insert_business(&business).await?;
        Ok(business)
    }

    async fn update_business(
        &self,
        id: &str,
        update: BusinessUpdate,
    ) -> Result<Option<Business>, StoreError> {
        let Some(mut business) = self.get_business(id).await? else {
            return Ok(None);
        };
        apply_update(&mut business, update, now_ms())?;
        if self.save_business(&business).await? {
            Ok(Some(business))
        } else {
            Ok(None)
        }
    }

    async fn create_review(&self, new: NewReview) -> Result<Review, StoreError> {
        let review = build_review(new, now_ms())?;
        self.insert_review(&review).await?;
        Ok(review)
    }

    async fn create_report(&self, new: NewScamReport) -> Result<ScamReport, StoreError> {
        let report = build_report(new, now_ms())?;
        self.insert_report(&report).await?;
        Ok(report)
    }
}
