//! Cache-first Places lookups and business syncing.

use std::sync::Arc;
use std::time::Duration;

use log::{debug, info, warn};

use super::budget::PlacesBudget;
use super::client::PlacesClient;
use super::types::{PlaceDetails, PlaceLookup, PlaceOrigin, PlacesUsage, SyncOutcome};
use crate::config::{Config, PLACES_BASE_URL, PLACES_CACHE_TTL_SECS};
use crate::error_handling::{PlacesError, PlacesEvent, PlacesStats};
use crate::storage::validation::{build_review, validate_business};
use crate::storage::{CachedPlace, DirectoryStore, NewReview, ReviewSource};

/// Maximum photo width requested from the photo endpoint.
const PHOTO_MAX_WIDTH: u32 = 800;

/// Serves place details from the cache whenever possible and meters live calls.
pub struct PlacesService {
    store: Arc<dyn DirectoryStore>,
    client: Option<PlacesClient>,
    budget: PlacesBudget,
    ttl: Duration,
    photo_base: String,
}

impl PlacesService {
    /// A service with the default TTL. `client` is `None` when no API key is configured.
    pub fn new(
        store: Arc<dyn DirectoryStore>,
        client: Option<PlacesClient>,
        budget: PlacesBudget,
    ) -> Self {
        Self {
            store,
            client,
            budget,
            ttl: Duration::from_secs(PLACES_CACHE_TTL_SECS),
            photo_base: PLACES_BASE_URL.to_string(),
        }
    }

    /// Builds the service from configuration, reusing `http` for API calls.
    pub fn from_config(
        store: Arc<dyn DirectoryStore>,
        http: reqwest::Client,
        config: &Config,
    ) -> Self {
        let client = config
            .places_api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .map(|key| PlacesClient::new(http, &config.places_base_url, key));
        if client.is_none() {
            info!("No Google Places API key configured, Places data is served from cache only");
        }
        let budget = PlacesBudget::new(config.places_cache_only, config.places_max_api_calls);
        Self {
            ttl: Duration::from_secs(config.places_cache_ttl_secs),
            photo_base: config.places_base_url.trim_end_matches('/').to_string(),
            ..Self::new(store, client, budget)
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn set_cache_only(&self, cache_only: bool) -> bool {
        self.budget.set_cache_only(cache_only)
    }

    pub fn is_cache_only(&self) -> bool {
        self.budget.is_cache_only()
    }

    pub fn snapshot(&self) -> PlacesUsage {
        self.budget.usage(self.client.is_some())
    }

    pub fn stats(&self) -> &PlacesStats {
        self.budget.stats()
    }

    /// Details for `place_id`: fresh cache, then a metered API call, then stale cache.
    pub async fn place_details(&self, place_id: &str) -> Result<PlaceLookup, PlacesError> {
        let cached = self.load_cached(place_id).await?;

        if let Some((details, fetched_at_ms)) = &cached {
            if self.is_fresh(*fetched_at_ms) {
                self.budget.record(PlacesEvent::CacheHit);
                debug!("Places cache hit for {place_id}");
                return Ok(PlaceLookup {
                    details: details.clone(),
                    origin: PlaceOrigin::Cache,
                });
            }
        }

        let client = match &self.client {
            Some(client) if self.budget.try_begin_call() => client,
            _ => return self.serve_without_api(place_id, cached),
        };

        match client.fetch_details(place_id).await {
            Ok(details) => {
                self.store_details(place_id, &details).await?;
                Ok(PlaceLookup {
                    details,
                    origin: PlaceOrigin::Api,
                })
            }
            Err(e) => {
                self.budget.record(PlacesEvent::ApiError);
                match cached {
                    Some((details, _)) => {
                        warn!("Places API failed for {place_id}: {e}. Serving stale cache");
                        self.budget.record(PlacesEvent::CacheHit);
                        Ok(PlaceLookup {
                            details,
                            origin: PlaceOrigin::StaleCache,
                        })
                    }
                    None => Err(e),
                }
            }
        }
    }

    /// Copies Places data onto a business and imports its Google reviews.
    pub async fn sync_business(&self, business_id: &str) -> Result<SyncOutcome, PlacesError> {
        let mut business = self
            .store
            .get_business(business_id)
            .await?
            .ok_or_else(|| PlacesError::BusinessNotFound(business_id.to_string()))?;
        let place_id = business
            .place_id
            .clone()
            .filter(|p| !p.trim().is_empty())
            .ok_or_else(|| PlacesError::NoPlaceId(business_id.to_string()))?;

        let lookup = self.place_details(&place_id).await?;
        let details = &lookup.details;

        if details.rating.is_some() {
            business.rating = details.rating;
        }
        if let Some(total) = details.user_ratings_total {
            business.review_count = total;
        }
        if details.phone.is_some() {
            business.phone = details.phone.clone();
        }
        if details.website.is_some() {
            business.website = details.website.clone();
        }
        if details.latitude.is_some() && details.longitude.is_some() {
            business.latitude = details.latitude;
            business.longitude = details.longitude;
        }
        for reference in &details.photo_references {
            let url = self.photo_url(reference);
            if !business.photos.contains(&url) {
                business.photos.push(url);
            }
        }
        business.updated_at_ms = crate::storage::now_ms();
        validate_business(&business)?;
        self.store.save_business(&business).await?;

        let mut existing = self.store.list_reviews(business_id).await?;
        let mut imported = 0;
        for review in &details.reviews {
            // Compare after the same normalisation the store applies on insert.
            let candidate = build_review(
                NewReview {
                    business_id: business_id.to_string(),
                    author_name: review.author_name.clone(),
                    rating: review.rating.clamp(1, 5),
                    text: review.text.clone(),
                    source: ReviewSource::Google,
                    created_at_ms: Some(review.time.saturating_mul(1000)),
                    ..Default::default()
                },
                crate::storage::now_ms(),
            )?;
            let seen = existing
                .iter()
                .any(|r| r.author_name == candidate.author_name && r.text == candidate.text);
            if seen {
                continue;
            }
            self.store.insert_review(&candidate).await?;
            existing.push(candidate);
            imported += 1;
        }

        info!(
            "Synced business {business_id} from place {place_id} ({:?}), {imported} new reviews",
            lookup.origin
        );
        Ok(SyncOutcome {
            business_id: business_id.to_string(),
            place_id,
            origin: lookup.origin,
            reviews_imported: imported,
        })
    }

    fn serve_without_api(
        &self,
        place_id: &str,
        cached: Option<(PlaceDetails, i64)>,
    ) -> Result<PlaceLookup, PlacesError> {
        match cached {
            Some((details, _)) => {
                self.budget.record(PlacesEvent::CacheHit);
                Ok(PlaceLookup {
                    details,
                    origin: PlaceOrigin::StaleCache,
                })
            }
            None => {
                self.budget.record(PlacesEvent::BlockedCall);
                debug!("Blocked Places call for uncached place {place_id}");
                Err(PlacesError::CacheOnly(place_id.to_string()))
            }
        }
    }

    async fn load_cached(
        &self,
        place_id: &str,
    ) -> Result<Option<(PlaceDetails, i64)>, PlacesError> {
        let Some(entry) = self.store.cached_place(place_id).await? else {
            return Ok(None);
        };
        match serde_json::from_str::<PlaceDetails>(&entry.payload) {
            Ok(details) => Ok(Some((details, entry.fetched_at_ms))),
            Err(e) => {
                warn!("Ignoring corrupt cache entry for {place_id}: {e}");
                Ok(None)
            }
        }
    }

    async fn store_details(&self, place_id: &str, details: &PlaceDetails) -> Result<(), PlacesError> {
        let entry = CachedPlace {
            place_id: place_id.to_string(),
            payload: serde_json::to_string(details)?,
            fetched_at_ms: crate::storage::now_ms(),
        };
        // The JSON backend cannot persist; the billed result is still returned.
        if let Err(e) = self.store.store_place(&entry).await {
            warn!("Failed to cache place {place_id}: {e}");
        }
        Ok(())
    }

    fn is_fresh(&self, fetched_at_ms: i64) -> bool {
        let age_ms = crate::storage::now_ms().saturating_sub(fetched_at_ms);
        age_ms >= 0 && (age_ms as u128) < self.ttl.as_millis()
    }

    fn photo_url(&self, reference: &str) -> String {
        format!(
            "{}/photo?maxwidth={PHOTO_MAX_WIDTH}&photo_reference={reference}",
            self.photo_base
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::test_helpers::{create_test_pool, new_business};
    use crate::storage::{BusinessUpdate, SqliteStore};
    use httptest::{matchers::*, responders::*, Expectation, Server};
    use serde_json::json;

    async fn sqlite_store() -> Arc<dyn DirectoryStore> {
        Arc::new(SqliteStore::new(create_test_pool().await))
    }

    fn client_for(server: &Server) -> PlacesClient {
        let base = format!("http://{}/maps/api/place", server.addr());
        PlacesClient::new(reqwest::Client::new(), &base, "test-key")
    }

    fn details_body(place_id: &str) -> serde_json::Value {
        json!({
            "status": "OK",
            "result": {
                "place_id": place_id,
                "name": "Amer Centre Deira",
                "website": "https://amer.example.ae",
                "rating": 4.6,
                "user_ratings_total": 321,
                "photos": [{"photo_reference": "abc"}],
                "reviews": [
                    {"author_name": "Sara", "rating": 5, "text": "Fast renewal", "time": 1700000000},
                    {"author_name": "Omar", "rating": 2, "text": "Long queue", "time": 1700000500}
                ]
            }
        })
    }

    async fn seed_cache(store: &Arc<dyn DirectoryStore>, place_id: &str, fetched_at_ms: i64) {
        let details = PlaceDetails {
            place_id: place_id.to_string(),
            name: "Cached Centre".to_string(),
            rating: Some(3.5),
            ..Default::default()
        };
        store
            .store_place(&CachedPlace {
                place_id: place_id.to_string(),
                payload: serde_json::to_string(&details).unwrap(),
                fetched_at_ms,
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_cache_only_miss_is_blocked() {
        let service = PlacesService::new(sqlite_store().await, None, PlacesBudget::new(true, None));
        let err = service.place_details("ChIJmissing").await.unwrap_err();
        assert!(matches!(err, PlacesError::CacheOnly(_)));
        assert_eq!(service.snapshot().blocked_calls, 1);
        assert_eq!(service.snapshot().api_calls, 0);
    }

    #[tokio::test]
    async fn test_cache_only_serves_stale_entry() {
        let store = sqlite_store().await;
        seed_cache(&store, "ChIJold", 0).await;
        let server = Server::run();
        let service = PlacesService::new(
            store,
            Some(client_for(&server)),
            PlacesBudget::new(true, None),
        );

        let lookup = service.place_details("ChIJold").await.unwrap();
        assert_eq!(lookup.origin, PlaceOrigin::StaleCache);
        assert_eq!(lookup.details.name, "Cached Centre");
        assert_eq!(service.snapshot().cache_hits, 1);
    }

    #[tokio::test]
    async fn test_fresh_cache_avoids_api_call() {
        let store = sqlite_store().await;
        seed_cache(&store, "ChIJfresh", crate::storage::now_ms()).await;
        let server = Server::run();
        let service = PlacesService::new(
            store,
            Some(client_for(&server)),
            PlacesBudget::new(false, None),
        );

        let lookup = service.place_details("ChIJfresh").await.unwrap();
        assert_eq!(lookup.origin, PlaceOrigin::Cache);
        assert_eq!(service.snapshot().api_calls, 0);
    }

    #[tokio::test]
    async fn test_live_call_populates_cache() {
        let store = sqlite_store().await;
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("GET", "/maps/api/place/details/json"))
                .times(1)
                .respond_with(json_encoded(details_body("ChIJlive"))),
        );
        let service = PlacesService::new(
            store.clone(),
            Some(client_for(&server)),
            PlacesBudget::new(false, None),
        );

        let first = service.place_details("ChIJlive").await.unwrap();
        assert_eq!(first.origin, PlaceOrigin::Api);
        assert!(store.cached_place("ChIJlive").await.unwrap().is_some());

        let second = service.place_details("ChIJlive").await.unwrap();
        assert_eq!(second.origin, PlaceOrigin::Cache);
        assert_eq!(second.details, first.details);

        let usage = service.snapshot();
        assert_eq!(usage.api_calls, 1);
        assert_eq!(usage.cache_hits, 1);
    }

    #[tokio::test]
    async fn test_api_error_falls_back_to_stale_cache() {
        let store = sqlite_store().await;
        seed_cache(&store, "ChIJstale", 0).await;
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("GET", "/maps/api/place/details/json"))
                .respond_with(json_encoded(json!({"status": "OVER_QUERY_LIMIT"}))),
        );
        let service = PlacesService::new(
            store,
            Some(client_for(&server)),
            PlacesBudget::new(false, None),
        );

        let lookup = service.place_details("ChIJstale").await.unwrap();
        assert_eq!(lookup.origin, PlaceOrigin::StaleCache);
        assert_eq!(service.snapshot().api_errors, 1);
    }

    #[tokio::test]
    async fn test_ttl_zero_treats_cache_as_stale() {
        let store = sqlite_store().await;
        seed_cache(&store, "ChIJnow", crate::storage::now_ms()).await;
        let service = PlacesService::new(store, None, PlacesBudget::new(false, None))
            .with_ttl(Duration::ZERO);

        let lookup = service.place_details("ChIJnow").await.unwrap();
        assert_eq!(lookup.origin, PlaceOrigin::StaleCache);
    }

    #[tokio::test]
    async fn test_sync_business_updates_fields_and_imports_reviews() {
        let store = sqlite_store().await;
        let business = store
            .create_business(new_business("Amer Centre Deira", "Visa Services"))
            .await
            .unwrap();
        store
            .update_business(
                &business.id,
                BusinessUpdate {
                    place_id: Some("ChIJsync".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("GET", "/maps/api/place/details/json"))
                .times(1)
                .respond_with(json_encoded(details_body("ChIJsync"))),
        );
        let service = PlacesService::new(
            store.clone(),
            Some(client_for(&server)),
            PlacesBudget::new(false, None),
        );

        let outcome = service.sync_business(&business.id).await.unwrap();
        assert_eq!(outcome.reviews_imported, 2);
        assert_eq!(outcome.origin, PlaceOrigin::Api);

        let synced = store.get_business(&business.id).await.unwrap().unwrap();
        assert_eq!(synced.rating, Some(4.6));
        assert_eq!(synced.review_count, 321);
        assert_eq!(synced.website.as_deref(), Some("https://amer.example.ae"));
        assert_eq!(synced.photos.len(), 1);
        assert!(synced.photos[0].ends_with("photo_reference=abc"));

        // Second sync hits the cache and finds nothing new.
        let again = service.sync_business(&business.id).await.unwrap();
        assert_eq!(again.reviews_imported, 0);
        assert_eq!(again.origin, PlaceOrigin::Cache);
        let reviews = store.list_reviews(&business.id).await.unwrap();
        assert_eq!(reviews.len(), 2);
        assert!(reviews.iter().all(|r| r.source == ReviewSource::Google));
        let synced = store.get_business(&business.id).await.unwrap().unwrap();
        assert_eq!(synced.photos.len(), 1);
    }

    #[tokio::test]
    async fn test_repeated_sync_does_not_duplicate_untrimmed_reviews() {
        let store = sqlite_store().await;
        let business = store
            .create_business(new_business("Golden Gate Typing", "Typing Centre"))
            .await
            .unwrap();
        store
            .update_business(
                &business.id,
                BusinessUpdate {
                    place_id: Some("ChIJtrim".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("GET", "/maps/api/place/details/json"))
                .times(3)
                .respond_with(json_encoded(json!({
                    "status": "OK",
                    "result": {
                        "place_id": "ChIJtrim",
                        "name": "Golden Gate Typing",
                        "reviews": [
                            {"author_name": "Sara", "rating": 5, "text": "Great service\n", "time": 1700000000},
                            {"author_name": "", "rating": 4, "text": "Quick", "time": 1700000100}
                        ]
                    }
                }))),
        );
        let service = PlacesService::new(
            store.clone(),
            Some(client_for(&server)),
            PlacesBudget::new(false, None),
        )
        .with_ttl(Duration::ZERO);

        let first = service.sync_business(&business.id).await.unwrap();
        assert_eq!(first.reviews_imported, 2);
        for _ in 0..2 {
            let again = service.sync_business(&business.id).await.unwrap();
            assert_eq!(again.origin, PlaceOrigin::Api);
            assert_eq!(again.reviews_imported, 0);
        }

        let reviews = store.list_reviews(&business.id).await.unwrap();
        assert_eq!(reviews.len(), 2);
        assert!(reviews.iter().any(|r| r.text == "Great service"));
        assert!(reviews.iter().any(|r| r.author_name == "Anonymous"));
    }

    #[tokio::test]
    async fn test_sync_requires_place_id() {
        let store = sqlite_store().await;
        let business = store
            .create_business(new_business("Tasheel Al Barsha", "Immigration Services"))
            .await
            .unwrap();
        let service = PlacesService::new(store, None, PlacesBudget::new(true, None));

        let err = service.sync_business(&business.id).await.unwrap_err();
        assert!(matches!(err, PlacesError::NoPlaceId(_)));
        let err = service.sync_business("missing").await.unwrap_err();
        assert!(matches!(err, PlacesError::BusinessNotFound(_)));
    }
}
