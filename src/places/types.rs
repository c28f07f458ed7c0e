//! Places data structures.

use serde::{Deserialize, Serialize};

/// Place details as stored in the cache and used for syncing businesses.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaceDetails {
    pub place_id: String,
    pub name: String,
    pub formatted_address: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub rating: Option<f64>,
    pub user_ratings_total: Option<i64>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub photo_references: Vec<String>,
    pub reviews: Vec<PlaceReview>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaceReview {
    pub author_name: String,
    pub rating: i64,
    pub text: String,
    /// Epoch seconds
    pub time: i64,
}

/// Where a details lookup was answered from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaceOrigin {
    /// Fresh cached copy
    Cache,
    /// Cached copy older than the TTL, served because live calls are off or failed
    StaleCache,
    /// Billed API call
    Api,
}

/// Details plus where they came from.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaceLookup {
    pub details: PlaceDetails,
    pub origin: PlaceOrigin,
}

/// Snapshot of the cost-control state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlacesUsage {
    pub cache_only: bool,
    pub api_key_configured: bool,
    pub max_api_calls: Option<u64>,
    pub api_calls: usize,
    pub cache_hits: usize,
    pub blocked_calls: usize,
    pub api_errors: usize,
}

/// What a sync changed on a business.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SyncOutcome {
    pub business_id: String,
    pub place_id: String,
    pub origin: PlaceOrigin,
    pub reviews_imported: usize,
}

// Wire format of the details endpoint.

#[derive(Debug, Deserialize)]
pub(crate) struct DetailsResponse {
    pub status: String,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub result: Option<RawPlace>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct RawPlace {
    pub place_id: Option<String>,
    pub name: String,
    pub formatted_address: Option<String>,
    pub international_phone_number: Option<String>,
    pub website: Option<String>,
    pub rating: Option<f64>,
    pub user_ratings_total: Option<i64>,
    pub geometry: Option<RawGeometry>,
    pub photos: Vec<RawPhoto>,
    pub reviews: Vec<RawReview>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawGeometry {
    pub location: RawLocation,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawLocation {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawPhoto {
    pub photo_reference: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct RawReview {
    pub author_name: String,
    pub rating: i64,
    pub text: String,
    pub time: i64,
}

impl RawPlace {
    pub(crate) fn into_details(self, requested_id: &str) -> PlaceDetails {
        let (latitude, longitude) = match self.geometry {
            Some(g) => (Some(g.location.lat), Some(g.location.lng)),
            None => (None, None),
        };
        PlaceDetails {
            place_id: self.place_id.unwrap_or_else(|| requested_id.to_string()),
            name: self.name,
            formatted_address: self.formatted_address,
            phone: self.international_phone_number,
            website: self.website,
            rating: self.rating,
            user_ratings_total: self.user_ratings_total,
            latitude,
            longitude,
            photo_references: self
                .photos
                .into_iter()
                .map(|p| p.photo_reference)
                .collect(),
            reviews: self
                .reviews
                .into_iter()
                .map(|r| PlaceReview {
                    author_name: r.author_name,
                    rating: r.rating,
                    text: r.text,
                    time: r.time,
                })
                .collect(),
        }
    }
}
