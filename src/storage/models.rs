//! Directory records and their input payloads.
//!
//! Records are flat. Lists (photos, evidence URLs) are stored as JSON text in
//! the SQL backends and as native arrays in Supabase and static JSON.

use serde::{Deserialize, Serialize};

use crate::config::{DEFAULT_CURRENCY, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};

/// A directory entry.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Business {
    pub id: String,
    pub name: String,
    pub category: String,
    pub address: String,
    pub city: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub website: Option<String>,
    pub description: String,
    /// Average rating, 0.0 to 5.0
    pub rating: Option<f64>,
    pub review_count: i64,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// Google Places id. When set, rating and review count come from Google.
    pub place_id: Option<String>,
    /// Image URLs in display order
    #[serde(deserialize_with = "string_list::deserialize")]
    pub photos: Vec<String>,
    pub logo_url: Option<String>,
    pub verified: bool,
    pub created_at_ms: i64,
    pub updated_at_ms: i64,
}

/// Where a review came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewSource {
    #[default]
    User,
    Google,
}

impl ReviewSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReviewSource::User => "user",
            ReviewSource::Google => "google",
        }
    }

    pub fn parse(s: &str) -> Self {
        if s.eq_ignore_ascii_case("google") {
            ReviewSource::Google
        } else {
            ReviewSource::User
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Review {
    pub id: String,
    pub business_id: String,
    pub author_name: String,
    /// 1 to 5
    pub rating: i64,
    pub text: String,
    pub source: ReviewSource,
    pub created_at_ms: i64,
}

/// A scam report. It may name a business that is not listed in the directory.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScamReport {
    pub id: String,
    pub business_id: Option<String>,
    pub business_name: String,
    pub reporter_name: String,
    pub reporter_email: Option<String>,
    pub description: String,
    pub amount_lost: Option<f64>,
    pub currency: String,
    pub incident_date: Option<String>,
    #[serde(deserialize_with = "string_list::deserialize")]
    pub evidence_urls: Vec<String>,
    pub created_at_ms: i64,
}

/// Payload for creating a business.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NewBusiness {
    /// Generated when absent
    pub id: Option<String>,
    pub name: String,
    pub category: String,
    pub address: String,
    pub city: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub website: Option<String>,
    pub description: String,
    pub rating: Option<f64>,
    pub review_count: i64,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub place_id: Option<String>,
    pub photos: Vec<String>,
    pub logo_url: Option<String>,
    pub verified: bool,
}

/// Partial update of a business. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BusinessUpdate {
    pub name: Option<String>,
    pub category: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub website: Option<String>,
    pub description: Option<String>,
    pub rating: Option<f64>,
    pub review_count: Option<i64>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub place_id: Option<String>,
    pub photos: Option<Vec<String>>,
    pub logo_url: Option<String>,
    pub verified: Option<bool>,
}

/// Payload for submitting a review.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NewReview {
    pub id: Option<String>,
    pub business_id: String,
    pub author_name: String,
    pub rating: i64,
    pub text: String,
    pub source: ReviewSource,
    /// Preserved on import; stamped with the current time otherwise
    pub created_at_ms: Option<i64>,
}

/// Payload for submitting a scam report.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NewScamReport {
    pub id: Option<String>,
    pub business_id: Option<String>,
    pub business_name: String,
    pub reporter_name: String,
    pub reporter_email: Option<String>,
    pub description: String,
    pub amount_lost: Option<f64>,
    pub currency: Option<String>,
    pub incident_date: Option<String>,
    pub evidence_urls: Vec<String>,
    pub created_at_ms: Option<i64>,
}

/// Listing filter and page selection.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct BusinessQuery {
    /// 1-based page number
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub category: Option<String>,
    pub city: Option<String>,
    pub search: Option<String>,
}

impl BusinessQuery {
    /// Page number, at least 1.
    pub fn page(&self) -> u32 {
        self.page.unwrap_or(1).max(1)
    }

    /// Page size clamped to `1..=MAX_PAGE_SIZE`.
    pub fn limit(&self) -> u32 {
        self.limit
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE)
    }

    /// Rows to skip.
    pub fn offset(&self) -> u64 {
        u64::from(self.page() - 1) * u64::from(self.limit())
    }

    /// Trimmed, non-empty category filter.
    pub fn category_filter(&self) -> Option<&str> {
        non_blank(self.category.as_deref())
    }

    /// Trimmed, non-empty city filter.
    pub fn city_filter(&self) -> Option<&str> {
        non_blank(self.city.as_deref())
    }

    /// Trimmed, non-empty search term.
    pub fn search_term(&self) -> Option<&str> {
        non_blank(self.search.as_deref())
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// One page of results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
    pub total_pages: u64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: u64, query: &BusinessQuery) -> Self {
        let limit = query.limit();
        Page {
            items,
            total,
            page: query.page(),
            limit,
            total_pages: total.div_ceil(u64::from(limit)),
        }
    }
}

/// Stored Google Places response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedPlace {
    pub place_id: String,
    /// Serialized `PlaceDetails`
    pub payload: String,
    pub fetched_at_ms: i64,
}

/// Full contents of a directory, as written by `export` and read by the JSON backend.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectorySnapshot {
    pub businesses: Vec<Business>,
    pub reviews: Vec<Review>,
    pub reports: Vec<ScamReport>,
}

pub(crate) fn default_currency() -> String {
    DEFAULT_CURRENCY.to_string()
}

/// Accepts a list as a JSON array, a JSON-encoded string, or null.
///
/// SQL backends keep lists in TEXT columns, so a Supabase table created from
/// the Postgres schema returns them as strings.
pub(crate) mod string_list {
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        List(Vec<String>),
        Encoded(String),
        Null(()),
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Raw::deserialize(deserializer)? {
            Raw::List(list) => Ok(list),
            Raw::Encoded(text) if text.trim().is_empty() => Ok(Vec::new()),
            Raw::Encoded(text) => serde_json::from_str(&text).map_err(serde::de::Error::custom),
            Raw::Null(()) => Ok(Vec::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_defaults() {
        let query = BusinessQuery::default();
        assert_eq!(query.page(), 1);
        assert_eq!(query.limit(), DEFAULT_PAGE_SIZE);
        assert_eq!(query.offset(), 0);
        assert!(query.search_term().is_none());
    }

    #[test]
    fn test_query_clamps_limit_and_page() {
        let query = BusinessQuery {
            page: Some(0),
            limit: Some(10_000),
            ..Default::default()
        };
        assert_eq!(query.page(), 1);
        assert_eq!(query.limit(), MAX_PAGE_SIZE);

        let query = BusinessQuery {
            page: Some(3),
            limit: Some(0),
            ..Default::default()
        };
        assert_eq!(query.limit(), 1);
        assert_eq!(query.offset(), 2);
    }

    #[test]
    fn test_blank_filters_are_ignored() {
        let query = BusinessQuery {
            category: Some("   ".into()),
            city: Some(" Dubai ".into()),
            ..Default::default()
        };
        assert!(query.category_filter().is_none());
        assert_eq!(query.city_filter(), Some("Dubai"));
    }

    #[test]
    fn test_page_total_pages() {
        let query = BusinessQuery {
            limit: Some(5),
            ..Default::default()
        };
        let page: Page<u8> = Page::new(vec![], 11, &query);
        assert_eq!(page.total_pages, 3);

        let empty: Page<u8> = Page::new(vec![], 0, &query);
        assert_eq!(empty.total_pages, 0);
    }

    #[test]
    fn test_business_deserializes_with_missing_fields() {
        let business: Business =
            serde_json::from_str(r#"{"id":"b1","name":"Emirates Visa Services"}"#).unwrap();
        assert_eq!(business.id, "b1");
        assert!(business.photos.is_empty());
        assert_eq!(business.review_count, 0);
        assert!(!business.verified);
    }

    #[test]
    fn test_string_list_accepts_encoded_text() {
        let business: Business = serde_json::from_str(
            r#"{"id":"b1","name":"A","photos":"[\"https://img.example/a.jpg\"]"}"#,
        )
        .unwrap();
        assert_eq!(business.photos, vec!["https://img.example/a.jpg"]);

        let business: Business =
            serde_json::from_str(r#"{"id":"b1","name":"A","photos":null}"#).unwrap();
        assert!(business.photos.is_empty());
    }

    #[test]
    fn test_review_source_serde() {
        let review: Review =
            serde_json::from_str(r#"{"id":"r1","business_id":"b1","rating":4,"source":"google"}"#)
                .unwrap();
        assert_eq!(review.source, ReviewSource::Google);
        assert_eq!(ReviewSource::parse("USER"), ReviewSource::User);
    }
}
