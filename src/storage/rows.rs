//! Row decoding shared by the SQL backends.
//!
//! SQLite and Postgres use the same column names and compatible types, so the
//! decoders are generic over the row type.

use sqlx::{ColumnIndex, Decode, Row, Type};

use super::models::{Business, CachedPlace, Review, ReviewSource, ScamReport};
use crate::error_handling::StoreError;

pub(crate) const BUSINESS_COLUMNS: &str = "id, name, category, address, city, phone, email, website, description, rating, review_count, latitude, longitude, place_id, photos, logo_url, verified, created_at_ms, updated_at_ms";

pub(crate) const REVIEW_COLUMNS: &str =
    "id, business_id, author_name, rating, text, source, created_at_ms";

pub(crate) const REPORT_COLUMNS: &str = "id, business_id, business_name, reporter_name, reporter_email, description, amount_lost, currency, incident_date, evidence_urls, created_at_ms";

pub(crate) fn business_from_row<'r, R>(row: &'r R) -> Result<Business, StoreError>
where
    R: Row,
    &'static str: ColumnIndex<R>,
    String: Decode<'r, R::Database> + Type<R::Database>,
    f64: Decode<'r, R::Database> + Type<R::Database>,
    i64: Decode<'r, R::Database> + Type<R::Database>,
    bool: Decode<'r, R::Database> + Type<R::Database>,
{
    let photos: String = row.try_get("photos")?;
    Ok(Business {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        category: row.try_get("category")?,
        address: row.try_get("address")?,
        city: row.try_get("city")?,
        phone: row.try_get("phone")?,
        email: row.try_get("email")?,
        website: row.try_get("website")?,
        description: row.try_get("description")?,
        rating: row.try_get("rating")?,
        review_count: row.try_get("review_count")?,
        latitude: row.try_get("latitude")?,
        longitude: row.try_get("longitude")?,
        place_id: row.try_get("place_id")?,
        photos: decode_list(&photos)?,
        logo_url: row.try_get("logo_url")?,
        verified: row.try_get("verified")?,
        created_at_ms: row.try_get("created_at_ms")?,
        updated_at_ms: row.try_get("updated_at_ms")?,
    })
}

pub(crate) fn review_from_row<'r, R>(row: &'r R) -> Result<Review, StoreError>
where
    R: Row,
    &'static str: ColumnIndex<R>,
    String: Decode<'r, R::Database> + Type<R::Database>,
    i64: Decode<'r, R::Database> + Type<R::Database>,
{
    let source: String = row.try_get("source")?;
    Ok(Review {
        id: row.try_get("id")?,
        business_id: row.try_get("business_id")?,
        author_name: row.try_get("author_name")?,
        rating: row.try_get("rating")?,
        text: row.try_get("text")?,
        source: ReviewSource::parse(&source),
        created_at_ms: row.try_get("created_at_ms")?,
    })
}

pub(crate) fn report_from_row<'r, R>(row: &'r R) -> Result<ScamReport, StoreError>
where
    R: Row,
    &'static str: ColumnIndex<R>,
    String: Decode<'r, R::Database> + Type<R::Database>,
    f64: Decode<'r, R::Database> + Type<R::Database>,
    i64: Decode<'r, R::Database> + Type<R::Database>,
{
    let evidence: String = row.try_get("evidence_urls")?;
    Ok(ScamReport {
        id: row.try_get("id")?,
        business_id: row.try_get("business_id")?,
        business_name: row.try_get("business_name")?,
        reporter_name: row.try_get("reporter_name")?,
        reporter_email: row.try_get("reporter_email")?,
        description: row.try_get("description")?,
        amount_lost: row.try_get("amount_lost")?,
        currency: row.try_get("currency")?,
        incident_date: row.try_get("incident_date")?,
        evidence_urls: decode_list(&evidence)?,
        created_at_ms: row.try_get("created_at_ms")?,
    })
}

pub(crate) fn cached_place_from_row<'r, R>(row: &'r R) -> Result<CachedPlace, StoreError>
where
    R: Row,
    &'static str: ColumnIndex<R>,
    String: Decode<'r, R::Database> + Type<R::Database>,
    i64: Decode<'r, R::Database> + Type<R::Database>,
{
    Ok(CachedPlace {
        place_id: row.try_get("place_id")?,
        payload: row.try_get("payload")?,
        fetched_at_ms: row.try_get("fetched_at_ms")?,
    })
}

/// Encodes a list for a TEXT column.
pub(crate) fn encode_list(list: &[String]) -> Result<String, StoreError> {
    Ok(serde_json::to_string(list)?)
}

fn decode_list(text: &str) -> Result<Vec<String>, StoreError> {
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }
    Ok(serde_json::from_str(text)?)
}
