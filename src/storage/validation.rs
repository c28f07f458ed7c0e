//! Payload validation and record construction.
//!
//! Every write path (API, import, Places sync) builds its record through these
//! functions, so all backends see the same invariants.

use url::Url;

use super::models::{
    default_currency, Business, BusinessUpdate, NewBusiness, NewReview, NewScamReport, Review,
    ScamReport,
};
use crate::error_handling::StoreError;

const MAX_NAME_LEN: usize = 200;
const MAX_TEXT_LEN: usize = 5000;
const ANONYMOUS: &str = "Anonymous";

/// Generates a new record id.
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Builds a business from a creation payload.
pub fn build_business(new: NewBusiness, now_ms: i64) -> Result<Business, StoreError> {
    let business = Business {
        id: resolve_id(new.id)?,
        name: new.name.trim().to_string(),
        category: new.category.trim().to_string(),
        address: new.address.trim().to_string(),
        city: new.city.trim().to_string(),
        phone: trimmed(new.phone),
        email: trimmed(new.email),
        website: trimmed(new.website),
        description: new.description.trim().to_string(),
        rating: new.rating,
        review_count: new.review_count,
        latitude: new.latitude,
        longitude: new.longitude,
        place_id: trimmed(new.place_id),
        photos: new.photos,
        logo_url: trimmed(new.logo_url),
        verified: new.verified,
        created_at_ms: now_ms,
        updated_at_ms: now_ms,
    };
    validate_business(&business)?;
    Ok(business)
}

/// Applies a partial update and re-validates the result.
pub fn apply_update(
    business: &mut Business,
    update: BusinessUpdate,
    now_ms: i64,
) -> Result<(), StoreError> {
    if let Some(name) = update.name {
        business.name = name.trim().to_string();
    }
    if let Some(category) = update.category {
        business.category = category.trim().to_string();
    }
    if let Some(address) = update.address {
        business.address = address.trim().to_string();
    }
    if let Some(city) = update.city {
        business.city = city.trim().to_string();
    }
    if let Some(description) = update.description {
        business.description = description.trim().to_string();
    }
    if update.phone.is_some() {
        business.phone = trimmed(update.phone);
    }
    if update.email.is_some() {
        business.email = trimmed(update.email);
    }
    if update.website.is_some() {
        business.website = trimmed(update.website);
    }
    if update.place_id.is_some() {
        business.place_id = trimmed(update.place_id);
    }
    if update.logo_url.is_some() {
        business.logo_url = trimmed(update.logo_url);
    }
    if update.rating.is_some() {
        business.rating = update.rating;
    }
    if let Some(count) = update.review_count {
        business.review_count = count;
    }
    if update.latitude.is_some() {
        business.latitude = update.latitude;
    }
    if update.longitude.is_some() {
        business.longitude = update.longitude;
    }
    if let Some(photos) = update.photos {
        business.photos = photos;
    }
    if let Some(verified) = update.verified {
        business.verified = verified;
    }
    business.updated_at_ms = now_ms;
    validate_business(business)
}

/// Checks the invariants of a business record.
pub fn validate_business(business: &Business) -> Result<(), StoreError> {
    if business.name.trim().is_empty() {
        return Err(StoreError::validation("name", "must not be empty"));
    }
    if business.name.chars().count() > MAX_NAME_LEN {
        return Err(StoreError::validation(
            "name",
            format!("must be at most {MAX_NAME_LEN} characters"),
        ));
    }
    if let Some(rating) = business.rating {
        if !rating.is_finite() || !(0.0..=5.0).contains(&rating) {
            return Err(StoreError::validation("rating", "must be between 0 and 5"));
        }
    }
    if business.review_count < 0 {
        return Err(StoreError::validation(
            "review_count",
            "must not be negative",
        ));
    }
    if let Some(lat) = business.latitude {
        if !(-90.0..=90.0).contains(&lat) {
            return Err(StoreError::validation("latitude", "out of range"));
        }
    }
    if let Some(lng) = business.longitude {
        if !(-180.0..=180.0).contains(&lng) {
            return Err(StoreError::validation("longitude", "out of range"));
        }
    }
    if let Some(email) = &business.email {
        validate_email("email", email)?;
    }
    if let Some(website) = &business.website {
        validate_web_url("website", website)?;
    }
    if let Some(logo) = &business.logo_url {
        validate_web_url("logo_url", logo)?;
    }
    for photo in &business.photos {
        validate_web_url("photos", photo)?;
    }
    Ok(())
}

/// Builds a review from a submission.
pub fn build_review(new: NewReview, now_ms: i64) -> Result<Review, StoreError> {
    let business_id = new.business_id.trim().to_string();
    if business_id.is_empty() {
        return Err(StoreError::validation("business_id", "must not be empty"));
    }
    if !(1..=5).contains(&new.rating) {
        return Err(StoreError::validation("rating", "must be between 1 and 5"));
    }
    let text = new.text.trim().to_string();
    if text.chars().count() > MAX_TEXT_LEN {
        return Err(StoreError::validation(
            "text",
            format!("must be at most {MAX_TEXT_LEN} characters"),
        ));
    }
    Ok(Review {
        id: resolve_id(new.id)?,
        business_id,
        author_name: or_anonymous(&new.author_name),
        rating: new.rating,
        text,
        source: new.source,
        created_at_ms: new.created_at_ms.unwrap_or(now_ms),
    })
}

/// Builds a scam report from a submission.
pub fn build_report(new: NewScamReport, now_ms: i64) -> Result<ScamReport, StoreError> {
    let description = new.description.trim().to_string();
    if description.is_empty() {
        return Err(StoreError::validation("description", "must not be empty"));
    }
    if description.chars().count() > MAX_TEXT_LEN {
        return Err(StoreError::validation(
            "description",
            format!("must be at most {MAX_TEXT_LEN} characters"),
        ));
    }
    let business_id = trimmed(new.business_id);
    let business_name = new.business_name.trim().to_string();
    if business_id.is_none() && business_name.is_empty() {
        return Err(StoreError::validation(
            "business_name",
            "a business id or name is required",
        ));
    }
    let reporter_email = trimmed(new.reporter_email);
    if let Some(email) = &reporter_email {
        validate_email("reporter_email", email)?;
    }
    if let Some(amount) = new.amount_lost {
        if !amount.is_finite() || amount < 0.0 {
            return Err(StoreError::validation(
                "amount_lost",
                "must be a non-negative number",
            ));
        }
    }
    for url in &new.evidence_urls {
        validate_web_url("evidence_urls", url)?;
    }
    Ok(ScamReport {
        id: resolve_id(new.id)?,
        business_id,
        business_name,
        reporter_name: or_anonymous(&new.reporter_name),
        reporter_email,
        description,
        amount_lost: new.amount_lost,
        currency: trimmed(new.currency)
            .map(|c| c.to_uppercase())
            .unwrap_or_else(default_currency),
        incident_date: trimmed(new.incident_date),
        evidence_urls: new.evidence_urls,
        created_at_ms: new.created_at_ms.unwrap_or(now_ms),
    })
}

/// Checks that `value` is an absolute http(s) URL.
pub fn validate_web_url(field: &'static str, value: &str) -> Result<(), StoreError> {
    match Url::parse(value) {
        Ok(url) if url.scheme() == "http" || url.scheme() == "https" => Ok(()),
        Ok(_) => Err(StoreError::validation(field, "must be an http(s) URL")),
        Err(e) => Err(StoreError::validation(field, format!("'{value}': {e}"))),
    }
}

fn validate_email(field: &'static str, value: &str) -> Result<(), StoreError> {
    match value.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(()),
        _ => Err(StoreError::validation(field, "is not an email address")),
    }
}

fn resolve_id(id: Option<String>) -> Result<String, StoreError> {
    match trimmed(id) {
        Some(id) if id.chars().any(char::is_whitespace) => {
            Err(StoreError::validation("id", "must not contain whitespace"))
        }
        Some(id) => Ok(id),
        None => Ok(new_id()),
    }
}

fn trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn or_anonymous(name: &str) -> String {
    let name = name.trim();
    if name.is_empty() {
        ANONYMOUS.to_string()
    } else {
        name.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_business(name: &str) -> NewBusiness {
        NewBusiness {
            name: name.to_string(),
            category: "Visa Services".to_string(),
            city: "Dubai".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_build_business_generates_id_and_timestamps() {
        let business = build_business(new_business("  Gulf Visa Centre "), 1_000).unwrap();
        assert!(!business.id.is_empty());
        assert_eq!(business.name, "Gulf Visa Centre");
        assert_eq!(business.created_at_ms, 1_000);
        assert_eq!(business.updated_at_ms, 1_000);
    }

    #[test]
    fn test_build_business_keeps_given_id() {
        let mut new = new_business("Gulf Visa Centre");
        new.id = Some("gulf-visa".into());
        assert_eq!(build_business(new, 0).unwrap().id, "gulf-visa");
    }

    #[test]
    fn test_build_business_rejects_bad_input() {
        assert!(matches!(
            build_business(new_business("   "), 0),
            Err(StoreError::Validation { field: "name", .. })
        ));

        let mut new = new_business("X");
        new.rating = Some(5.5);
        assert!(matches!(
            build_business(new, 0),
            Err(StoreError::Validation { field: "rating", .. })
        ));

        let mut new = new_business("X");
        new.photos = vec!["ftp://example.com/a.png".into()];
        assert!(matches!(
            build_business(new, 0),
            Err(StoreError::Validation { field: "photos", .. })
        ));

        let mut new = new_business("X");
        new.email = Some("not-an-email".into());
        assert!(matches!(
            build_business(new, 0),
            Err(StoreError::Validation { field: "email", .. })
        ));

        let mut new = new_business("X");
        new.id = Some("has space".into());
        assert!(matches!(
            build_business(new, 0),
            Err(StoreError::Validation { field: "id", .. })
        ));
    }

    #[test]
    fn test_apply_update_changes_only_given_fields() {
        let mut business = build_business(new_business("Gulf Visa Centre"), 1).unwrap();
        apply_update(
            &mut business,
            BusinessUpdate {
                city: Some("Abu Dhabi".into()),
                verified: Some(true),
                ..Default::default()
            },
            2,
        )
        .unwrap();
        assert_eq!(business.name, "Gulf Visa Centre");
        assert_eq!(business.city, "Abu Dhabi");
        assert!(business.verified);
        assert_eq!(business.updated_at_ms, 2);
        assert_eq!(business.created_at_ms, 1);
    }

    #[test]
    fn test_apply_update_revalidates() {
        let mut business = build_business(new_business("Gulf Visa Centre"), 1).unwrap();
        let result = apply_update(
            &mut business,
            BusinessUpdate {
                name: Some(String::new()),
                ..Default::default()
            },
            2,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_build_review() {
        let review = build_review(
            NewReview {
                business_id: "b1".into(),
                rating: 4,
                text: " Fast and honest ".into(),
                ..Default::default()
            },
            42,
        )
        .unwrap();
        assert_eq!(review.author_name, "Anonymous");
        assert_eq!(review.text, "Fast and honest");
        assert_eq!(review.created_at_ms, 42);

        for rating in [0, 6] {
            let result = build_review(
                NewReview {
                    business_id: "b1".into(),
                    rating,
                    ..Default::default()
                },
                0,
            );
            assert!(matches!(
                result,
                Err(StoreError::Validation { field: "rating", .. })
            ));
        }
    }

    #[test]
    fn test_build_report() {
        let report = build_report(
            NewScamReport {
                business_name: "Fake Visa LLC".into(),
                description: "Took a deposit and disappeared".into(),
                amount_lost: Some(2500.0),
                currency: Some("aed".into()),
                ..Default::default()
            },
            7,
        )
        .unwrap();
        assert_eq!(report.currency, "AED");
        assert_eq!(report.reporter_name, "Anonymous");
        assert!(report.business_id.is_none());

        let missing_target = build_report(
            NewScamReport {
                description: "Something happened".into(),
                ..Default::default()
            },
            0,
        );
        assert!(matches!(
            missing_target,
            Err(StoreError::Validation {
                field: "business_name",
                ..
            })
        ));

        let negative = build_report(
            NewScamReport {
                business_name: "Fake Visa LLC".into(),
                description: "x".into(),
                amount_lost: Some(-1.0),
                ..Default::default()
            },
            0,
        );
        assert!(negative.is_err());
    }

    #[test]
    fn test_default_currency() {
        let report = build_report(
            NewScamReport {
                business_name: "Fake Visa LLC".into(),
                description: "x".into(),
                ..Default::default()
            },
            0,
        )
        .unwrap();
        assert_eq!(report.currency, "AED");
    }
}
