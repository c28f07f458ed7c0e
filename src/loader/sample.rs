//! Built-in sample listings, served when no data source is reachable.

use crate::storage::Business;

struct SampleEntry {
    id: &'static str,
    name: &'static str,
    category: &'static str,
    address: &'static str,
    city: &'static str,
    description: &'static str,
    rating: f64,
    review_count: i64,
    latitude: f64,
    longitude: f64,
}

const SAMPLES: &[SampleEntry] = &[
    SampleEntry {
        id: "sample-amer-centre-deira",
        name: "Amer Centre Deira",
        category: "Visa Services",
        address: "Al Rigga Road, Deira",
        city: "Dubai",
        description: "Government-approved centre for residence visa applications, renewals and status changes.",
        rating: 4.3,
        review_count: 128,
        latitude: 25.2637,
        longitude: 55.3227,
    },
    SampleEntry {
        id: "sample-business-bay-pro",
        name: "Business Bay PRO Services",
        category: "PRO Services",
        address: "Bay Square, Business Bay",
        city: "Dubai",
        description: "Company formation, labour card and employee visa processing for mainland businesses.",
        rating: 4.1,
        review_count: 64,
        latitude: 25.1865,
        longitude: 55.2783,
    },
    SampleEntry {
        id: "sample-sharjah-typing-centre",
        name: "Sharjah Typing Centre",
        category: "Typing Services",
        address: "King Faisal Street, Al Majaz",
        city: "Sharjah",
        description: "Typing and document attestation for visit, tourist and family visas.",
        rating: 3.9,
        review_count: 41,
        latitude: 25.3260,
        longitude: 55.3850,
    },
    SampleEntry {
        id: "sample-tasheel-al-barsha",
        name: "Tasheel Al Barsha",
        category: "Immigration Services",
        address: "Al Barsha 1, near Mall of the Emirates",
        city: "Dubai",
        description: "Work permits, establishment cards and Ministry of Human Resources transactions.",
        rating: 4.0,
        review_count: 93,
        latitude: 25.1140,
        longitude: 55.1960,
    },
];

/// The built-in sample, sorted by name.
pub fn sample_businesses() -> Vec<Business> {
    SAMPLES
        .iter()
        .map(|s| Business {
            id: s.id.to_string(),
            name: s.name.to_string(),
            category: s.category.to_string(),
            address: s.address.to_string(),
            city: s.city.to_string(),
            description: s.description.to_string(),
            rating: Some(s.rating),
            review_count: s.review_count,
            latitude: Some(s.latitude),
            longitude: Some(s.longitude),
            ..Default::default()
        })
        .collect()
}
