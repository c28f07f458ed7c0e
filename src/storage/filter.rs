//! In-memory filtering and pagination.
//!
//! Used by backends without a query engine (static JSON) and by the fallback
//! chain. Semantics match the SQL backends: ASCII case-insensitive category and
//! city equality, ASCII case-insensitive substring search over name,
//! description, address and category, ordered bytewise by name then id.
//! Non-ASCII letters compare exactly, as SQLite's `LOWER` leaves them alone.

use super::models::{Business, BusinessQuery, Page};

/// Whether `business` passes the filters in `query`.
pub fn matches(business: &Business, query: &BusinessQuery) -> bool {
    if let Some(category) = query.category_filter() {
        if !business.category.eq_ignore_ascii_case(category) {
            return false;
        }
    }
    if let Some(city) = query.city_filter() {
        if !business.city.eq_ignore_ascii_case(city) {
            return false;
        }
    }
    if let Some(term) = query.search_term() {
        let term = term.to_ascii_lowercase();
        let hit = [
            &business.name,
            &business.description,
            &business.address,
            &business.category,
        ]
        .iter()
        .any(|field| field.to_ascii_lowercase().contains(&term));
        if !hit {
            return false;
        }
    }
    true
}

/// Sorts by name, then id.
pub fn sort_businesses(businesses: &mut [Business]) {
    businesses.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
}

/// Filters, sorts and slices `businesses` into the requested page.
pub fn paginate(businesses: Vec<Business>, query: &BusinessQuery) -> Page<Business> {
    let mut filtered: Vec<Business> = businesses
        .into_iter()
        .filter(|b| matches(b, query))
        .collect();
    sort_businesses(&mut filtered);

    let total = filtered.len() as u64;
    let offset = usize::try_from(query.offset()).unwrap_or(usize::MAX);
    let items = filtered
        .into_iter()
        .skip(offset)
        .take(query.limit() as usize)
        .collect();
    Page::new(items, total, query)
}

/// Distinct non-empty categories, sorted.
pub fn distinct_categories<'a>(businesses: impl IntoIterator<Item = &'a Business>) -> Vec<String> {
    let mut categories: Vec<String> = businesses
        .into_iter()
        .map(|b| b.category.trim())
        .filter(|c| !c.is_empty())
        .map(str::to_string)
        .collect();
    categories.sort();
    categories.dedup();
    categories
}

/// Escapes a search term for use inside `LIKE ... ESCAPE '\'`.
pub(crate) fn like_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for c in term.to_ascii_lowercase().chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}
