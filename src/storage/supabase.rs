//! Supabase backend over the PostgREST API.
//!
//! Tables match the Postgres schema (`migrations/postgres`). Requests carry
//! the project key both as `apikey` and as a bearer token.
//!
//! Filters use PostgREST `ilike` and `order`, so case folding and name order
//! follow the database collation rather than the ASCII rules of the SQL
//! backends.

use async_trait::async_trait;
use reqwest::{header::HeaderMap, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use url::Url;

use super::filter::distinct_categories;
use super::models::{Business, BusinessQuery, CachedPlace, Page, Review, ScamReport};
use super::store::DirectoryStore;
use crate::error_handling::StoreError;

/// PostgREST caps responses at its `max-rows` setting, so bulk reads page through.
const FETCH_BATCH: u64 = 1000;

/// Directory stored in a Supabase project.
#[derive(Clone)]
pub struct SupabaseStore {
    client: reqwest::Client,
    rest_base: Url,
    key: String,
}

/// Body that clears the business link on scam reports.
#[derive(Serialize)]
struct Unlink {
    business_id: Option<String>,
}

#[derive(Deserialize)]
struct CategoryRow {
    #[serde(default)]
    category: Option<String>,
}

impl SupabaseStore {
    /// `project_url` is the project root, e.g. `https://abc.supabase.co`.
    pub fn new(client: reqwest::Client, project_url: &str, key: &str) -> Result<Self, StoreError> {
        let mut root = Url::parse(project_url)
            .map_err(|e| StoreError::validation("supabase_url", e.to_string()))?;
        if !root.path().ends_with('/') {
            let path = format!("{}/", root.path());
            root.set_path(&path);
        }
        let rest_base = root
            .join("rest/v1/")
            .map_err(|e| StoreError::validation("supabase_url", e.to_string()))?;
        Ok(Self {
            client,
            rest_base,
            key: key.to_string(),
        })
    }

    fn table_url(&self, table: &str) -> Result<Url, StoreError> {
        self.rest_base
            .join(table)
            .map_err(|e| StoreError::validation("table", e.to_string()))
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.client
            .request(method, url)
            .header("apikey", &self.key)
            .bearer_auth(&self.key)
    }

    async fn check(response: Response) -> Result<Response, StoreError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(StoreError::Remote {
            status: status.as_u16(),
            body,
        })
    }

    async fn get_rows<T: DeserializeOwned>(&self, url: Url) -> Result<Vec<T>, StoreError> {
        let response = self.request(Method::GET, url).send().await?;
        Ok(Self::check(response).await?.json().await?)
    }

    /// Reads every row of `table` matching `filters`, in batches.
    async fn fetch_all<T: DeserializeOwned>(
        &self,
        table: &str,
        filters: &[(&str, String)],
        order: &str,
    ) -> Result<Vec<T>, StoreError> {
        self.fetch_all_columns(table, "*", filters, order).await
    }

    /// Pages through `table` in `FETCH_BATCH` steps, selecting `columns`.
    async fn fetch_all_columns<T: DeserializeOwned>(
        &self,
        table: &str,
        columns: &str,
        filters: &[(&str, String)],
        order: &str,
    ) -> Result<Vec<T>, StoreError> {
        let mut rows = Vec::new();
        let mut offset = 0u64;
        loop {
            let mut url = self.table_url(table)?;
            {
                let mut pairs = url.query_pairs_mut();
                pairs.append_pair("select", columns).append_pair("order", order);
                for (key, value) in filters {
                    pairs.append_pair(key, value);
                }
                pairs
                    .append_pair("offset", &offset.to_string())
                    .append_pair("limit", &FETCH_BATCH.to_string());
            }
            let batch: Vec<T> = self.get_rows(url).await?;
            let fetched = batch.len() as u64;
            rows.extend(batch);
            if fetched < FETCH_BATCH {
                return Ok(rows);
            }
            offset += fetched;
        }
    }

    async fn insert_row<T: Serialize + Sync>(
        &self,
        table: &str,
        row: &T,
        entity: &'static str,
        id: &str,
    ) -> Result<(), StoreError> {
        let response = self
            .request(Method::POST, self.table_url(table)?)
            .header("Prefer", "return=minimal")
            .json(row)
            .send()
            .await?;
        if response.status() == StatusCode::CONFLICT {
            return Err(StoreError::Conflict {
                entity,
                id: id.to_string(),
            });
        }
        Self::check(response).await?;
        Ok(())
    }

    fn eq(value: &str) -> String {
        format!("eq.{value}")
    }
}

/// Total row count from a `Content-Range: 0-11/42` header.
pub(crate) fn parse_content_range_total(headers: &HeaderMap) -> Option<u64> {
    headers
        .get("content-range")?
        .to_str()
        .ok()?
        .rsplit('/')
        .next()?
        .parse()
        .ok()
}

/// PostgREST value quoting: reserved characters are allowed inside double quotes.
fn quoted(value: &str) -> String {
    let cleaned: String = value.chars().filter(|c| *c != '"' && *c != '\\').collect();
    format!("\"{cleaned}\"")
}

#[async_trait]
impl DirectoryStore for SupabaseStore {
    fn backend_name(&self) -> &'static str {
        "supabase"
    }

    async fn list_businesses(&self, query: &BusinessQuery) -> Result<Page<Business>, StoreError> {
        let mut url = self.table_url("businesses")?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs
                .append_pair("select", "*")
                .append_pair("order", "name.asc,id.asc")
                .append_pair("offset", &query.offset().to_string())
                .append_pair("limit", &query.limit().to_string());
            if let Some(category) = query.category_filter() {
                pairs.append_pair("category", &format!("ilike.{}", quoted(category)));
            }
            if let Some(city) = query.city_filter() {
                pairs.append_pair("city", &format!("ilike.{}", quoted(city)));
            }
            if let Some(term) = query.search_term() {
                let pattern = quoted(&format!("*{term}*"));
                let clauses: Vec<String> = ["name", "description", "address", "category"]
                    .iter()
                    .map(|column| format!("{column}.ilike.{pattern}"))
                    .collect();
                pairs.append_pair("or", &format!("({})", clauses.join(",")));
            }
        }

        let response = self
            .request(Method::GET, url)
            .header("Prefer", "count=exact")
            .send()
            .await?;
        let response = Self::check(response).await?;
        let total = parse_content_range_total(response.headers());
        let items: Vec<Business> = response.json().await?;
        let total = total.unwrap_or(query.offset() + items.len() as u64);
        Ok(Page::new(items, total, query))
    }

    async fn all_businesses(&self) -> Result<Vec<Business>, StoreError> {
        self.fetch_all("businesses", &[], "name.asc,id.asc").await
    }

    async fn get_business(&self, id: &str) -> Result<Option<Business>, StoreError> {
        let mut url = self.table_url("businesses")?;
        url.query_pairs_mut()
            .append_pair("select", "*")
            .append_pair("id", &Self::eq(id));
        let rows: Vec<Business> = self.get_rows(url).await?;
        Ok(rows.into_iter().next())
    }

    async fn insert_business(&self, business: &Business) -> Result<(), StoreError> {
        self.insert_row("businesses", business, "business", &business.id)
            .await
    }

    async fn save_business(&self, business: &Business) -> Result<bool, StoreError> {
        let mut url = self.table_url("businesses")?;
        url.query_pairs_mut()
            .append_pair("id", &Self::eq(&business.id));
        let response = self
            .request(Method::PATCH, url)
            .header("Prefer", "return=representation")
            .json(business)
            .send()
            .await?;
        let rows: Vec<Business> = Self::check(response).await?.json().await?;
        Ok(!rows.is_empty())
    }

    async fn delete_business(&self, id: &str) -> Result<bool, StoreError> {
        let mut reviews = self.table_url("reviews")?;
        reviews
            .query_pairs_mut()
            .append_pair("business_id", &Self::eq(id));
        Self::check(self.request(Method::DELETE, reviews).send().await?).await?;

        let mut reports = self.table_url("scam_reports")?;
        reports
            .query_pairs_mut()
            .append_pair("business_id", &Self::eq(id));
        Self::check(
            self.request(Method::PATCH, reports)
                .json(&Unlink { business_id: None })
                .send()
                .await?,
        )
        .await?;

        let mut url = self.table_url("businesses")?;
        url.query_pairs_mut().append_pair("id", &Self::eq(id));
        let response = self
            .request(Method::DELETE, url)
            .header("Prefer", "return=representation")
            .send()
            .await?;
        let rows: Vec<Business> = Self::check(response).await?.json().await?;
        Ok(!rows.is_empty())
    }

    async fn categories(&self) -> Result<Vec<String>, StoreError> {
        let rows: Vec<CategoryRow> = self
            .fetch_all_columns("businesses", "category", &[], "category.asc,id.asc")
            .await?;
        let businesses: Vec<Business> = rows
            .into_iter()
            .map(|row| Business {
                category: row.category.unwrap_or_default(),
                ..Default::default()
            })
            .collect();
        Ok(distinct_categories(&businesses))
    }

    async fn list_reviews(&self, business_id: &str) -> Result<Vec<Review>, StoreError> {
        self.fetch_all(
            "reviews",
            &[("business_id", Self::eq(business_id))],
            "created_at_ms.desc,id.asc",
        )
        .await
    }

    async fn all_reviews(&self) -> Result<Vec<Review>, StoreError> {
        self.fetch_all("reviews", &[], "created_at_ms.desc,id.asc")
            .await
    }

    async fn insert_review(&self, review: &Review) -> Result<(), StoreError> {
        self.insert_row("reviews", review, "review", &review.id)
            .await
    }

    async fn list_reports(&self, business_id: Option<&str>) -> Result<Vec<ScamReport>, StoreError> {
        let filters: Vec<(&str, String)> = business_id
            .map(|id| vec![("business_id", Self::eq(id))])
            .unwrap_or_default();
        self.fetch_all("scam_reports", &filters, "created_at_ms.desc,id.asc")
            .await
    }

    async fn insert_report(&self, report: &ScamReport) -> Result<(), StoreError> {
        self.insert_row("scam_reports", report, "scam report", &report.id)
            .await
    }

    async fn cached_place(&self, place_id: &str) -> Result<Option<CachedPlace>, StoreError> {
        let mut url = self.table_url("places_cache")?;
        url.query_pairs_mut()
            .append_pair("select", "*")
            .append_pair("place_id", &Self::eq(place_id));
        let rows: Vec<CachedPlace> = self.get_rows(url).await?;
        Ok(rows.into_iter().next())
    }

    async fn store_place(&self, place: &CachedPlace) -> Result<(), StoreError> {
        let mut url = self.table_url("places_cache")?;
        url.query_pairs_mut().append_pair("on_conflict", "place_id");
        let response = self
            .request(Method::POST, url)
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(place)
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }
}
