//! PostgreSQL backend (self-hosted or Neon).

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};

use super::filter::like_pattern;
use super::models::{Business, BusinessQuery, CachedPlace, Page, Review, ScamReport};
use super::rows::{
    business_from_row, cached_place_from_row, encode_list, report_from_row, review_from_row,
    BUSINESS_COLUMNS, REPORT_COLUMNS, REVIEW_COLUMNS,
};
use super::store::DirectoryStore;
use crate::error_handling::StoreError;

/// Directory stored in PostgreSQL.
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Wraps a pool whose schema has already been migrated.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// ASCII-only lower-casing, matching SQLite's `LOWER` and the in-memory filters.
fn ascii_lower(expr: &str) -> String {
    format!("TRANSLATE({expr}, 'ABCDEFGHIJKLMNOPQRSTUVWXYZ', 'abcdefghijklmnopqrstuvwxyz')")
}

fn push_filters(builder: &mut QueryBuilder<'_, Postgres>, query: &BusinessQuery) {
    builder.push(" WHERE TRUE");
    if let Some(category) = query.category_filter() {
        builder
            .push(format!(" AND {} = ", ascii_lower("category")))
            .push_bind(category.to_ascii_lowercase());
    }
    if let Some(city) = query.city_filter() {
        builder
            .push(format!(" AND {} = ", ascii_lower("city")))
            .push_bind(city.to_ascii_lowercase());
    }
    if let Some(term) = query.search_term() {
        let pattern = like_pattern(term);
        builder.push(" AND (");
        for (i, column) in ["name", "description", "address", "category"]
            .iter()
            .enumerate()
        {
            if i > 0 {
                builder.push(" OR ");
            }
            builder
                .push(format!("{} LIKE ", ascii_lower(column)))
                .push_bind(pattern.clone())
                .push(" ESCAPE '\\'");
        }
        builder.push(")");
    }
}

#[async_trait]
impl DirectoryStore for PostgresStore {
    fn backend_name(&self) -> &'static str {
        "postgres"
    }

    async fn list_businesses(&self, query: &BusinessQuery) -> Result<Page<Business>, StoreError> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM businesses");
        push_filters(&mut count, query);
        let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;

        let mut select = QueryBuilder::<Postgres>::new(format!(
            "SELECT {BUSINESS_COLUMNS} FROM businesses"
        ));
        push_filters(&mut select, query);
        select
            .push(" ORDER BY name COLLATE \"C\" ASC, id COLLATE \"C\" ASC LIMIT ")
            .push_bind(i64::from(query.limit()))
            .push(" OFFSET ")
            .push_bind(query.offset() as i64);

        let rows = select.build().fetch_all(&self.pool).await?;
        let items = rows
            .iter()
            .map(business_from_row)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Page::new(items, total.max(0) as u64, query))
    }

    async fn all_businesses(&self) -> Result<Vec<Business>, StoreError> {
        let rows = sqlx::query(&format!(
            "SELECT {BUSINESS_COLUMNS} FROM businesses ORDER BY name COLLATE \"C\" ASC, id COLLATE \"C\" ASC"
        ))
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(business_from_row).collect()
    }

    async fn get_business(&self, id: &str) -> Result<Option<Business>, StoreError> {
        let row = sqlx::query(&format!(
            "SELECT {BUSINESS_COLUMNS} FROM businesses WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(business_from_row).transpose()
    }

    async fn insert_business(&self, b: &Business) -> Result<(), StoreError> {
        sqlx::query(&format!(
            "INSERT INTO businesses ({BUSINESS_COLUMNS})
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19)"
        ))
        .bind(&b.id)
        .bind(&b.name)
        .bind(&b.category)
        .bind(&b.address)
        .bind(&b.city)
        .bind(&b.phone)
        .bind(&b.email)
        .bind(&b.website)
        .bind(&b.description)
        .bind(b.rating)
        .bind(b.review_count)
        .bind(b.latitude)
        .bind(b.longitude)
        .bind(&b.place_id)
        .bind(encode_list(&b.photos)?)
        .bind(&b.logo_url)
        .bind(b.verified)
        .bind(b.created_at_ms)
        .bind(b.updated_at_ms)
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::from_insert(e, "business", &b.id))?;
        Ok(())
    }

    async fn save_business(&self, b: &Business) -> Result<bool, StoreError> {
        let result = sqlx::query(
            "UPDATE businesses SET
                name = $1, category = $2, address = $3, city = $4, phone = $5, email = $6,
                website = $7, description = $8, rating = $9, review_count = $10, latitude = $11,
                longitude = $12, place_id = $13, photos = $14, logo_url = $15, verified = $16,
                created_at_ms = $17, updated_at_ms = $18
             WHERE id = $19",
        )
        .bind(&b.name)
        .bind(&b.category)
        .bind(&b.address)
        .bind(&b.city)
        .bind(&b.phone)
        .bind(&b.email)
        .bind(&b.website)
        .bind(&b.description)
        .bind(b.rating)
        .bind(b.review_count)
        .bind(b.latitude)
        .bind(b.longitude)
        .bind(&b.place_id)
        .bind(encode_list(&b.photos)?)
        .bind(&b.logo_url)
        .bind(b.verified)
        .bind(b.created_at_ms)
        .bind(b.updated_at_ms)
        .bind(&b.id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_business(&self, id: &str) -> Result<bool, StoreError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM reviews WHERE business_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("UPDATE scam_reports SET business_id = NULL WHERE business_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        let result = sqlx::query("DELETE FROM businesses WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }

    async fn categories(&self) -> Result<Vec<String>, StoreError> {
        let categories = sqlx::query_scalar::<_, String>(
            "SELECT DISTINCT TRIM(category) COLLATE \"C\" AS category FROM businesses
             WHERE TRIM(category) <> '' ORDER BY 1",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(categories)
    }

    async fn list_reviews(&self, business_id: &str) -> Result<Vec<Review>, StoreError> {
        let rows = sqlx::query(&format!(
            "SELECT {REVIEW_COLUMNS} FROM reviews WHERE business_id = $1
             ORDER BY created_at_ms DESC, id ASC"
        ))
        .bind(business_id)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(review_from_row).collect()
    }

    async fn all_reviews(&self) -> Result<Vec<Review>, StoreError> {
        let rows = sqlx::query(&format!(
            "SELECT {REVIEW_COLUMNS} FROM reviews ORDER BY created_at_ms DESC, id ASC"
        ))
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(review_from_row).collect()
    }

    async fn insert_review(&self, r: &Review) -> Result<(), StoreError> {
        sqlx::query(&format!(
            "INSERT INTO reviews ({REVIEW_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7)"
        ))
        .bind(&r.id)
        .bind(&r.business_id)
        .bind(&r.author_name)
        .bind(r.rating)
        .bind(&r.text)
        .bind(r.source.as_str())
        .bind(r.created_at_ms)
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::from_insert(e, "review", &r.id))?;
        Ok(())
    }

    async fn list_reports(&self, business_id: Option<&str>) -> Result<Vec<ScamReport>, StoreError> {
        let mut builder = QueryBuilder::<Postgres>::new(format!(
            "SELECT {REPORT_COLUMNS} FROM scam_reports"
        ));
        if let Some(id) = business_id {
            builder.push(" WHERE business_id = ").push_bind(id.to_string());
        }
        builder.push(" ORDER BY created_at_ms DESC, id ASC");
        let rows = builder.build().fetch_all(&self.pool).await?;
        rows.iter().map(report_from_row).collect()
    }

    async fn insert_report(&self, r: &ScamReport) -> Result<(), StoreError> {
        sqlx::query(&format!(
            "INSERT INTO scam_reports ({REPORT_COLUMNS})
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)"
        ))
        .bind(&r.id)
        .bind(&r.business_id)
        .bind(&r.business_name)
        .bind(&r.reporter_name)
        .bind(&r.reporter_email)
        .bind(&r.description)
        .bind(r.amount_lost)
        .bind(&r.currency)
        .bind(&r.incident_date)
        .bind(encode_list(&r.evidence_urls)?)
        .bind(r.created_at_ms)
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::from_insert(e, "scam report", &r.id))?;
        Ok(())
    }

    async fn cached_place(&self, place_id: &str) -> Result<Option<CachedPlace>, StoreError> {
        let row = sqlx::query(
            "SELECT place_id, payload, fetched_at_ms FROM places_cache WHERE place_id = $1",
        )
        .bind(place_id)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(cached_place_from_row).transpose()
    }

    async fn store_place(&self, place: &CachedPlace) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO places_cache (place_id, payload, fetched_at_ms) VALUES ($1, $2, $3)
             ON CONFLICT (place_id) DO UPDATE SET
                payload = EXCLUDED.payload,
                fetched_at_ms = EXCLUDED.fetched_at_ms",
        )
        .bind(&place.place_id)
        .bind(&place.payload)
        .bind(place.fetched_at_ms)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
