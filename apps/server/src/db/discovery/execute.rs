//! Query execution against Postgres.

use async_trait::async_trait;
use chrono::{DateTime, Local, Utc};
use sqlx::postgres::PgRow;
use sqlx::Row;
use uuid::Uuid;

use super::predicate::{escape_like_pattern, BindValue};
use super::{DiscoveryEngine, DiscoveryPage, DiscoveryQuery, FilterCriteria};
use crate::db::traits::EventDiscoveryStore;
use crate::error::{Error, Result};
use crate::models::{Category, EventSummary, Visibility};

#[async_trait]
impl EventDiscoveryStore for DiscoveryEngine {
    #[tracing::instrument(skip_all, fields(page = criteria.page, limit = criteria.limit))]
    async fn discover(&self, criteria: &FilterCriteria) -> Result<DiscoveryPage> {
        // Compile once so both statements share the predicate and the clock.
        let query = DiscoveryQuery::new(criteria, &Local::now());
        let (page_sql, page_binds) = query.build_sql();
        let (count_sql, count_binds) = query.build_count_sql();

        let (rows, total) = futures::try_join!(
            self.fetch_rows(&page_sql, page_binds),
            self.fetch_count(&count_sql, count_binds)
        )?;

        let events = rows.iter().map(row_to_summary).collect::<Result<Vec<_>>>()?;
        tracing::debug!(matched = total, returned = events.len(), "discovery query executed");
        Ok(DiscoveryPage { events, total })
    }

    async fn event_location_corpus(&self, query: &str) -> Result<Vec<String>> {
        let pattern = format!("%{}%", escape_like_pattern(query));
        let locations = sqlx::query_scalar::<_, String>(
            "SELECT DISTINCT location FROM events \
             WHERE location IS NOT NULL AND location <> '' \
             AND location ILIKE $1 ESCAPE E'\\\\'",
        )
        .bind(pattern)
        .fetch_all(&self.db_pool)
        .await
        .map_err(Error::Database)?;
        Ok(locations)
    }

    async fn structured_city_corpus(&self, query: &str) -> Result<Vec<String>> {
        let pattern = format!("%{}%", escape_like_pattern(query));
        let cities = sqlx::query_scalar::<_, String>(
            "SELECT DISTINCT city FROM locations \
             WHERE city <> '' AND city ILIKE $1 ESCAPE E'\\\\'",
        )
        .bind(pattern)
        .fetch_all(&self.db_pool)
        .await
        .map_err(Error::Database)?;
        Ok(cities)
    }
}

impl DiscoveryEngine {
    async fn fetch_rows(&self, sql: &str, bind_params: Vec<BindValue>) -> Result<Vec<PgRow>> {
        let query = bind_params
            .into_iter()
            .fold(sqlx::query(sql), |query, bind| match bind {
                BindValue::Text(value) => query.bind(value),
                BindValue::TextArray(values) => query.bind(values),
            });
        query.fetch_all(&self.db_pool).await.map_err(Error::Database)
    }

    async fn fetch_count(&self, sql: &str, bind_params: Vec<BindValue>) -> Result<i64> {
        let query = bind_params
            .into_iter()
            .fold(sqlx::query_scalar::<_, i64>(sql), |query, bind| match bind {
                BindValue::Text(value) => query.bind(value),
                BindValue::TextArray(values) => query.bind(values),
            });
        query.fetch_one(&self.db_pool).await.map_err(Error::Database)
    }
}

fn row_to_summary(row: &PgRow) -> Result<EventSummary> {
    let visibility: String = row.try_get("visibility")?;
    let category: String = row.try_get("category")?;
    Ok(EventSummary {
        id: row.try_get::<Uuid, _>("id")?,
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        // Unknown stored labels degrade to the broadest values rather than
        // failing the whole page.
        visibility: Visibility::parse(&visibility).unwrap_or(Visibility::Public),
        category: Category::parse(&category).unwrap_or(Category::Other),
        cover_image_url: row.try_get("cover_image_url")?,
        max_participants: row.try_get("max_participants")?,
        event_date: row.try_get::<Option<DateTime<Utc>>, _>("event_date")?,
        location: row.try_get("location")?,
        is_online: row.try_get("is_online")?,
        meeting_link: row.try_get("meeting_link")?,
        creator: row.try_get::<Uuid, _>("creator_id")?,
        created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
        updated_at: row.try_get::<DateTime<Utc>, _>("updated_at")?,
    })
}
