use aero_core::catalog::Airport;
use aero_core::repository::AirportRepository;
use aero_core::CoreResult;
use aero_shared::PageRequest;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::error::DbResultExt;

pub struct StoreAirportRepository {
    pool: PgPool,
}

impl StoreAirportRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct AirportRow {
    id: String,
    code: String,
    city: String,
    name: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<AirportRow> for Airport {
    fn from(row: AirportRow) -> Self {
        Airport {
            id: row.id,
            code: row.code,
            city: row.city,
            name: row.name,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

const SELECT_AIRPORT: &str = "SELECT id, code, city, name, created_at, updated_at FROM airports";

#[async_trait]
impl AirportRepository for StoreAirportRepository {
    async fn create(&self, airport: &Airport) -> CoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO airports (id, code, city, name, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(&airport.id)
        .bind(&airport.code)
        .bind(&airport.city)
        .bind(&airport.name)
        .bind(airport.created_at)
        .bind(airport.updated_at)
        .execute(&self.pool)
        .await
        .or_core("airport code")?;

        Ok(())
    }

    async fn update(&self, airport: &Airport) -> CoreResult<()> {
        sqlx::query("UPDATE airports SET code = $2, city = $3, name = $4, updated_at = $5 WHERE id = $1")
            .bind(&airport.id)
            .bind(&airport.code)
            .bind(&airport.city)
            .bind(&airport.name)
            .bind(airport.updated_at)
            .execute(&self.pool)
            .await
            .or_core("airport code")?;

        Ok(())
    }

    async fn delete(&self, id: &str) -> CoreResult<bool> {
        // Fails with a validation error while schedules still reference it.
        let result = sqlx::query("DELETE FROM airports WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .or_core("airport")?;

        Ok(result.rows_affected() > 0)
    }

    async fn find_by_id(&self, id: &str) -> CoreResult<Option<Airport>> {
        let row = sqlx::query_as::<_, AirportRow>(&format!("{} WHERE id = $1", SELECT_AIRPORT))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .or_core("airport")?;

        Ok(row.map(Airport::from))
    }

    async fn find_by_code(&self, code: &str) -> CoreResult<Option<Airport>> {
        let row = sqlx::query_as::<_, AirportRow>(&format!("{} WHERE code = $1", SELECT_AIRPORT))
            .bind(code)
            .fetch_optional(&self.pool)
            .await
            .or_core("airport")?;

        Ok(row.map(Airport::from))
    }

    async fn list(&self, page: PageRequest) -> CoreResult<(Vec<Airport>, i64)> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM airports")
            .fetch_one(&self.pool)
            .await
            .or_core("airport")?;

        let rows = sqlx::query_as::<_, AirportRow>(&format!(
            "{} ORDER BY code ASC LIMIT $1 OFFSET $2",
            SELECT_AIRPORT
        ))
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await
        .or_core("airport")?;

        Ok((rows.into_iter().map(Airport::from).collect(), total))
    }

    async fn list_all(&self) -> CoreResult<Vec<Airport>> {
        let rows = sqlx::query_as::<_, AirportRow>(&format!("{} ORDER BY code ASC", SELECT_AIRPORT))
            .fetch_all(&self.pool)
            .await
            .or_core("airport")?;

        Ok(rows.into_iter().map(Airport::from).collect())
    }

    async fn search(&self, query: &str) -> CoreResult<Vec<Airport>> {
        let pattern = format!("%{}%", escape_like(query));
        let rows = sqlx::query_as::<_, AirportRow>(&format!(
            "{} WHERE code ILIKE $1 OR city ILIKE $1 OR name ILIKE $1 ORDER BY code ASC",
            SELECT_AIRPORT
        ))
        .bind(pattern)
        .fetch_all(&self.pool)
        .await
        .or_core("airport")?;

        Ok(rows.into_iter().map(Airport::from).collect())
    }
}

fn escape_like(raw: &str) -> String {
    raw.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("ba_li%"), "ba\\_li\\%");
        assert_eq!(escape_like("Jakarta"), "Jakarta");
    }
}
