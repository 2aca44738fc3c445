use aero_core::catalog::Airline;
use aero_core::repository::AirlineRepository;
use aero_core::CoreResult;
use aero_shared::PageRequest;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::error::DbResultExt;

pub struct StoreAirlineRepository {
    pool: PgPool,
}

impl StoreAirlineRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct AirlineRow {
    id: String,
    code: String,
    name: String,
    logo: Option<String>,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<AirlineRow> for Airline {
    fn from(row: AirlineRow) -> Self {
        Airline {
            id: row.id,
            code: row.code,
            name: row.name,
            logo: row.logo,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

const SELECT_AIRLINE: &str =
    "SELECT id, code, name, logo, is_active, created_at, updated_at FROM airlines";

#[async_trait]
impl AirlineRepository for StoreAirlineRepository {
    async fn create(&self, airline: &Airline) -> CoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO airlines (id, code, name, logo, is_active, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(&airline.id)
        .bind(&airline.code)
        .bind(&airline.name)
        .bind(&airline.logo)
        .bind(airline.is_active)
        .bind(airline.created_at)
        .bind(airline.updated_at)
        .execute(&self.pool)
        .await
        .or_core("airline code")?;

        Ok(())
    }

    async fn update(&self, airline: &Airline) -> CoreResult<()> {
        sqlx::query(
            r#"
            UPDATE airlines
            SET code = $2, name = $3, logo = $4, is_active = $5, updated_at = $6
            WHERE id = $1
            "#,
        )
        .bind(&airline.id)
        .bind(&airline.code)
        .bind(&airline.name)
        .bind(&airline.logo)
        .bind(airline.is_active)
        .bind(airline.updated_at)
        .execute(&self.pool)
        .await
        .or_core("airline code")?;

        Ok(())
    }

    async fn delete(&self, id: &str) -> CoreResult<bool> {
        let result = sqlx::query("DELETE FROM airlines WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .or_core("airline")?;

        Ok(result.rows_affected() > 0)
    }

    async fn find_by_id(&self, id: &str) -> CoreResult<Option<Airline>> {
        let row = sqlx::query_as::<_, AirlineRow>(&format!("{} WHERE id = $1", SELECT_AIRLINE))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .or_core("airline")?;

        Ok(row.map(Airline::from))
    }

    async fn find_by_code(&self, code: &str) -> CoreResult<Option<Airline>> {
        let row = sqlx::query_as::<_, AirlineRow>(&format!("{} WHERE code = $1", SELECT_AIRLINE))
            .bind(code)
            .fetch_optional(&self.pool)
            .await
            .or_core("airline")?;

        Ok(row.map(Airline::from))
    }

    async fn list(&self, page: PageRequest, active_only: bool) -> CoreResult<(Vec<Airline>, i64)> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM airlines WHERE ($1 = FALSE OR is_active = TRUE)",
        )
        .bind(active_only)
        .fetch_one(&self.pool)
        .await
        .or_core("airline")?;

        let rows = sqlx::query_as::<_, AirlineRow>(&format!(
            "{} WHERE ($1 = FALSE OR is_active = TRUE) ORDER BY name ASC LIMIT $2 OFFSET $3",
            SELECT_AIRLINE
        ))
        .bind(active_only)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await
        .or_core("airline")?;

        Ok((rows.into_iter().map(Airline::from).collect(), total))
    }

    async fn list_active(&self) -> CoreResult<Vec<Airline>> {
        let rows = sqlx::query_as::<_, AirlineRow>(&format!(
            "{} WHERE is_active = TRUE ORDER BY name ASC",
            SELECT_AIRLINE
        ))
        .fetch_all(&self.pool)
        .await
        .or_core("airline")?;

        Ok(rows.into_iter().map(Airline::from).collect())
    }
}
