use aero_core::repository::WhitelistRepository;
use aero_core::whitelist::{join_airline_ids, split_airline_ids, WhitelistedUser};
use aero_core::CoreResult;
use aero_shared::PageRequest;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::error::DbResultExt;

pub struct StoreWhitelistRepository {
    pool: PgPool,
}

impl StoreWhitelistRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct WhitelistRow {
    id: String,
    email: String,
    name: String,
    enabled_airlines: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<WhitelistRow> for WhitelistedUser {
    fn from(row: WhitelistRow) -> Self {
        WhitelistedUser {
            id: row.id,
            email: row.email,
            name: row.name,
            enabled_airlines: split_airline_ids(&row.enabled_airlines),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

const SELECT_ENTRY: &str =
    "SELECT id, email, name, enabled_airlines, created_at, updated_at FROM whitelisted_users";

#[async_trait]
impl WhitelistRepository for StoreWhitelistRepository {
    async fn create(&self, entry: &WhitelistedUser) -> CoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO whitelisted_users (id, email, name, enabled_airlines, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(&entry.id)
        .bind(&entry.email)
        .bind(&entry.name)
        .bind(join_airline_ids(&entry.enabled_airlines))
        .bind(entry.created_at)
        .bind(entry.updated_at)
        .execute(&self.pool)
        .await
        .or_core("whitelisted email")?;

        Ok(())
    }

    async fn update(&self, entry: &WhitelistedUser) -> CoreResult<()> {
        sqlx::query(
            "UPDATE whitelisted_users SET name = $2, enabled_airlines = $3, updated_at = $4 WHERE id = $1",
        )
        .bind(&entry.id)
        .bind(&entry.name)
        .bind(join_airline_ids(&entry.enabled_airlines))
        .bind(entry.updated_at)
        .execute(&self.pool)
        .await
        .or_core("whitelisted email")?;

        Ok(())
    }

    async fn delete(&self, id: &str) -> CoreResult<bool> {
        let result = sqlx::query("DELETE FROM whitelisted_users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .or_core("whitelist entry")?;

        Ok(result.rows_affected() > 0)
    }

    async fn find_by_id(&self, id: &str) -> CoreResult<Option<WhitelistedUser>> {
        let row = sqlx::query_as::<_, WhitelistRow>(&format!("{} WHERE id = $1", SELECT_ENTRY))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .or_core("whitelist entry")?;

        Ok(row.map(WhitelistedUser::from))
    }

    async fn find_by_email(&self, email: &str) -> CoreResult<Option<WhitelistedUser>> {
        let row = sqlx::query_as::<_, WhitelistRow>(&format!(
            "{} WHERE LOWER(email) = LOWER($1)",
            SELECT_ENTRY
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .or_core("whitelist entry")?;

        Ok(row.map(WhitelistedUser::from))
    }

    async fn list(&self, page: PageRequest) -> CoreResult<(Vec<WhitelistedUser>, i64)> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM whitelisted_users")
            .fetch_one(&self.pool)
            .await
            .or_core("whitelist entry")?;

        let rows = sqlx::query_as::<_, WhitelistRow>(&format!(
            "{} ORDER BY created_at DESC LIMIT $1 OFFSET $2",
            SELECT_ENTRY
        ))
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await
        .or_core("whitelist entry")?;

        Ok((rows.into_iter().map(WhitelistedUser::from).collect(), total))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_column_maps_to_empty_list() {
        let now = Utc::now();
        let row = WhitelistRow {
            id: "w-1".into(),
            email: "a@b.com".into(),
            name: "A".into(),
            enabled_airlines: String::new(),
            created_at: now,
            updated_at: now,
        };
        let entry = WhitelistedUser::from(row);
        assert!(entry.enabled_airlines.is_empty());
    }
}
