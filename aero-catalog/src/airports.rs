use aero_core::catalog::Airport;
use aero_core::repository::AirportRepository;
use aero_core::{CoreError, CoreResult, DataSource, SourceScope, Sources};
use aero_shared::validate::normalize_code;
use aero_shared::{Page, PageRequest};
use chrono::Utc;
use serde::Deserialize;
use tracing::{info, warn};

const CODE_TAKEN: &str = "airport code already exists";

#[derive(Debug, Clone, Deserialize)]
pub struct CreateAirport {
    pub code: String,
    pub city: String,
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateAirport {
    pub code: Option<String>,
    pub city: Option<String>,
    pub name: Option<String>,
}

fn validate_code(raw: &str) -> CoreResult<String> {
    let code = normalize_code(raw);
    if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(CoreError::ValidationError(
            "airport code must be 3 letters or digits".to_string(),
        ));
    }
    Ok(code)
}

fn required(field: &str, raw: &str) -> CoreResult<String> {
    let value = raw.trim();
    if value.is_empty() {
        return Err(CoreError::ValidationError(format!("{} is required", field)));
    }
    Ok(value.to_string())
}

pub struct AirportService {
    repos: Sources<dyn AirportRepository>,
}

impl AirportService {
    pub fn new(repos: Sources<dyn AirportRepository>) -> Self {
        Self { repos }
    }

    pub async fn create(&self, scope: SourceScope, input: CreateAirport) -> CoreResult<Airport> {
        let code = validate_code(&input.code)?;
        let city = required("city", &input.city)?;
        let name = required("name", &input.name)?;
        let primary = self.repos.get(scope.primary());

        if primary.find_by_code(&code).await?.is_some() {
            return Err(CoreError::ConflictError(CODE_TAKEN.to_string()));
        }

        let airport = Airport::new(code, city, name);
        primary.create(&airport).await?;
        info!(airport_id = %airport.id, code = %airport.code, source = %scope.primary(), "airport created");

        if let Some(replica) = scope.replica() {
            if let Err(err) = self.repos.get(replica).create(&airport).await {
                warn!(airport_id = %airport.id, %replica, error = %err, "failed to mirror airport create");
            }
        }

        Ok(airport)
    }

    pub async fn get(&self, source: DataSource, id: &str) -> CoreResult<Airport> {
        self.repos
            .get(source)
            .find_by_id(id)
            .await?
            .ok_or_else(|| CoreError::not_found("airport"))
    }

    pub async fn get_by_code(&self, source: DataSource, code: &str) -> CoreResult<Airport> {
        self.repos
            .get(source)
            .find_by_code(&normalize_code(code))
            .await?
            .ok_or_else(|| CoreError::not_found("airport"))
    }

    pub async fn update(&self, scope: SourceScope, id: &str, input: UpdateAirport) -> CoreResult<Airport> {
        let primary = self.repos.get(scope.primary());
        let mut airport = primary
            .find_by_id(id)
            .await?
            .ok_or_else(|| CoreError::not_found("airport"))?;

        if let Some(raw) = input.code.as_deref() {
            let code = validate_code(raw)?;
            if code != airport.code {
                if let Some(other) = primary.find_by_code(&code).await? {
                    if other.id != airport.id {
                        return Err(CoreError::ConflictError(CODE_TAKEN.to_string()));
                    }
                }
            }
            airport.code = code;
        }
        if let Some(raw) = input.city.as_deref() {
            airport.city = required("city", raw)?;
        }
        if let Some(raw) = input.name.as_deref() {
            airport.name = required("name", raw)?;
        }
        airport.updated_at = Utc::now();

        primary.update(&airport).await?;

        if let Some(replica) = scope.replica() {
            if let Err(err) = self.repos.get(replica).update(&airport).await {
                warn!(airport_id = %airport.id, %replica, error = %err, "failed to mirror airport update");
            }
        }

        Ok(airport)
    }

    pub async fn delete(&self, scope: SourceScope, id: &str) -> CoreResult<()> {
        if !self.repos.get(scope.primary()).delete(id).await? {
            return Err(CoreError::not_found("airport"));
        }
        info!(airport_id = %id, source = %scope.primary(), "airport deleted");

        if let Some(replica) = scope.replica() {
            if let Err(err) = self.repos.get(replica).delete(id).await {
                warn!(airport_id = %id, %replica, error = %err, "failed to mirror airport delete");
            }
        }
        Ok(())
    }

    pub async fn list(&self, source: DataSource, page: PageRequest) -> CoreResult<Page<Airport>> {
        let (airports, total) = self.repos.get(source).list(page).await?;
        Ok(Page::new(airports, page, total))
    }

    pub async fn list_all(&self, source: DataSource) -> CoreResult<Vec<Airport>> {
        self.repos.get(source).list_all().await
    }

    pub async fn search(&self, source: DataSource, query: &str) -> CoreResult<Vec<Airport>> {
        let query = query.trim();
        if query.is_empty() {
            return Err(CoreError::ValidationError("search query is required".to_string()));
        }
        self.repos.get(source).search(query).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aero_core::repository::MockAirportRepository;
    use mockall::predicate::eq;
    use std::sync::Arc;

    fn service(staging: MockAirportRepository) -> AirportService {
        AirportService::new(Sources::<dyn AirportRepository>::new(
            Arc::new(staging),
            Arc::new(MockAirportRepository::new()),
        ))
    }

    #[tokio::test]
    async fn test_lookup_by_code_is_case_insensitive() {
        let mut staging = MockAirportRepository::new();
        staging
            .expect_find_by_code()
            .with(eq("CGK"))
            .returning(|_| Ok(Some(Airport::new("CGK".into(), "Jakarta".into(), "Soekarno-Hatta".into()))));

        let airport = service(staging).get_by_code(DataSource::Staging, "cgk").await.unwrap();
        assert_eq!(airport.city, "Jakarta");
    }

    #[tokio::test]
    async fn test_empty_search_rejected() {
        let mut staging = MockAirportRepository::new();
        staging.expect_search().never();

        let err = service(staging).search(DataSource::Staging, "  ").await.unwrap_err();
        assert!(matches!(err, CoreError::ValidationError(_)));
    }

    #[tokio::test]
    async fn test_duplicate_code_conflicts() {
        let mut staging = MockAirportRepository::new();
        staging
            .expect_find_by_code()
            .returning(|_| Ok(Some(Airport::new("DPS".into(), "Denpasar".into(), "Ngurah Rai".into()))));

        let err = service(staging)
            .create(
                SourceScope::Only(DataSource::Staging),
                CreateAirport { code: "dps".into(), city: "Bali".into(), name: "Ngurah Rai".into() },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::ConflictError(_)));
    }

    #[tokio::test]
    async fn test_missing_airport_is_not_found() {
        let mut staging = MockAirportRepository::new();
        staging.expect_delete().returning(|_| Ok(false));

        let err = service(staging)
            .delete(SourceScope::Only(DataSource::Staging), "nope")
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::NotFoundError(_)));
    }
}
