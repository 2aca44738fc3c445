use aero_core::catalog::Airline;
use aero_core::repository::AirlineRepository;
use aero_core::{CoreError, CoreResult, DataSource, SourceScope, Sources};
use aero_shared::validate::normalize_code;
use aero_shared::{Page, PageRequest};
use chrono::Utc;
use serde::Deserialize;
use tracing::{info, warn};

const CODE_TAKEN: &str = "airline code already exists";

#[derive(Debug, Clone, Deserialize)]
pub struct CreateAirline {
    pub code: String,
    pub name: String,
    pub logo: Option<String>,
    pub is_active: Option<bool>,
}

/// Partial update; absent fields keep their value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateAirline {
    pub code: Option<String>,
    pub name: Option<String>,
    pub logo: Option<String>,
    pub is_active: Option<bool>,
}

fn validate_code(raw: &str) -> CoreResult<String> {
    let code = normalize_code(raw);
    if code.is_empty() || code.len() > 3 || !code.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(CoreError::ValidationError(
            "airline code must be 1-3 letters or digits".to_string(),
        ));
    }
    Ok(code)
}

fn validate_name(raw: &str) -> CoreResult<String> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(CoreError::ValidationError("airline name is required".to_string()));
    }
    Ok(name.to_string())
}

pub struct AirlineService {
    repos: Sources<dyn AirlineRepository>,
}

impl AirlineService {
    pub fn new(repos: Sources<dyn AirlineRepository>) -> Self {
        Self { repos }
    }

    pub async fn create(&self, scope: SourceScope, input: CreateAirline) -> CoreResult<Airline> {
        let code = validate_code(&input.code)?;
        let name = validate_name(&input.name)?;
        let primary = self.repos.get(scope.primary());

        if primary.find_by_code(&code).await?.is_some() {
            return Err(CoreError::ConflictError(CODE_TAKEN.to_string()));
        }

        let mut airline = Airline::new(code, name, input.logo);
        if let Some(active) = input.is_active {
            airline.is_active = active;
        }
        primary.create(&airline).await?;
        info!(airline_id = %airline.id, code = %airline.code, source = %scope.primary(), "airline created");

        if let Some(replica) = scope.replica() {
            if let Err(err) = self.repos.get(replica).create(&airline).await {
                warn!(airline_id = %airline.id, %replica, error = %err, "failed to mirror airline create");
            }
        }

        Ok(airline)
    }

    pub async fn get(&self, source: DataSource, id: &str) -> CoreResult<Airline> {
        self.repos
            .get(source)
            .find_by_id(id)
            .await?
            .ok_or_else(|| CoreError::not_found("airline"))
    }

    pub async fn update(&self, scope: SourceScope, id: &str, input: UpdateAirline) -> CoreResult<Airline> {
        let primary = self.repos.get(scope.primary());
        let mut airline = primary
            .find_by_id(id)
            .await?
            .ok_or_else(|| CoreError::not_found("airline"))?;

        if let Some(raw) = input.code.as_deref() {
            let code = validate_code(raw)?;
            if code != airline.code {
                if let Some(other) = primary.find_by_code(&code).await? {
                    if other.id != airline.id {
                        return Err(CoreError::ConflictError(CODE_TAKEN.to_string()));
                    }
                }
            }
            airline.code = code;
        }
        if let Some(raw) = input.name.as_deref() {
            airline.name = validate_name(raw)?;
        }
        if input.logo.is_some() {
            airline.logo = input.logo;
        }
        if let Some(active) = input.is_active {
            airline.is_active = active;
        }
        airline.updated_at = Utc::now();

        primary.update(&airline).await?;

        if let Some(replica) = scope.replica() {
            if let Err(err) = self.repos.get(replica).update(&airline).await {
                warn!(airline_id = %airline.id, %replica, error = %err, "failed to mirror airline update");
            }
        }

        Ok(airline)
    }

    pub async fn delete(&self, scope: SourceScope, id: &str) -> CoreResult<()> {
        if !self.repos.get(scope.primary()).delete(id).await? {
            return Err(CoreError::not_found("airline"));
        }
        info!(airline_id = %id, source = %scope.primary(), "airline deleted");

        if let Some(replica) = scope.replica() {
            if let Err(err) = self.repos.get(replica).delete(id).await {
                warn!(airline_id = %id, %replica, error = %err, "failed to mirror airline delete");
            }
        }
        Ok(())
    }

    pub async fn list(&self, source: DataSource, page: PageRequest, active_only: bool) -> CoreResult<Page<Airline>> {
        let (airlines, total) = self.repos.get(source).list(page, active_only).await?;
        Ok(Page::new(airlines, page, total))
    }

    pub async fn list_active(&self, source: DataSource) -> CoreResult<Vec<Airline>> {
        self.repos.get(source).list_active().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aero_core::repository::MockAirlineRepository;
    use mockall::predicate::eq;
    use std::sync::Arc;

    fn service(staging: MockAirlineRepository, production: MockAirlineRepository) -> AirlineService {
        AirlineService::new(Sources::<dyn AirlineRepository>::new(Arc::new(staging), Arc::new(production)))
    }

    fn zeta() -> CreateAirline {
        CreateAirline {
            code: "zz".into(),
            name: "Zeta Air".into(),
            logo: None,
            is_active: None,
        }
    }

    #[tokio::test]
    async fn test_create_mirrors_to_production() {
        let mut staging = MockAirlineRepository::new();
        staging.expect_find_by_code().with(eq("ZZ")).returning(|_| Ok(None));
        staging.expect_create().times(1).returning(|_| Ok(()));
        let mut production = MockAirlineRepository::new();
        production.expect_create().times(1).returning(|_| Ok(()));

        let airline = service(staging, production)
            .create(SourceScope::Mirrored, zeta())
            .await
            .unwrap();
        assert_eq!(airline.code, "ZZ");
        assert!(airline.is_active);
        assert!(!airline.id.is_empty());
    }

    #[tokio::test]
    async fn test_create_duplicate_code_conflicts() {
        let mut staging = MockAirlineRepository::new();
        staging
            .expect_find_by_code()
            .returning(|_| Ok(Some(Airline::new("ZZ".into(), "Existing".into(), None))));
        staging.expect_create().never();

        let err = service(staging, MockAirlineRepository::new())
            .create(SourceScope::Mirrored, zeta())
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::ConflictError(ref m) if m.contains("code already exists")));
    }

    #[tokio::test]
    async fn test_production_mirror_failure_is_not_fatal() {
        let mut staging = MockAirlineRepository::new();
        staging.expect_find_by_code().returning(|_| Ok(None));
        staging.expect_create().returning(|_| Ok(()));
        let mut production = MockAirlineRepository::new();
        production
            .expect_create()
            .returning(|_| Err(CoreError::InternalError("connection refused".into())));

        assert!(service(staging, production)
            .create(SourceScope::Mirrored, zeta())
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_env_scoped_create_touches_one_source() {
        let mut production = MockAirlineRepository::new();
        production.expect_find_by_code().returning(|_| Ok(None));
        production.expect_create().times(1).returning(|_| Ok(()));
        let mut staging = MockAirlineRepository::new();
        staging.expect_create().never();

        service(staging, production)
            .create(SourceScope::Only(DataSource::Production), zeta())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_update_to_code_of_other_airline_conflicts() {
        let current = Airline::new("AA".into(), "Alpha".into(), None);
        let current_id = current.id.clone();
        let mut staging = MockAirlineRepository::new();
        staging
            .expect_find_by_id()
            .with(eq(current_id.clone()))
            .returning(move |_| Ok(Some(current.clone())));
        staging
            .expect_find_by_code()
            .with(eq("BB"))
            .returning(|_| Ok(Some(Airline::new("BB".into(), "Beta".into(), None))));
        staging.expect_update().never();

        let err = service(staging, MockAirlineRepository::new())
            .update(
                SourceScope::Mirrored,
                &current_id,
                UpdateAirline { code: Some("bb".into()), ..Default::default() },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::ConflictError(_)));
    }

    #[tokio::test]
    async fn test_update_keeping_own_code_is_allowed() {
        let current = Airline::new("AA".into(), "Alpha".into(), None);
        let current_id = current.id.clone();
        let mut staging = MockAirlineRepository::new();
        staging
            .expect_find_by_id()
            .returning(move |_| Ok(Some(current.clone())));
        staging.expect_find_by_code().never();
        staging.expect_update().times(1).returning(|_| Ok(()));

        let updated = service(staging, MockAirlineRepository::new())
            .update(
                SourceScope::Only(DataSource::Staging),
                &current_id,
                UpdateAirline { code: Some("aa".into()), name: Some("Alpha Prime".into()), ..Default::default() },
            )
            .await
            .unwrap();
        assert_eq!(updated.name, "Alpha Prime");
    }

    #[tokio::test]
    async fn test_invalid_code_rejected() {
        let err = service(MockAirlineRepository::new(), MockAirlineRepository::new())
            .create(
                SourceScope::Mirrored,
                CreateAirline { code: "TOOLONG".into(), ..zeta() },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::ValidationError(_)));
    }
}
