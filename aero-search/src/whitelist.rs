use aero_core::repository::WhitelistRepository;
use aero_core::whitelist::{normalize_airline_ids, toggle_airline, WhitelistedUser};
use aero_core::{CoreError, CoreResult};
use aero_shared::validate::is_valid_email;
use aero_shared::{Page, PageRequest};
use chrono::Utc;
use serde::Deserialize;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::info;

pub const DEFAULT_PAGE_SIZE: u32 = 20;

// Entries are stored lowercased.
fn email_key(email: &str) -> String {
    email.trim().to_lowercase()
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateWhitelistEntry {
    pub email: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub enabled_airlines: Vec<String>,
}

/// Partial update. A present `enabled_airlines` replaces the whole set.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateWhitelistEntry {
    pub name: Option<String>,
    pub enabled_airlines: Option<Vec<String>>,
}

/// Admin-managed mapping from email to the airlines served from production.
pub struct WhitelistService {
    repo: Arc<dyn WhitelistRepository>,
}

impl WhitelistService {
    pub fn new(repo: Arc<dyn WhitelistRepository>) -> Self {
        Self { repo }
    }

    pub async fn create(&self, input: CreateWhitelistEntry) -> CoreResult<WhitelistedUser> {
        let email = email_key(&input.email);
        if !is_valid_email(&email) {
            return Err(CoreError::ValidationError("a valid email is required".to_string()));
        }
        if self.repo.find_by_email(&email).await?.is_some() {
            return Err(CoreError::ConflictError("email already whitelisted".to_string()));
        }

        let entry = WhitelistedUser::new(email, input.name.trim().to_string(), input.enabled_airlines);
        self.repo.create(&entry).await?;
        info!(whitelist_id = %entry.id, airlines = entry.enabled_airlines.len(), "email whitelisted");
        Ok(entry)
    }

    pub async fn get(&self, id: &str) -> CoreResult<WhitelistedUser> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| CoreError::not_found("whitelist entry"))
    }

    pub async fn get_by_email(&self, email: &str) -> CoreResult<WhitelistedUser> {
        self.repo
            .find_by_email(&email_key(email))
            .await?
            .ok_or_else(|| CoreError::not_found("whitelist entry"))
    }

    pub async fn list(&self, page: PageRequest) -> CoreResult<Page<WhitelistedUser>> {
        let (entries, total) = self.repo.list(page).await?;
        Ok(Page::new(entries, page, total))
    }

    pub async fn update(&self, id: &str, input: UpdateWhitelistEntry) -> CoreResult<WhitelistedUser> {
        let mut entry = self.get(id).await?;
        if let Some(name) = input.name {
            entry.name = name.trim().to_string();
        }
        if let Some(airlines) = input.enabled_airlines {
            entry.enabled_airlines = normalize_airline_ids(airlines);
        }
        entry.updated_at = Utc::now();
        self.repo.update(&entry).await?;
        Ok(entry)
    }

    pub async fn delete(&self, id: &str) -> CoreResult<()> {
        if !self.repo.delete(id).await? {
            return Err(CoreError::not_found("whitelist entry"));
        }
        info!(whitelist_id = %id, "whitelist entry removed");
        Ok(())
    }

    /// Grants the airline if absent, revokes it if present.
    pub async fn toggle_airline_access(&self, id: &str, airline_id: &str) -> CoreResult<WhitelistedUser> {
        let airline_id = airline_id.trim();
        if airline_id.is_empty() {
            return Err(CoreError::ValidationError("airline_id is required".to_string()));
        }
        let mut entry = self.get(id).await?;
        entry.enabled_airlines = toggle_airline(&entry.enabled_airlines, airline_id);
        entry.updated_at = Utc::now();
        self.repo.update(&entry).await?;
        info!(
            whitelist_id = %entry.id,
            %airline_id,
            enabled = entry.has_airline(airline_id),
            "airline access toggled"
        );
        Ok(entry)
    }

    pub async fn is_whitelisted(&self, email: &str) -> CoreResult<bool> {
        Ok(self.repo.find_by_email(&email_key(email)).await?.is_some())
    }

    /// Empty when the email has no entry.
    pub async fn enabled_airlines(&self, email: &str) -> CoreResult<HashSet<String>> {
        Ok(self
            .repo
            .find_by_email(&email_key(email))
            .await?
            .map(|entry| entry.enabled_airlines.into_iter().collect())
            .unwrap_or_default())
    }

    pub async fn has_airline_access(&self, email: &str, airline_id: &str) -> CoreResult<bool> {
        Ok(self.enabled_airlines(email).await?.contains(airline_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aero_core::repository::MockWhitelistRepository;
    use mockall::predicate::eq;
    use std::sync::Mutex;

    fn entry(email: &str, airlines: &[&str]) -> WhitelistedUser {
        WhitelistedUser::new(
            email.to_string(),
            "Tester".to_string(),
            airlines.iter().map(|a| a.to_string()).collect(),
        )
    }

    #[tokio::test]
    async fn test_create_rejects_existing_email() {
        let mut repo = MockWhitelistRepository::new();
        repo.expect_find_by_email()
            .with(eq("a@b.com"))
            .returning(|email| Ok(Some(entry(email, &["ga"]))));
        repo.expect_create().never();

        let err = WhitelistService::new(Arc::new(repo))
            .create(CreateWhitelistEntry {
                email: "A@B.com".into(),
                name: "Ana".into(),
                enabled_airlines: vec![],
            })
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::ConflictError(_)));
    }

    #[tokio::test]
    async fn test_create_rejects_bad_email() {
        let err = WhitelistService::new(Arc::new(MockWhitelistRepository::new()))
            .create(CreateWhitelistEntry {
                email: "not-an-email".into(),
                name: String::new(),
                enabled_airlines: vec![],
            })
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::ValidationError(_)));
    }

    #[tokio::test]
    async fn test_toggle_twice_restores_set() {
        let stored = Arc::new(Mutex::new(entry("a@b.com", &["ga", "jt"])));
        let id = stored.lock().unwrap().id.clone();

        let mut repo = MockWhitelistRepository::new();
        let reader = Arc::clone(&stored);
        repo.expect_find_by_id()
            .returning(move |_| Ok(Some(reader.lock().unwrap().clone())));
        let writer = Arc::clone(&stored);
        repo.expect_update().times(2).returning(move |e| {
            *writer.lock().unwrap() = e.clone();
            Ok(())
        });
        let service = WhitelistService::new(Arc::new(repo));

        let once = service.toggle_airline_access(&id, "jt").await.unwrap();
        assert_eq!(once.enabled_airlines, vec!["ga".to_string()]);

        let twice = service.toggle_airline_access(&id, "jt").await.unwrap();
        let mut airlines = twice.enabled_airlines.clone();
        airlines.sort();
        assert_eq!(airlines, vec!["ga".to_string(), "jt".to_string()]);
    }

    #[tokio::test]
    async fn test_unknown_email_has_no_airlines() {
        let mut repo = MockWhitelistRepository::new();
        repo.expect_find_by_email().returning(|_| Ok(None));
        let service = WhitelistService::new(Arc::new(repo));

        assert!(service.enabled_airlines("ghost@b.com").await.unwrap().is_empty());
        assert!(!service.is_whitelisted("ghost@b.com").await.unwrap());
        assert!(!service.has_airline_access("ghost@b.com", "ga").await.unwrap());
    }

    #[tokio::test]
    async fn test_lookup_ignores_email_case() {
        let mut repo = MockWhitelistRepository::new();
        repo.expect_find_by_email()
            .with(eq("a@b.com"))
            .returning(|email| Ok(Some(entry(email, &["ga"]))));
        let service = WhitelistService::new(Arc::new(repo));

        let found = service.get_by_email(" A@B.com ").await.unwrap();
        assert_eq!(found.email, "a@b.com");
        assert!(service.has_airline_access("A@b.COM", "ga").await.unwrap());
    }

    #[tokio::test]
    async fn test_update_replaces_airline_set() {
        let stored = entry("a@b.com", &["ga"]);
        let id = stored.id.clone();
        let mut repo = MockWhitelistRepository::new();
        repo.expect_find_by_id()
            .returning(move |_| Ok(Some(stored.clone())));
        repo.expect_update().times(1).returning(|_| Ok(()));

        let updated = WhitelistService::new(Arc::new(repo))
            .update(
                &id,
                UpdateWhitelistEntry {
                    name: None,
                    enabled_airlines: Some(vec!["qz".into(), "qz".into(), "".into()]),
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.enabled_airlines, vec!["qz".to_string()]);
        assert_eq!(updated.name, "Tester");
    }
}
