use aero_core::DataSource;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::whitelist::WhitelistService;

/// What a single request is allowed to read from production.
///
/// Resolved once per request and passed by value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccessPolicy {
    pub email: Option<String>,
    pub enabled_airlines: HashSet<String>,
}

impl AccessPolicy {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn new(email: impl Into<String>, enabled_airlines: impl IntoIterator<Item = String>) -> Self {
        Self {
            email: Some(email.into()),
            enabled_airlines: enabled_airlines.into_iter().collect(),
        }
    }

    /// Source for reads that are not tied to one airline.
    pub fn source(&self) -> DataSource {
        if self.email.is_some() && !self.enabled_airlines.is_empty() {
            DataSource::Production
        } else {
            DataSource::Staging
        }
    }

    pub fn source_for_airline(&self, airline_id: &str) -> DataSource {
        if self.enabled_airlines.contains(airline_id) {
            DataSource::Production
        } else {
            DataSource::Staging
        }
    }
}

pub struct SourceResolver {
    whitelist: Arc<WhitelistService>,
}

impl SourceResolver {
    pub fn new(whitelist: Arc<WhitelistService>) -> Self {
        Self { whitelist }
    }

    /// Never fails: a whitelist lookup error degrades to the staging policy.
    pub async fn policy_for(&self, email: Option<&str>) -> AccessPolicy {
        let Some(email) = email.map(str::trim).filter(|e| !e.is_empty()) else {
            return AccessPolicy::anonymous();
        };

        match self.whitelist.enabled_airlines(email).await {
            Ok(enabled) => {
                debug!(%email, enabled = enabled.len(), "resolved access policy");
                AccessPolicy::new(email, enabled)
            }
            Err(err) => {
                warn!(%email, error = %err, "whitelist lookup failed, serving staging data");
                AccessPolicy::new(email, HashSet::new())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aero_core::repository::MockWhitelistRepository;
    use aero_core::whitelist::WhitelistedUser;
    use aero_core::CoreError;

    fn resolver(repo: MockWhitelistRepository) -> SourceResolver {
        SourceResolver::new(Arc::new(WhitelistService::new(Arc::new(repo))))
    }

    #[tokio::test]
    async fn test_no_email_is_staging() {
        let mut repo = MockWhitelistRepository::new();
        repo.expect_find_by_email().never();

        let policy = resolver(repo).policy_for(None).await;
        assert_eq!(policy.source(), DataSource::Staging);
        assert_eq!(policy.source_for_airline("ga"), DataSource::Staging);
    }

    #[tokio::test]
    async fn test_whitelisted_email_reads_production() {
        let mut repo = MockWhitelistRepository::new();
        repo.expect_find_by_email().returning(|email| {
            Ok(Some(WhitelistedUser::new(email.to_string(), "A".into(), vec!["ga".into()])))
        });

        let policy = resolver(repo).policy_for(Some("a@b.com")).await;
        assert_eq!(policy.source(), DataSource::Production);
        assert_eq!(policy.source_for_airline("ga"), DataSource::Production);
        assert_eq!(policy.source_for_airline("jt"), DataSource::Staging);
    }

    #[tokio::test]
    async fn test_empty_airline_set_is_staging() {
        let mut repo = MockWhitelistRepository::new();
        repo.expect_find_by_email().returning(|email| {
            Ok(Some(WhitelistedUser::new(email.to_string(), "A".into(), vec![])))
        });

        let policy = resolver(repo).policy_for(Some("a@b.com")).await;
        assert_eq!(policy.source(), DataSource::Staging);
    }

    #[tokio::test]
    async fn test_lookup_failure_falls_back_to_staging() {
        let mut repo = MockWhitelistRepository::new();
        repo.expect_find_by_email()
            .returning(|_| Err(CoreError::InternalError("pool timed out".into())));

        let policy = resolver(repo).policy_for(Some("a@b.com")).await;
        assert_eq!(policy.source(), DataSource::Staging);
        assert!(policy.enabled_airlines.is_empty());
    }

    #[test]
    fn test_enabled_set_without_email_is_staging() {
        let policy = AccessPolicy {
            email: None,
            enabled_airlines: ["ga".to_string()].into_iter().collect(),
        };
        assert_eq!(policy.source(), DataSource::Staging);
    }
}
