use aero_core::{DataSource, SourceScope};
use aero_shared::PageRequest;
use serde::Deserialize;

use crate::error::AppError;

fn parse_env(raw: Option<&str>) -> Result<Option<DataSource>, AppError> {
    match raw.map(str::trim).filter(|env| !env.is_empty()) {
        Some(env) => Ok(Some(env.parse()?)),
        None => Ok(None),
    }
}

/// `?env=staging|production` on catalog endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct EnvQuery {
    pub env: Option<String>,
}

impl EnvQuery {
    /// Source for a read; staging unless asked otherwise.
    pub fn read_source(&self) -> Result<DataSource, AppError> {
        Ok(parse_env(self.env.as_deref())?.unwrap_or_default())
    }

    /// Scope for a write; mirrored to both sources unless one is named.
    pub fn write_scope(&self) -> Result<SourceScope, AppError> {
        Ok(SourceScope::from(parse_env(self.env.as_deref())?))
    }
}

/// Paginated catalog listing.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub env: Option<String>,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

impl ListQuery {
    pub fn read_source(&self) -> Result<DataSource, AppError> {
        Ok(parse_env(self.env.as_deref())?.unwrap_or_default())
    }

    pub fn page(&self, default_size: u32) -> PageRequest {
        PageRequest::resolve(self.page, self.page_size, default_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_env_reads_staging_and_writes_both() {
        let query = EnvQuery::default();
        assert_eq!(query.read_source().unwrap(), DataSource::Staging);
        assert_eq!(query.write_scope().unwrap(), SourceScope::Mirrored);

        let blank = EnvQuery { env: Some(" ".into()) };
        assert_eq!(blank.write_scope().unwrap(), SourceScope::Mirrored);
    }

    #[test]
    fn test_named_env() {
        let query = EnvQuery { env: Some("production".into()) };
        assert_eq!(query.read_source().unwrap(), DataSource::Production);
        assert_eq!(query.write_scope().unwrap(), SourceScope::Only(DataSource::Production));
        assert!(EnvQuery { env: Some("qa".into()) }.read_source().is_err());
    }
}
