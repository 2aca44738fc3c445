use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::CoreError;

/// Which of the two parallel catalog databases a read or write targets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSource {
    #[default]
    Staging,
    Production,
}

impl DataSource {
    pub const ALL: [DataSource; 2] = [DataSource::Staging, DataSource::Production];

    pub fn as_str(&self) -> &'static str {
        match self {
            DataSource::Staging => "staging",
            DataSource::Production => "production",
        }
    }
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DataSource {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "staging" => Ok(DataSource::Staging),
            "production" => Ok(DataSource::Production),
            other => Err(CoreError::ValidationError(format!(
                "env must be 'staging' or 'production', got '{}'",
                other
            ))),
        }
    }
}

/// Where an admin catalog mutation lands.
///
/// `Mirrored` writes staging first (its failure is the caller's failure) and
/// then replays the change against production on a best-effort basis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceScope {
    Mirrored,
    Only(DataSource),
}

impl SourceScope {
    /// The source whose result is authoritative for the caller.
    pub fn primary(&self) -> DataSource {
        match self {
            SourceScope::Mirrored => DataSource::Staging,
            SourceScope::Only(source) => *source,
        }
    }

    /// The source that receives a best-effort replay, if any.
    pub fn replica(&self) -> Option<DataSource> {
        match self {
            SourceScope::Mirrored => Some(DataSource::Production),
            SourceScope::Only(_) => None,
        }
    }
}

impl From<Option<DataSource>> for SourceScope {
    fn from(env: Option<DataSource>) -> Self {
        env.map_or(SourceScope::Mirrored, SourceScope::Only)
    }
}

/// One handle per data source for the same repository interface.
pub struct Sources<R: ?Sized> {
    staging: Arc<R>,
    production: Arc<R>,
}

impl<R: ?Sized> Clone for Sources<R> {
    fn clone(&self) -> Self {
        Self {
            staging: Arc::clone(&self.staging),
            production: Arc::clone(&self.production),
        }
    }
}

impl<R: ?Sized> Sources<R> {
    pub fn new(staging: Arc<R>, production: Arc<R>) -> Self {
        Self { staging, production }
    }

    pub fn get(&self, source: DataSource) -> &Arc<R> {
        match source {
            DataSource::Staging => &self.staging,
            DataSource::Production => &self.production,
        }
    }

    pub fn staging(&self) -> &Arc<R> {
        &self.staging
    }

    pub fn production(&self) -> &Arc<R> {
        &self.production
    }
}
