use aero_core::{CoreError, CoreResult};

/// Maps driver errors onto the domain error type.
pub(crate) trait DbResultExt<T> {
    /// `entity` names what was being written, e.g. "airline code".
    fn or_core(self, entity: &str) -> CoreResult<T>;
}

impl<T> DbResultExt<T> for Result<T, sqlx::Error> {
    fn or_core(self, entity: &str) -> CoreResult<T> {
        self.map_err(|err| match &err {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                CoreError::ConflictError(format!("{} already exists", entity))
            }
            sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
                CoreError::ValidationError(format!("{} conflicts with related records", entity))
            }
            _ => CoreError::InternalError(format!("database error: {}", err)),
        })
    }
}
