use std::fmt::Display;

use sea_orm::{DbErr, SqlErr};

/// Failures surfaced by the catalog services.
///
/// Missing rows and duplicates are ordinary outcomes and get their own
/// variants; everything the store reports beyond that is `Internal`.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("{entity} {key} not found")]
    NotFound { entity: &'static str, key: String },
    /// `id` is the row that already holds `spotify_id`.
    #[error("artist with spotify ID {spotify_id} already exists")]
    AlreadyExists { id: i64, spotify_id: String },
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("failed to {operation} ({key}): {source}")]
    Internal {
        operation: &'static str,
        key: String,
        #[source]
        source: DbErr,
    },
}

pub type CatalogResult<T> = Result<T, CatalogError>;

impl CatalogError {
    pub fn not_found(entity: &'static str, key: impl Display) -> Self {
        Self::NotFound {
            entity,
            key: key.to_string(),
        }
    }

    pub fn internal(operation: &'static str, key: impl Display, source: DbErr) -> Self {
        Self::Internal {
            operation,
            key: key.to_string(),
            source,
        }
    }
}

/// Wraps storage errors with the operation and the key it was working on.
pub trait DbResultExt<T> {
    fn or_internal(self, operation: &'static str, key: impl Display) -> CatalogResult<T>;
}

impl<T> DbResultExt<T> for Result<T, DbErr> {
    fn or_internal(self, operation: &'static str, key: impl Display) -> CatalogResult<T> {
        self.map_err(|e| CatalogError::internal(operation, key, e))
    }
}

pub fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}
