use domain::UnknownStatus;
use thiserror::Error;

/// Errors that can occur when interacting with the rental store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A database error occurred.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A database migration error occurred.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A stored row carries a status outside the known set.
    #[error("Corrupt row: {0}")]
    CorruptStatus(#[from] UnknownStatus),

    /// The store could not be reached.
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
