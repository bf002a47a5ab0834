//! Persistence for users, notification categories and notifications.
//!
//! # Backend Architecture
//!
//! - `PostgresStore`: Relational storage with transactions and unique constraints (default)
//! - `MemoryStore`: Mutex-guarded in-process tables, lost on restart
//!
//! Use `create_store()` to create the appropriate backend based on configuration.

pub mod backend;
pub mod memory_backend;
pub mod postgres_backend;
pub mod uniqueness;

use std::sync::Arc;

use crate::config::StoreConfig;
use crate::postgres::PostgresPool;

pub use backend::{CategoryResolution, NotificationStore, StoreError, StoreResult};
pub use memory_backend::MemoryStore;
pub use postgres_backend::PostgresStore;
pub use uniqueness::{is_unique, UniqueField};

/// Create a store backend based on configuration.
///
/// Returns the appropriate backend implementation based on the `backend` setting:
/// - `"postgres"` (default): Returns a `PostgresStore` if a PostgreSQL pool is provided
/// - `"memory"`: Returns a `MemoryStore`
///
/// # Example
///
/// ```rust,ignore
/// let store = create_store(&settings.store, Some(pg_pool.clone()));
/// ```
pub fn create_store(
    settings: &StoreConfig,
    postgres_pool: Option<&PostgresPool>,
) -> Arc<dyn NotificationStore> {
    match settings.backend.as_str() {
        "memory" => {
            tracing::info!(backend = "memory", "Creating memory store");
            Arc::new(MemoryStore::new())
        }
        other => {
            if other != "postgres" {
                tracing::warn!(backend = %other, "Unknown store backend, using postgres");
            }
            if let Some(pool) = postgres_pool {
                tracing::info!(
                    backend = "postgres",
                    url = %pool.database_url_masked(),
                    "Creating PostgreSQL store"
                );
                Arc::new(PostgresStore::new(pool.pool().clone()))
            } else {
                tracing::warn!(
                    "PostgreSQL store requested but no pool provided, falling back to memory"
                );
                Arc::new(MemoryStore::new())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_backend_selected() {
        let config = StoreConfig {
            backend: "memory".to_string(),
        };
        assert_eq!(create_store(&config, None).backend_type(), "memory");
    }

    #[test]
    fn test_postgres_without_pool_falls_back() {
        let config = StoreConfig::default();
        assert_eq!(create_store(&config, None).backend_type(), "memory");
    }
}
