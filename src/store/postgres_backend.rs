//! PostgreSQL-based notification store.
//!
//! Every write runs inside a transaction: the uniqueness check, the
//! category find-or-create and the write itself commit together or not
//! at all. The table-level UNIQUE constraints remain the final word; a
//! violation (SQLSTATE 23505) raced past the check maps to the same
//! duplicate error.
//!
//! Table structure (see `migrations/`):
//! - `app_user` - API users with Argon2 password hashes
//! - `notification_category` - Categories, unique by name
//! - `notification` - Notifications, unique by message, cascading on category delete

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};

use crate::domain::{NewNotification, Notification, NotificationCategory, NotificationPatch, PageRequest, User};

use super::backend::{CategoryResolution, NotificationStore, StoreError, StoreResult};
use super::uniqueness::{is_unique, UniqueField};

const NOTIFICATION_SELECT: &str = r#"
    SELECT n.id, n.message, n.ttl, n.creation_date, n.displayed_times, n.displayed_once,
           c.id AS category_id, c.name AS category_name
    FROM notification n
    JOIN notification_category c ON c.id = n.notification_category_id
"#;

#[derive(Debug, sqlx::FromRow)]
struct NotificationRecord {
    id: i64,
    message: String,
    ttl: i32,
    creation_date: DateTime<Utc>,
    displayed_times: i32,
    displayed_once: bool,
    category_id: i64,
    category_name: String,
}

impl From<NotificationRecord> for Notification {
    fn from(record: NotificationRecord) -> Self {
        Notification {
            id: record.id,
            message: record.message,
            ttl: record.ttl,
            creation_date: record.creation_date,
            category: NotificationCategory {
                id: record.category_id,
                name: record.category_name,
            },
            displayed_times: record.displayed_times,
            displayed_once: record.displayed_once,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct UserRecord {
    id: i64,
    name: String,
    password_hash: String,
    creation_date: DateTime<Utc>,
}

impl From<UserRecord> for User {
    fn from(record: UserRecord) -> Self {
        User {
            id: record.id,
            name: record.name,
            password_hash: record.password_hash,
            creation_date: record.creation_date,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct CategoryRecord {
    id: i64,
    name: String,
}

impl From<CategoryRecord> for NotificationCategory {
    fn from(record: CategoryRecord) -> Self {
        NotificationCategory {
            id: record.id,
            name: record.name,
        }
    }
}

/// Whether `err` is a unique constraint violation reported by the database.
fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .map(|db| db.is_unique_violation())
        .unwrap_or(false)
}

/// Map a write failure, turning unique violations into `Duplicate`.
fn map_write_error(err: sqlx::Error, field: UniqueField, value: &str) -> StoreError {
    if is_unique_violation(&err) {
        StoreError::Duplicate {
            field,
            value: value.to_string(),
        }
    } else {
        StoreError::Database(err)
    }
}

fn to_i64(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

/// Id of the category currently named `name`.
async fn category_holding(conn: &mut PgConnection, name: &str) -> Result<Option<i64>, sqlx::Error> {
    sqlx::query_scalar("SELECT id FROM notification_category WHERE name = $1")
        .bind(name)
        .fetch_optional(conn)
        .await
}

/// Id of the notification currently carrying `message`.
async fn notification_holding(
    conn: &mut PgConnection,
    message: &str,
) -> Result<Option<i64>, sqlx::Error> {
    sqlx::query_scalar("SELECT id FROM notification WHERE message = $1")
        .bind(message)
        .fetch_optional(conn)
        .await
}

/// Find the category by name, creating it when absent.
async fn resolve_category(conn: &mut PgConnection, name: &str) -> Result<CategoryResolution, sqlx::Error> {
    let inserted: Option<CategoryRecord> = sqlx::query_as(
        r#"
        INSERT INTO notification_category (name)
        VALUES ($1)
        ON CONFLICT (name) DO NOTHING
        RETURNING id, name
        "#,
    )
    .bind(name)
    .fetch_optional(&mut *conn)
    .await?;

    if let Some(record) = inserted {
        return Ok(CategoryResolution::Created(record.into()));
    }

    let existing: CategoryRecord =
        sqlx::query_as("SELECT id, name FROM notification_category WHERE name = $1")
            .bind(name)
            .fetch_one(&mut *conn)
            .await?;

    Ok(CategoryResolution::Found(existing.into()))
}

async fn fetch_notification(conn: &mut PgConnection, id: i64) -> Result<Option<Notification>, sqlx::Error> {
    let record: Option<NotificationRecord> =
        sqlx::query_as(&format!("{} WHERE n.id = $1", NOTIFICATION_SELECT))
            .bind(id)
            .fetch_optional(conn)
            .await?;

    Ok(record.map(Notification::from))
}

/// PostgreSQL store backend.
pub struct PostgresStore {
    /// PostgreSQL connection pool
    pool: PgPool,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NotificationStore for PostgresStore {
    fn backend_type(&self) -> &'static str {
        "postgres"
    }

    async fn create_user(&self, name: &str, password_hash: &str) -> StoreResult<User> {
        let mut tx = self.pool.begin().await?;

        let holder: Option<i64> = sqlx::query_scalar("SELECT id FROM app_user WHERE name = $1")
            .bind(name)
            .fetch_optional(&mut *tx)
            .await?;
        if !is_unique(holder, None) {
            return Err(StoreError::Duplicate {
                field: UniqueField::UserName,
                value: name.to_string(),
            });
        }

        let record: UserRecord = sqlx::query_as(
            r#"
            INSERT INTO app_user (name, password_hash)
            VALUES ($1, $2)
            RETURNING id, name, password_hash, creation_date
            "#,
        )
        .bind(name)
        .bind(password_hash)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_write_error(e, UniqueField::UserName, name))?;

        tx.commit().await?;

        tracing::debug!(user_id = record.id, name = %record.name, "User stored in PostgreSQL");
        Ok(record.into())
    }

    async fn get_user(&self, id: i64) -> StoreResult<User> {
        let record: Option<UserRecord> = sqlx::query_as(
            "SELECT id, name, password_hash, creation_date FROM app_user WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        record
            .map(User::from)
            .ok_or(StoreError::NotFound { resource: "User", id })
    }

    async fn find_user_by_name(&self, name: &str) -> StoreResult<Option<User>> {
        let record: Option<UserRecord> = sqlx::query_as(
            "SELECT id, name, password_hash, creation_date FROM app_user WHERE name = $1",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record.map(User::from))
    }

    async fn list_users(&self, page: PageRequest) -> StoreResult<(Vec<User>, u64)> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM app_user")
            .fetch_one(&self.pool)
            .await?;

        let records: Vec<UserRecord> = sqlx::query_as(
            r#"
            SELECT id, name, password_hash, creation_date
            FROM app_user
            ORDER BY id
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(to_i64(page.limit()))
        .bind(to_i64(page.offset()))
        .fetch_all(&self.pool)
        .await?;

        Ok((records.into_iter().map(User::from).collect(), total.max(0) as u64))
    }

    async fn create_category(&self, name: &str) -> StoreResult<NotificationCategory> {
        let mut tx = self.pool.begin().await?;

        if !is_unique(category_holding(&mut tx, name).await?, None) {
            return Err(StoreError::Duplicate {
                field: UniqueField::CategoryName,
                value: name.to_string(),
            });
        }

        let record: CategoryRecord = sqlx::query_as(
            "INSERT INTO notification_category (name) VALUES ($1) RETURNING id, name",
        )
        .bind(name)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_write_error(e, UniqueField::CategoryName, name))?;

        tx.commit().await?;

        tracing::debug!(category_id = record.id, name = %record.name, "Category stored in PostgreSQL");
        Ok(record.into())
    }

    async fn get_category(&self, id: i64) -> StoreResult<NotificationCategory> {
        let record: Option<CategoryRecord> =
            sqlx::query_as("SELECT id, name FROM notification_category WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        record.map(NotificationCategory::from).ok_or(StoreError::NotFound {
            resource: "Notification category",
            id,
        })
    }

    async fn list_categories(&self) -> StoreResult<Vec<NotificationCategory>> {
        let records: Vec<CategoryRecord> =
            sqlx::query_as("SELECT id, name FROM notification_category ORDER BY id")
                .fetch_all(&self.pool)
                .await?;

        Ok(records.into_iter().map(NotificationCategory::from).collect())
    }

    async fn rename_category(&self, id: i64, name: &str) -> StoreResult<NotificationCategory> {
        let mut tx = self.pool.begin().await?;

        let locked: Option<i64> =
            sqlx::query_scalar("SELECT id FROM notification_category WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
        if locked.is_none() {
            return Err(StoreError::NotFound {
                resource: "Notification category",
                id,
            });
        }

        if !is_unique(category_holding(&mut tx, name).await?, Some(id)) {
            return Err(StoreError::Duplicate {
                field: UniqueField::CategoryName,
                value: name.to_string(),
            });
        }

        let record: CategoryRecord = sqlx::query_as(
            "UPDATE notification_category SET name = $2 WHERE id = $1 RETURNING id, name",
        )
        .bind(id)
        .bind(name)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_write_error(e, UniqueField::CategoryName, name))?;

        tx.commit().await?;
        Ok(record.into())
    }

    async fn delete_category(&self, id: i64) -> StoreResult<()> {
        // Notifications go with it through ON DELETE CASCADE
        let result = sqlx::query("DELETE FROM notification_category WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound {
                resource: "Notification category",
                id,
            });
        }

        tracing::debug!(category_id = id, "Category deleted from PostgreSQL");
        Ok(())
    }

    async fn category_notifications(&self, category_id: i64) -> StoreResult<Vec<Notification>> {
        let records: Vec<NotificationRecord> = sqlx::query_as(&format!(
            "{} WHERE n.notification_category_id = $1 ORDER BY n.message",
            NOTIFICATION_SELECT
        ))
        .bind(category_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(records.into_iter().map(Notification::from).collect())
    }

    async fn count_categories(&self) -> StoreResult<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM notification_category")
            .fetch_one(&self.pool)
            .await?;
        Ok(count.max(0) as u64)
    }

    async fn create_notification(
        &self,
        notification: NewNotification,
    ) -> StoreResult<(Notification, CategoryResolution)> {
        let mut tx = self.pool.begin().await?;

        // Checked before resolving so a rejected write creates nothing
        if !is_unique(notification_holding(&mut tx, &notification.message).await?, None) {
            return Err(StoreError::Duplicate {
                field: UniqueField::NotificationMessage,
                value: notification.message,
            });
        }

        let resolution = resolve_category(&mut tx, &notification.category_name).await?;

        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO notification (message, ttl, notification_category_id)
            VALUES ($1, $2, $3)
            RETURNING id
            "#,
        )
        .bind(&notification.message)
        .bind(notification.ttl)
        .bind(resolution.category().id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_write_error(e, UniqueField::NotificationMessage, &notification.message))?;

        let stored = fetch_notification(&mut tx, id)
            .await?
            .ok_or(StoreError::NotFound {
                resource: "Notification",
                id,
            })?;

        tx.commit().await?;

        tracing::debug!(
            notification_id = stored.id,
            category_id = stored.category.id,
            category_created = resolution.was_created(),
            "Notification stored in PostgreSQL"
        );
        Ok((stored, resolution))
    }

    async fn get_notification(&self, id: i64) -> StoreResult<Notification> {
        let mut conn = self.pool.acquire().await?;
        fetch_notification(&mut conn, id)
            .await?
            .ok_or(StoreError::NotFound {
                resource: "Notification",
                id,
            })
    }

    async fn list_notifications(&self, page: PageRequest) -> StoreResult<(Vec<Notification>, u64)> {
        let total = self.count_notifications().await?;

        let records: Vec<NotificationRecord> = sqlx::query_as(&format!(
            "{} ORDER BY n.id LIMIT $1 OFFSET $2",
            NOTIFICATION_SELECT
        ))
        .bind(to_i64(page.limit()))
        .bind(to_i64(page.offset()))
        .fetch_all(&self.pool)
        .await?;

        Ok((records.into_iter().map(Notification::from).collect(), total))
    }

    async fn update_notification(&self, id: i64, patch: NotificationPatch) -> StoreResult<Notification> {
        let mut tx = self.pool.begin().await?;

        // Lock the row for the read-modify-write
        let locked: Option<i64> =
            sqlx::query_scalar("SELECT id FROM notification WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
        if locked.is_none() {
            return Err(StoreError::NotFound {
                resource: "Notification",
                id,
            });
        }

        let mut notification = fetch_notification(&mut tx, id)
            .await?
            .ok_or(StoreError::NotFound {
                resource: "Notification",
                id,
            })?;

        if let Some(message) = &patch.message {
            if !is_unique(notification_holding(&mut tx, message).await?, Some(id)) {
                return Err(StoreError::Duplicate {
                    field: UniqueField::NotificationMessage,
                    value: message.clone(),
                });
            }
        }

        patch.apply_to(&mut notification);

        sqlx::query(
            r#"
            UPDATE notification
            SET message = $2, ttl = $3, displayed_times = $4, displayed_once = $5
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(&notification.message)
        .bind(notification.ttl)
        .bind(notification.displayed_times)
        .bind(notification.displayed_once)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_write_error(e, UniqueField::NotificationMessage, &notification.message))?;

        tx.commit().await?;
        Ok(notification)
    }

    async fn delete_notification(&self, id: i64) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM notification WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound {
                resource: "Notification",
                id,
            });
        }
        Ok(())
    }

    async fn count_notifications(&self) -> StoreResult<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM notification")
            .fetch_one(&self.pool)
            .await?;
        Ok(count.max(0) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_database_errors_are_not_duplicates() {
        let err = map_write_error(sqlx::Error::RowNotFound, UniqueField::CategoryName, "Error");
        assert!(matches!(err, StoreError::Database(sqlx::Error::RowNotFound)));
        assert!(!is_unique_violation(&sqlx::Error::PoolTimedOut));
    }

    #[test]
    fn test_select_joins_category() {
        assert!(NOTIFICATION_SELECT.contains("JOIN notification_category"));
        assert!(NOTIFICATION_SELECT.contains("category_name"));
    }

    #[test]
    fn test_to_i64_saturates() {
        assert_eq!(to_i64(4), 4);
        assert_eq!(to_i64(u64::MAX), i64::MAX);
    }
}
