//! SQLite database operations
//!
//! All database access goes through this module.
//! Uses SQLx with migrations run at connect time.

use chrono::Utc;
use sqlx::{Pool, Sqlite, SqlitePool};
use std::path::Path;

use super::models::UserProfile;
use crate::error::AppError;
use crate::metrics::observe_db_query;

/// Database connection pool wrapper.
pub struct Database {
    pool: Pool<Sqlite>,
}

impl Database {
    // =========================================================================
    // Connection
    // =========================================================================

    /// Connect to SQLite database
    ///
    /// Creates the database file if it doesn't exist.
    /// Runs pending migrations automatically.
    ///
    /// # Arguments
    /// * `path` - Path to SQLite database file
    ///
    /// # Errors
    /// Returns error if connection or migration fails
    pub async fn connect(path: &Path) -> Result<Self, AppError> {
        // Create parent directory if it doesn't exist
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| AppError::Database(sqlx::Error::Io(e)))?;
        }

        let connection_string = format!("sqlite:{}?mode=rwc", path.display());
        let pool = SqlitePool::connect(&connection_string).await?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| {
                tracing::error!("Migration failed: {}", e);
                AppError::Internal(anyhow::anyhow!("Migration failed: {}", e))
            })?;

        tracing::info!("Database connected and migrated successfully");

        Ok(Self { pool })
    }

    #[cfg(test)]
    pub(crate) fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    // =========================================================================
    // User profiles
    // =========================================================================

    /// Fetch a profile row by provider user id.
    pub async fn get_profile(&self, user_id: &str) -> Result<Option<UserProfile>, AppError> {
        observe_db_query("select");

        let profile = sqlx::query_as::<_, UserProfile>(
            "SELECT id, updated_at, report_email, github_token_encrypted, github_connected
             FROM user_profiles WHERE id = ?",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(profile)
    }

    /// Mark GitHub as connected, creating the profile row if needed.
    pub async fn upsert_github_connected(&self, user_id: &str) -> Result<(), AppError> {
        observe_db_query("upsert");

        sqlx::query(
            "INSERT INTO user_profiles (id, updated_at, github_connected)
             VALUES (?, ?, 1)
             ON CONFLICT(id) DO UPDATE SET
                 github_connected = 1,
                 updated_at = excluded.updated_at",
        )
        .bind(user_id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Set the GitHub connection flag on an existing profile row.
    ///
    /// Disconnecting also clears the legacy token column. A missing row is
    /// not an error; there is then nothing to clear.
    pub async fn set_github_connected(
        &self,
        user_id: &str,
        connected: bool,
    ) -> Result<(), AppError> {
        observe_db_query("update");

        if connected {
            sqlx::query(
                "UPDATE user_profiles SET github_connected = 1, updated_at = ? WHERE id = ?",
            )
            .bind(Utc::now())
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        } else {
            sqlx::query(
                "UPDATE user_profiles
                 SET github_connected = 0, github_token_encrypted = NULL, updated_at = ?
                 WHERE id = ?",
            )
            .bind(Utc::now())
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        }

        Ok(())
    }

    /// Update the report email on an existing profile row.
    pub async fn update_report_email(
        &self,
        user_id: &str,
        report_email: Option<&str>,
    ) -> Result<(), AppError> {
        observe_db_query("update");

        sqlx::query("UPDATE user_profiles SET report_email = ?, updated_at = ? WHERE id = ?")
            .bind(report_email)
            .bind(Utc::now())
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
