pub mod test_helpers {
    use crate::{config::SessionConfig, db, AppState};
    use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
    use tempfile::NamedTempFile;

    /// Create a new in-memory SQLite database for testing
    pub async fn create_test_db() -> Result<SqlitePool, sqlx::Error> {
        // A single connection that never expires keeps the in-memory database alive
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await?;

        db::prepare_schema(&pool, true).await?;

        Ok(pool)
    }

    /// Create a temporary file-based SQLite database for testing
    /// Useful when you need to test features that don't work with in-memory databases
    pub async fn create_test_db_file() -> Result<(SqlitePool, NamedTempFile), sqlx::Error> {
        let temp_file = NamedTempFile::new().map_err(sqlx::Error::Io)?;
        let db_path = temp_file
            .path()
            .to_str()
            .ok_or_else(|| sqlx::Error::Configuration("Invalid database path".into()))?;
        let database_url = format!("sqlite://{}", db_path);

        let pool = db::create_pool(&database_url).await?;
        db::prepare_schema(&pool, true).await?;

        Ok((pool, temp_file))
    }

    /// Application state over a fresh in-memory database
    pub async fn create_test_state() -> Result<AppState, sqlx::Error> {
        let pool = create_test_db().await?;
        Ok(AppState::new(pool, SessionConfig::default()))
    }

    /// Insert a test user with hashed password
    pub async fn insert_test_user(
        pool: &SqlitePool,
        email: &str,
        password: &str,
    ) -> Result<i64, sqlx::Error> {
        let hashed_password = crate::services::password::hash_password(password).map_err(|e| {
            sqlx::Error::Configuration(format!("Password hashing failed: {}", e).into())
        })?;

        let result = sqlx::query("INSERT INTO users (email, hashed_password) VALUES (?, ?)")
            .bind(email)
            .bind(hashed_password)
            .execute(pool)
            .await?;

        Ok(result.last_insert_rowid())
    }
}

// Re-export commonly used test functions at module level for convenience
// Note: This is test-only code. Panic on error is acceptable in tests.
#[cfg(test)]
pub async fn create_test_pool() -> sqlx::SqlitePool {
    match test_helpers::create_test_db().await {
        Ok(pool) => pool,
        Err(e) => panic!("Failed to create test pool: {}", e),
    }
}
