use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use tracing::info;

const CREATE_USERS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    email VARCHAR(250) NOT NULL UNIQUE,
    hashed_password VARCHAR(250) NOT NULL,
    session_id VARCHAR(250) UNIQUE,
    reset_token VARCHAR(250) UNIQUE
)
"#;

pub async fn create_pool(database_url: &str) -> Result<SqlitePool, sqlx::Error> {
    // Ensure the data directory exists
    let path = database_url
        .trim_start_matches("sqlite://")
        .split('?')
        .next()
        .unwrap_or_default();
    if let Some(parent) = std::path::Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).ok();
        }
    }

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await?;

    Ok(pool)
}

/// Create the users table. With `reset`, any existing table is dropped first,
/// so no state survives a restart.
pub async fn prepare_schema(pool: &SqlitePool, reset: bool) -> Result<(), sqlx::Error> {
    if reset {
        info!("Dropping users table");
        sqlx::query("DROP TABLE IF EXISTS users")
            .execute(pool)
            .await?;
    }

    sqlx::query(CREATE_USERS_TABLE).execute(pool).await?;

    Ok(())
}
