use crate::models::user::{User, UserChange, UserFilter};
use async_trait::async_trait;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("User not found")]
    NotFound,
    #[error("User already exists")]
    AlreadyExists,
    #[error("Invalid user field: {0}")]
    InvalidField(String),
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

const USER_COLUMNS: &str = "id, email, hashed_password, session_id, reset_token";

/// Parse an untyped `field=value` assignment into a `UserChange`.
pub fn parse_change(field: &str, value: Option<String>) -> RepositoryResult<UserChange> {
    UserChange::parse(field, value).ok_or_else(|| RepositoryError::InvalidField(field.to_string()))
}

#[async_trait]
#[cfg_attr(test, mockall::automock)]
pub trait UserRepository: Send + Sync {
    async fn insert_user(&self, email: &str, hashed_password: &str) -> RepositoryResult<User>;
    async fn find_user_by(&self, filter: UserFilter) -> RepositoryResult<Option<User>>;
    async fn update_user(&self, id: i64, changes: Vec<UserChange>) -> RepositoryResult<()>;
    async fn list_users(
        &self,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> RepositoryResult<Vec<User>>;
}

pub struct SqliteUserRepository {
    pool: SqlitePool,
}

impl SqliteUserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.is_unique_violation(),
        _ => false,
    }
}

#[async_trait]
impl UserRepository for SqliteUserRepository {
    async fn insert_user(&self, email: &str, hashed_password: &str) -> RepositoryResult<User> {
        let result = sqlx::query("INSERT INTO users (email, hashed_password) VALUES (?, ?)")
            .bind(email)
            .bind(hashed_password)
            .execute(&self.pool)
            .await;

        match result {
            Ok(res) => {
                let id = res.last_insert_rowid();
                self.find_user_by(UserFilter::by_id(id))
                    .await?
                    .ok_or(RepositoryError::NotFound)
            }
            Err(e) if is_unique_violation(&e) => Err(RepositoryError::AlreadyExists),
            Err(e) => Err(RepositoryError::Database(e)),
        }
    }

    async fn find_user_by(&self, filter: UserFilter) -> RepositoryResult<Option<User>> {
        if filter.is_empty() {
            return Ok(None);
        }

        let mut builder: QueryBuilder<Sqlite> =
            QueryBuilder::new(format!("SELECT {USER_COLUMNS} FROM users WHERE "));
        let mut conditions = builder.separated(" AND ");
        if let Some(id) = filter.id {
            conditions.push("id = ");
            conditions.push_bind_unseparated(id);
        }
        if let Some(email) = filter.email {
            conditions.push("email = ");
            conditions.push_bind_unseparated(email);
        }
        if let Some(session_id) = filter.session_id {
            conditions.push("session_id = ");
            conditions.push_bind_unseparated(session_id);
        }
        if let Some(reset_token) = filter.reset_token {
            conditions.push("reset_token = ");
            conditions.push_bind_unseparated(reset_token);
        }
        builder.push(" ORDER BY id LIMIT 1");

        let user = builder
            .build_query_as::<User>()
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    async fn update_user(&self, id: i64, changes: Vec<UserChange>) -> RepositoryResult<()> {
        if changes.is_empty() {
            return match self.find_user_by(UserFilter::by_id(id)).await? {
                Some(_) => Ok(()),
                None => Err(RepositoryError::NotFound),
            };
        }

        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new("UPDATE users SET ");
        let mut assignments = builder.separated(", ");
        for change in changes {
            assignments.push(format!("{} = ", change.column()));
            assignments.push_bind_unseparated(change.into_value());
        }
        builder.push(" WHERE id = ");
        builder.push_bind(id);

        let result = builder.build().execute(&self.pool).await;

        match result {
            Ok(res) => {
                if res.rows_affected() == 0 {
                    return Err(RepositoryError::NotFound);
                }
                Ok(())
            }
            Err(e) if is_unique_violation(&e) => Err(RepositoryError::AlreadyExists),
            Err(e) => Err(RepositoryError::Database(e)),
        }
    }

    async fn list_users(
        &self,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> RepositoryResult<Vec<User>> {
        let limit = limit.unwrap_or(100);
        let offset = offset.unwrap_or(0);

        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY id LIMIT ? OFFSET ?"
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }
}
