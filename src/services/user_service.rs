use crate::models::user::{User, UserChange, UserFilter};
use crate::repositories::user_repository::{RepositoryError, UserRepository};
use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
pub enum UserServiceError {
    #[error("User not found")]
    UserNotFound,
    #[error("Email already registered")]
    EmailTaken,
    #[error("Invalid user field: {0}")]
    InvalidField(String),
    #[error("Repository error: {0}")]
    RepositoryError(RepositoryError),
}

impl From<RepositoryError> for UserServiceError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => UserServiceError::UserNotFound,
            RepositoryError::AlreadyExists => UserServiceError::EmailTaken,
            RepositoryError::InvalidField(field) => UserServiceError::InvalidField(field),
            e => UserServiceError::RepositoryError(e),
        }
    }
}

/// Read-side user lookups and raw attribute updates for the users API and the
/// admin CLI.
pub struct UserService {
    repository: Arc<dyn UserRepository>,
}

impl UserService {
    pub fn new(repository: Arc<dyn UserRepository>) -> Self {
        Self { repository }
    }

    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, UserServiceError> {
        Ok(self.repository.find_user_by(UserFilter::by_email(email)).await?)
    }

    pub async fn find_user_by_id(&self, id: i64) -> Result<Option<User>, UserServiceError> {
        Ok(self.repository.find_user_by(UserFilter::by_id(id)).await?)
    }

    pub async fn list_users(
        &self,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<Vec<User>, UserServiceError> {
        Ok(self.repository.list_users(limit, offset).await?)
    }

    pub async fn update_user(
        &self,
        id: i64,
        changes: Vec<UserChange>,
    ) -> Result<(), UserServiceError> {
        Ok(self.repository.update_user(id, changes).await?)
    }
}
