use crate::models::user::{User, UserChange, UserFilter};
use crate::repositories::user_repository::{RepositoryError, UserRepository};
use crate::services::password::{hash_password, verify_password};
use rand::{rngs::OsRng, RngCore};
use std::sync::Arc;
use tracing::{debug, info, warn};

const TOKEN_BYTES: usize = 32;

#[derive(Debug, thiserror::Error)]
pub enum AuthServiceError {
    #[error("User {0} already exists")]
    AlreadyRegistered(String),
    #[error("User not found")]
    UserNotFound,
    #[error("Invalid reset token")]
    InvalidResetToken,
    #[error("Password hashing failed: {0}")]
    HashingError(String),
    #[error("Repository error: {0}")]
    RepositoryError(#[from] RepositoryError),
}

/// Opaque bearer token: 256 bits from the OS CSPRNG, hex encoded.
fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Registration, credential checks and session/reset token lifecycle on top
/// of a `UserRepository`.
///
/// `create_session`, `user_from_session` and `destroy_session` never surface
/// store failures: they log the cause and report "no session". `register_user`,
/// `get_reset_password_token` and `update_password` propagate errors.
///
/// Session creation is a read followed by a write with no locking, so two
/// concurrent logins for the same user race and the last write wins.
pub struct AuthService {
    user_repository: Arc<dyn UserRepository>,
}

impl AuthService {
    pub fn new(user_repository: Arc<dyn UserRepository>) -> Self {
        Self { user_repository }
    }

    pub async fn register_user(
        &self,
        email: &str,
        password: &str,
    ) -> Result<User, AuthServiceError> {
        if self.email_exists(email).await? {
            return Err(AuthServiceError::AlreadyRegistered(email.to_string()));
        }

        let hashed_password =
            hash_password(password).map_err(|e| AuthServiceError::HashingError(e.to_string()))?;

        match self
            .user_repository
            .insert_user(email, &hashed_password)
            .await
        {
            Ok(user) => {
                info!(user_id = user.id, "Registered user");
                Ok(user)
            }
            // Lost a race with a concurrent registration
            Err(RepositoryError::AlreadyExists) => {
                Err(AuthServiceError::AlreadyRegistered(email.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    pub async fn email_exists(&self, email: &str) -> Result<bool, AuthServiceError> {
        Ok(self
            .user_repository
            .find_user_by(UserFilter::by_email(email))
            .await?
            .is_some())
    }

    pub async fn valid_login(&self, email: &str, password: &str) -> bool {
        match self
            .user_repository
            .find_user_by(UserFilter::by_email(email))
            .await
        {
            Ok(Some(user)) => verify_password(password, &user.hashed_password),
            Ok(None) => false,
            Err(e) => {
                warn!("Login lookup failed: {}", e);
                false
            }
        }
    }

    /// Issue a new session token for the user and return the value now stored
    /// on their record.
    pub async fn create_session(&self, email: &str) -> Option<String> {
        match self.try_create_session(email).await {
            Ok(session_id) => session_id,
            Err(e) => {
                warn!("Failed to create session: {}", e);
                None
            }
        }
    }

    async fn try_create_session(&self, email: &str) -> Result<Option<String>, RepositoryError> {
        let Some(user) = self
            .user_repository
            .find_user_by(UserFilter::by_email(email))
            .await?
        else {
            return Ok(None);
        };

        self.user_repository
            .update_user(user.id, vec![UserChange::SessionId(Some(generate_token()))])
            .await?;

        let stored = self
            .user_repository
            .find_user_by(UserFilter::by_id(user.id))
            .await?
            .and_then(|u| u.session_id);

        if stored.is_some() {
            info!(user_id = user.id, "Session created");
        }
        Ok(stored)
    }

    pub async fn user_from_session(&self, session_id: &str) -> Option<User> {
        if session_id.is_empty() {
            return None;
        }

        match self
            .user_repository
            .find_user_by(UserFilter::by_session_id(session_id))
            .await
        {
            Ok(user) => user,
            Err(e) => {
                warn!("Session lookup failed: {}", e);
                None
            }
        }
    }

    pub async fn destroy_session(&self, user_id: i64) {
        match self
            .user_repository
            .update_user(user_id, vec![UserChange::SessionId(None)])
            .await
        {
            Ok(()) => info!(user_id, "Session destroyed"),
            Err(RepositoryError::NotFound) => {
                debug!(user_id, "No user to destroy session for")
            }
            Err(e) => warn!(user_id, "Failed to destroy session: {}", e),
        }
    }

    pub async fn get_reset_password_token(&self, email: &str) -> Result<String, AuthServiceError> {
        let user = self
            .user_repository
            .find_user_by(UserFilter::by_email(email))
            .await?
            .ok_or(AuthServiceError::UserNotFound)?;

        self.user_repository
            .update_user(
                user.id,
                vec![UserChange::ResetToken(Some(generate_token()))],
            )
            .await?;

        let reset_token = self
            .user_repository
            .find_user_by(UserFilter::by_id(user.id))
            .await?
            .and_then(|u| u.reset_token)
            .ok_or(AuthServiceError::UserNotFound)?;

        info!(user_id = user.id, "Reset token issued");
        Ok(reset_token)
    }

    /// Set a new password for the holder of `reset_token` and consume the token.
    pub async fn update_password(
        &self,
        reset_token: &str,
        password: &str,
    ) -> Result<(), AuthServiceError> {
        if reset_token.is_empty() {
            return Err(AuthServiceError::InvalidResetToken);
        }

        let user = self
            .user_repository
            .find_user_by(UserFilter::by_reset_token(reset_token))
            .await?
            .ok_or(AuthServiceError::InvalidResetToken)?;

        let hashed_password =
            hash_password(password).map_err(|e| AuthServiceError::HashingError(e.to_string()))?;

        self.user_repository
            .update_user(
                user.id,
                vec![
                    UserChange::HashedPassword(hashed_password),
                    UserChange::ResetToken(None),
                ],
            )
            .await?;

        info!(user_id = user.id, "Password updated via reset token");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::user_repository::MockUserRepository;
    use mockall::predicate::*;

    fn sample_user() -> User {
        User {
            id: 1,
            email: "a@x.com".to_string(),
            hashed_password: hash_password("pw1").unwrap(),
            session_id: None,
            reset_token: None,
        }
    }

    #[test]
    fn test_generate_token_is_unique_hex() {
        let a = generate_token();
        let b = generate_token();
        assert_eq!(a.len(), TOKEN_BYTES * 2);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn test_register_existing_email_does_not_insert() {
        let mut mock_repo = MockUserRepository::new();
        let user = sample_user();

        mock_repo
            .expect_find_user_by()
            .with(eq(UserFilter::by_email("a@x.com")))
            .times(1)
            .returning(move |_| {
                let user = user.clone();
                Box::pin(async move { Ok(Some(user)) })
            });
        mock_repo.expect_insert_user().never();

        let service = AuthService::new(Arc::new(mock_repo));

        let result = service.register_user("a@x.com", "pw2").await;
        assert!(matches!(result, Err(AuthServiceError::AlreadyRegistered(e)) if e == "a@x.com"));
    }

    #[tokio::test]
    async fn test_register_maps_unique_violation() {
        let mut mock_repo = MockUserRepository::new();

        mock_repo
            .expect_find_user_by()
            .returning(|_| Box::pin(async move { Ok(None) }));
        mock_repo
            .expect_insert_user()
            .with(eq("a@x.com"), always())
            .times(1)
            .returning(|_, _| Box::pin(async move { Err(RepositoryError::AlreadyExists) }));

        let service = AuthService::new(Arc::new(mock_repo));

        let result = service.register_user("a@x.com", "pw1").await;
        assert!(matches!(result, Err(AuthServiceError::AlreadyRegistered(_))));
    }

    #[tokio::test]
    async fn test_valid_login_store_failure_is_false() {
        let mut mock_repo = MockUserRepository::new();

        mock_repo
            .expect_find_user_by()
            .returning(|_| {
                Box::pin(async move { Err(RepositoryError::Database(sqlx::Error::PoolTimedOut)) })
            });

        let service = AuthService::new(Arc::new(mock_repo));
        assert!(!service.valid_login("a@x.com", "pw1").await);
    }

    #[tokio::test]
    async fn test_create_session_unknown_email() {
        let mut mock_repo = MockUserRepository::new();

        mock_repo
            .expect_find_user_by()
            .with(eq(UserFilter::by_email("ghost@x.com")))
            .times(1)
            .returning(|_| Box::pin(async move { Ok(None) }));
        mock_repo.expect_update_user().never();

        let service = AuthService::new(Arc::new(mock_repo));
        assert_eq!(service.create_session("ghost@x.com").await, None);
    }

    #[tokio::test]
    async fn test_create_session_update_failure_returns_none() {
        let mut mock_repo = MockUserRepository::new();
        let user = sample_user();

        mock_repo.expect_find_user_by().returning(move |_| {
            let user = user.clone();
            Box::pin(async move { Ok(Some(user)) })
        });
        mock_repo
            .expect_update_user()
            .times(1)
            .returning(|_, _| {
                Box::pin(async move { Err(RepositoryError::Database(sqlx::Error::PoolTimedOut)) })
            });

        let service = AuthService::new(Arc::new(mock_repo));
        assert_eq!(service.create_session("a@x.com").await, None);
    }

    #[tokio::test]
    async fn test_user_from_empty_session_skips_store() {
        let mut mock_repo = MockUserRepository::new();
        mock_repo.expect_find_user_by().never();

        let service = AuthService::new(Arc::new(mock_repo));
        assert!(service.user_from_session("").await.is_none());
    }

    #[tokio::test]
    async fn test_destroy_session_unknown_user_is_silent() {
        let mut mock_repo = MockUserRepository::new();

        mock_repo
            .expect_update_user()
            .with(eq(42), eq(vec![UserChange::SessionId(None)]))
            .times(1)
            .returning(|_, _| Box::pin(async move { Err(RepositoryError::NotFound) }));

        let service = AuthService::new(Arc::new(mock_repo));
        service.destroy_session(42).await;
    }

    #[tokio::test]
    async fn test_reset_token_unknown_email() {
        let mut mock_repo = MockUserRepository::new();

        mock_repo
            .expect_find_user_by()
            .times(1)
            .returning(|_| Box::pin(async move { Ok(None) }));

        let service = AuthService::new(Arc::new(mock_repo));

        let result = service.get_reset_password_token("ghost@x.com").await;
        assert!(matches!(result, Err(AuthServiceError::UserNotFound)));
    }

    #[tokio::test]
    async fn test_update_password_empty_token() {
        let mock_repo = MockUserRepository::new();
        let service = AuthService::new(Arc::new(mock_repo));

        let result = service.update_password("", "newpw").await;
        assert!(matches!(result, Err(AuthServiceError::InvalidResetToken)));
    }
}
