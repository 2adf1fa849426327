pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;

// Make test_utils available for both unit tests and integration tests
pub mod test_utils;

use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<services::auth_service::AuthService>,
    pub user_service: Arc<services::user_service::UserService>,
    pub session_config: config::SessionConfig,
}

impl AppState {
    pub fn new(pool: sqlx::SqlitePool, session_config: config::SessionConfig) -> Self {
        let user_repository: Arc<dyn repositories::UserRepository> =
            Arc::new(repositories::SqliteUserRepository::new(pool));

        AppState {
            auth_service: Arc::new(services::AuthService::new(user_repository.clone())),
            user_service: Arc::new(services::UserService::new(user_repository)),
            session_config,
        }
    }
}
