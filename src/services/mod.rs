pub mod auth_service;
pub mod password;
pub mod user_service;

pub use auth_service::{AuthService, AuthServiceError};
pub use user_service::{UserService, UserServiceError};
