use std::env;

use axum_extra::extract::cookie::{Cookie, SameSite};

use super::{current_environment, env_flag_enabled, ConfigError};

pub const SESSION_COOKIE_NAME: &str = "session_id";

/// Attributes of the cookie that carries the session token.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub secure: bool,
    pub http_only: bool,
    pub same_site: SameSite,
    pub name: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            secure: false,
            http_only: true,
            same_site: SameSite::Lax,
            name: SESSION_COOKIE_NAME.to_string(),
        }
    }
}

impl SessionConfig {
    pub fn from_env() -> Self {
        let is_production = current_environment() == "production";

        if is_production {
            SessionConfig {
                secure: true,
                http_only: true,
                same_site: SameSite::Strict,
                name: SESSION_COOKIE_NAME.to_string(),
            }
        } else {
            SessionConfig::default()
        }
    }

    pub fn session_cookie(&self, session_id: String) -> Cookie<'static> {
        Cookie::build((self.name.clone(), session_id))
            .path("/")
            .secure(self.secure)
            .http_only(self.http_only)
            .same_site(self.same_site)
            .build()
    }

    /// Cookie used to clear the session on the client.
    pub fn removal_cookie(&self) -> Cookie<'static> {
        Cookie::build((self.name.clone(), "")).path("/").build()
    }
}

pub fn validate_production_config() -> Result<(), ConfigError> {
    if current_environment() != "production" {
        return Ok(());
    }

    if !env_flag_enabled("FORCE_HTTPS") {
        return Err(ConfigError::Invalid(
            "Production environment requires HTTPS. Set FORCE_HTTPS=true".to_string(),
        ));
    }

    if env::var("DATABASE_URL").is_err() {
        return Err(ConfigError::Missing("DATABASE_URL"));
    }

    Ok(())
}
