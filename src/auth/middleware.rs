use crate::{error::AppError, models::User, AppState};
use axum::{extract::FromRequestParts, http::request::Parts};
use axum_extra::extract::CookieJar;

/// Read the session token from the request cookies, if any.
pub fn session_id_from_jar(jar: &CookieJar, state: &AppState) -> Option<String> {
    jar.get(&state.session_config.name)
        .map(|cookie| cookie.value().to_string())
}

/// Extractor for the user owning the request's session cookie.
///
/// Rejects with 403 when the cookie is missing or does not match a session.
pub struct SessionUser(pub User);

impl FromRequestParts<AppState> for SessionUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let session_id = session_id_from_jar(&jar, state).ok_or(AppError::Forbidden)?;

        state
            .auth_service
            .user_from_session(&session_id)
            .await
            .map(SessionUser)
            .ok_or(AppError::Forbidden)
    }
}
