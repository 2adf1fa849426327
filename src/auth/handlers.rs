use crate::auth::middleware::SessionUser;
use crate::error::{AppError, Result};
use crate::AppState;
use axum::{
    extract::{Form, State},
    response::{IntoResponse, Json, Redirect},
};
use axum_extra::extract::CookieJar;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

#[derive(Deserialize)]
pub struct CredentialsForm {
    email: Option<String>,
    password: Option<String>,
}

#[derive(Deserialize)]
pub struct ResetPasswordForm {
    email: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdatePasswordForm {
    email: Option<String>,
    reset_token: Option<String>,
    new_password: Option<String>,
}

fn non_empty(field: Option<String>) -> Option<String> {
    field.filter(|value| !value.is_empty())
}

pub async fn welcome_handler() -> Json<Value> {
    Json(json!({ "message": "Bienvenue" }))
}

pub async fn register_handler(
    State(app_state): State<AppState>,
    Form(form): Form<CredentialsForm>,
) -> Result<Json<Value>> {
    let (Some(email), Some(password)) = (non_empty(form.email), non_empty(form.password)) else {
        return Err(AppError::Validation(
            "Missing email or password".to_string(),
        ));
    };

    let user = app_state
        .auth_service
        .register_user(&email, &password)
        .await?;

    Ok(Json(json!({ "email": user.email, "message": "user created" })))
}

pub async fn login_handler(
    State(app_state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<CredentialsForm>,
) -> Result<(CookieJar, Json<Value>)> {
    let (Some(email), Some(password)) = (non_empty(form.email), non_empty(form.password)) else {
        return Err(AppError::InvalidCredentials);
    };

    if !app_state.auth_service.valid_login(&email, &password).await {
        debug!("Rejected login attempt");
        return Err(AppError::InvalidCredentials);
    }

    let session_id = app_state
        .auth_service
        .create_session(&email)
        .await
        .ok_or_else(|| AppError::Internal("session was not persisted".to_string()))?;

    let jar = jar.add(app_state.session_config.session_cookie(session_id));

    Ok((jar, Json(json!({ "email": email, "message": "logged in" }))))
}

pub async fn logout_handler(
    State(app_state): State<AppState>,
    jar: CookieJar,
    SessionUser(user): SessionUser,
) -> impl IntoResponse {
    app_state.auth_service.destroy_session(user.id).await;

    let jar = jar.remove(app_state.session_config.removal_cookie());
    (jar, Redirect::to("/"))
}

pub async fn profile_handler(SessionUser(user): SessionUser) -> Json<Value> {
    Json(json!({ "email": user.email }))
}

pub async fn reset_password_handler(
    State(app_state): State<AppState>,
    Form(form): Form<ResetPasswordForm>,
) -> Result<Json<Value>> {
    let email = non_empty(form.email).ok_or(AppError::Forbidden)?;

    let reset_token = app_state
        .auth_service
        .get_reset_password_token(&email)
        .await?;

    Ok(Json(json!({ "email": email, "reset_token": reset_token })))
}

pub async fn update_password_handler(
    State(app_state): State<AppState>,
    Form(form): Form<UpdatePasswordForm>,
) -> Result<Json<Value>> {
    let (Some(email), Some(reset_token), Some(new_password)) = (
        non_empty(form.email),
        non_empty(form.reset_token),
        non_empty(form.new_password),
    ) else {
        return Err(AppError::Validation(
            "Missing email, reset_token or new_password".to_string(),
        ));
    };

    app_state
        .auth_service
        .update_password(&reset_token, &new_password)
        .await?;

    Ok(Json(json!({ "email": email, "message": "Password updated" })))
}
