use crate::auth::middleware::session_id_from_jar;
use crate::error::{AppError, Result};
use crate::models::UserView;
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    response::Json,
};
use axum_extra::extract::CookieJar;
use serde::Deserialize;

#[derive(Deserialize)]
pub struct ListUsersQuery {
    limit: Option<i64>,
    offset: Option<i64>,
}

pub async fn list_users_handler(
    State(app_state): State<AppState>,
    Query(query): Query<ListUsersQuery>,
) -> Result<Json<Vec<UserView>>> {
    let users = app_state
        .user_service
        .list_users(query.limit, query.offset)
        .await?;

    Ok(Json(users.into_iter().map(UserView::from).collect()))
}

/// `GET /api/v1/users/{user_id}`, where `me` resolves to the session owner.
pub async fn get_user_handler(
    State(app_state): State<AppState>,
    Path(user_id): Path<String>,
    jar: CookieJar,
) -> Result<Json<UserView>> {
    let user = if user_id == "me" {
        let session_id = session_id_from_jar(&jar, &app_state).ok_or(AppError::NotFound)?;
        app_state.auth_service.user_from_session(&session_id).await
    } else {
        let id = user_id.parse::<i64>().map_err(|_| AppError::NotFound)?;
        app_state.user_service.find_user_by_id(id).await?
    };

    user.map(|u| Json(UserView::from(u)))
        .ok_or(AppError::NotFound)
}
