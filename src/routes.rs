use crate::{auth, handlers, AppState};
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

pub fn build_router(app_state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/users", get(handlers::list_users_handler))
        .route("/users/{user_id}", get(handlers::get_user_handler));

    Router::new()
        .route("/", get(auth::handlers::welcome_handler))
        .route("/users", post(auth::handlers::register_handler))
        .route(
            "/sessions",
            post(auth::handlers::login_handler).delete(auth::handlers::logout_handler),
        )
        .route("/profile", get(auth::handlers::profile_handler))
        .route(
            "/reset_password",
            post(auth::handlers::reset_password_handler)
                .put(auth::handlers::update_password_handler),
        )
        .nest("/api/v1", api_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
