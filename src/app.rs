use crate::handlers;
use crate::state::AppState;
use axum::{
    routing::{get, patch, post, put},
    Router,
};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route(
            "/api/auth/session",
            post(handlers::sign_in).delete(handlers::sign_out),
        )
        .route("/api/session", get(handlers::get_session))
        .route("/api/grid", get(handlers::get_grid))
        .route("/api/colors/next", get(handlers::next_color))
        .route("/api/habits", post(handlers::create_habit))
        .route(
            "/api/habits/:id",
            patch(handlers::update_habit).delete(handlers::delete_habit),
        )
        .route("/api/habits/:id/days/:date", put(handlers::set_day))
        .route("/api/habits/:id/days/:date/toggle", post(handlers::toggle_day))
        .route(
            "/api/settings",
            get(handlers::get_settings).put(handlers::commit_settings),
        )
        .route("/api/settings/defaults", post(handlers::restore_default_settings))
        .route(
            "/api/settings/preview",
            post(handlers::preview_settings).delete(handlers::reset_preview),
        )
        .route("/api/settings/balance", post(handlers::balance_settings))
        .with_state(state)
}
