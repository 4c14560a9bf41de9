use axum::{
    routing::{get, post},
    Router,
};

use crate::state::AppState;

pub mod claims;
pub mod cookies;
mod dto;
pub(crate) mod extractors;
pub mod handlers;
pub mod jwt;
pub mod oauth;
pub mod password;
pub mod repo;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/auth/signup", post(handlers::signup))
        .route("/auth/login", post(handlers::login))
        .route("/auth/refresh", post(handlers::refresh))
        .route("/auth/logout", post(handlers::logout))
        .route(
            "/auth/me",
            get(handlers::get_me)
                .patch(handlers::patch_me)
                .delete(handlers::delete_me),
        )
        .route("/auth/:provider/login", get(oauth::handlers::login_redirect))
        .route("/auth/:provider/callback", get(oauth::handlers::callback))
}
