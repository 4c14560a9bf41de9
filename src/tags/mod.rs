use axum::{routing::get, Router};

use crate::state::AppState;

pub mod handlers;
pub mod repo;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/tags", get(handlers::list_tags).post(handlers::create_tag))
        .route(
            "/tags/:id",
            get(handlers::get_tag)
                .put(handlers::put_tag)
                .delete(handlers::delete_tag),
        )
}
