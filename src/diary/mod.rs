use axum::{routing::get, Router};

use crate::state::AppState;

mod dto;
pub mod handlers;
pub mod repo;

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/diaries",
            get(handlers::list_diaries).post(handlers::create_diary),
        )
        .route(
            "/diaries/:id",
            get(handlers::get_diary)
                .patch(handlers::patch_diary)
                .delete(handlers::delete_diary),
        )
}
