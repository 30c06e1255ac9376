use crate::api::handlers::universities;
use crate::state::AppState;
use axum::{routing::get, Router};

pub fn university_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(universities::list_universities).post(universities::create_university),
        )
        .route("/search", get(universities::search_universities))
        .route(
            "/:id",
            get(universities::get_university)
                .put(universities::update_university)
                .delete(universities::delete_university),
        )
        .route("/:id/modules", get(universities::list_university_modules))
}
