use crate::api::handlers::modules;
use crate::state::AppState;
use axum::{routing::get, Router};

pub fn module_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(modules::list_modules).post(modules::create_module))
        .route(
            "/:id",
            get(modules::get_module)
                .put(modules::update_module)
                .delete(modules::delete_module),
        )
}
