use std::sync::Arc;

use axum::{
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::{
    handler::*,
    middleware::{mw_method_override, mw_resolve_identity},
    AppState,
};

pub fn create_router(app_state: Arc<AppState>) -> Router {
    let app = Router::new()
        .route("/", get(list_tasks))
        .route("/add", get(new_task_form).post(create_task))
        .route(
            "/tasks/:id",
            get(get_task).put(update_task).patch(update_task).delete(delete_task),
        )
        .route("/tasks/:id/edit", get(edit_task_form))
        .route("/register", get(register_form).post(register))
        .route("/login", get(login_form).post(login))
        .route("/logout", post(logout))
        .route("/health", get(health_checker_handler))
        .fallback(not_found_handler)
        .layer(from_fn_with_state(app_state.clone(), mw_resolve_identity))
        .with_state(app_state);

    // Method override has to see the request before the inner router matches it.
    Router::new()
        .fallback_service(app)
        .layer(from_fn(mw_method_override))
        .layer(TraceLayer::new_for_http())
}
