use axum::{
    routing::{get, post},
    Router,
};

use crate::state::SharedState;

pub mod auth;
pub mod forms;
pub mod status;

use auth::{login_handler, logout_handler, me_handler, register_handler};
use forms::{
    create_form_handler, create_submission_handler, get_form_handler, list_forms_handler,
    list_submissions_handler,
};
use status::status_handler;

/// All API routes, without cross-cutting layers.
pub fn routes() -> Router<SharedState> {
    Router::new()
        .route("/status", get(status_handler))
        .route("/forms", post(create_form_handler).get(list_forms_handler))
        .route("/forms/:form_id", get(get_form_handler))
        .route(
            "/forms/:form_id/submissions",
            post(create_submission_handler).get(list_submissions_handler),
        )
        .route("/auth/register", post(register_handler))
        .route("/auth/login", post(login_handler))
        .route("/auth/logout", post(logout_handler))
        .route("/auth/me", get(me_handler))
}
