use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header::SET_COOKIE, HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use glowform_core::User;
use log::warn;
use serde::Deserialize;
use serde_json::json;

use crate::{
    error::{ApiError, ApiResult},
    session::{clear_session_cookie, session_cookie, session_token, AuthUser},
    state::SharedState,
};

#[derive(Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    name: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
}

pub async fn register_handler(
    State(state): State<SharedState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(payload) = payload?;
    if payload.name.trim().is_empty()
        || payload.email.trim().is_empty()
        || payload.password.is_empty()
    {
        return Err(ApiError::BadRequest("All fields are required".to_string()));
    }

    let user = state.storage.auth(|service| {
        Ok(service.register(&payload.name, &payload.email, &payload.password)?)
    })?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "User registered successfully", "user": user })),
    ))
}

pub async fn login_handler(
    State(state): State<SharedState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(payload) = payload?;
    if payload.email.trim().is_empty() || payload.password.is_empty() {
        return Err(ApiError::BadRequest(
            "Email and password are required".to_string(),
        ));
    }

    let (user, session) = state
        .storage
        .auth(|service| Ok(service.login(&payload.email, &payload.password)?))?;
    let cookie = session_cookie(&session.token, state.config.secure_cookies);

    Ok((
        StatusCode::OK,
        [(SET_COOKIE, cookie)],
        Json(json!({ "message": "Login successful", "user": user })),
    ))
}

/// Always clears the cookie, with or without a live session.
pub async fn logout_handler(
    State(state): State<SharedState>,
    headers: HeaderMap,
) -> ApiResult<impl IntoResponse> {
    if let Some(token) = session_token(&headers) {
        let removed = state.storage.auth(|service| Ok(service.logout(&token)?))?;
        if !removed {
            warn!("event=user_logout module=server status=noop reason=unknown_session");
        }
    }

    Ok((
        StatusCode::OK,
        [(SET_COOKIE, clear_session_cookie(state.config.secure_cookies))],
        Json(json!({ "message": "Logout successful" })),
    ))
}

pub async fn me_handler(auth: AuthUser) -> Json<User> {
    Json(auth.user)
}
