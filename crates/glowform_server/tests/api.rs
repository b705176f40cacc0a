use axum::{
    body::{to_bytes, Body},
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE, COOKIE, SET_COOKIE},
        Request, Response, StatusCode,
    },
    Router,
};
use glowform_server::{
    build_router,
    config::Config,
    state::{AppState, SharedState, Storage},
};
use serde_json::{json, Value};
use tower::ServiceExt; // for `oneshot`
use uuid::Uuid;

fn test_state() -> SharedState {
    AppState::new(Config::default(), Storage::in_memory().unwrap())
}

async fn send(app: &Router, request: Request<Body>) -> Response<Body> {
    app.clone().oneshot(request).await.unwrap()
}

fn json_request(method: &str, uri: &str, body: Value, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(COOKIE, format!("sid={token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn get_request(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

async fn body_json(response: Response<Body>) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Registers and logs in; returns the session token and user id.
async fn login(app: &Router, email: &str) -> (String, String) {
    let response = send(
        app,
        json_request(
            "POST",
            "/auth/register",
            json!({ "name": "Ada", "email": email, "password": "pw" }),
            None,
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = send(
        app,
        json_request(
            "POST",
            "/auth/login",
            json!({ "email": email, "password": "pw" }),
            None,
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let cookie = response
        .headers()
        .get(SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    let token = cookie
        .strip_prefix("sid=")
        .and_then(|rest| rest.split(';').next())
        .unwrap()
        .to_string();
    let body = body_json(response).await;
    (token, body["user"]["id"].as_str().unwrap().to_string())
}

fn sample_form() -> Value {
    json!({
        "formName": "Team pulse",
        "fields": [
            { "type": "text", "label": "Name", "required": true },
            { "type": "dropdown", "label": "Team", "options": ["Ops", "Dev"] }
        ]
    })
}

async fn create_form(app: &Router, token: &str) -> Value {
    let response = send(app, json_request("POST", "/forms", sample_form(), Some(token))).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["form"].clone()
}

#[tokio::test]
async fn status_reports_running() {
    let app = build_router(test_state());
    let response = send(&app, get_request("/status", None)).await;

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"App is up and running");
}

#[tokio::test]
async fn register_login_me_logout_flow() {
    let app = build_router(test_state());
    let (token, user_id) = login(&app, "ada@example.com").await;

    let response = send(&app, get_request("/auth/me", Some(&token))).await;
    assert_eq!(response.status(), StatusCode::OK);
    let me = body_json(response).await;
    assert_eq!(me["id"], user_id.as_str());
    assert_eq!(me["role"], "USER");
    assert_eq!(me["isVerified"], false);
    assert!(me.get("passwordHash").is_none());

    let response = send(
        &app,
        json_request("POST", "/auth/logout", json!({}), Some(&token)),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let cleared = response.headers().get(SET_COOKIE).unwrap().to_str().unwrap();
    assert!(cleared.contains("Max-Age=0"));

    let response = send(&app, get_request("/auth/me", Some(&token))).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn login_cookie_carries_session_attributes() {
    let app = build_router(test_state());
    send(
        &app,
        json_request(
            "POST",
            "/auth/register",
            json!({ "name": "Ada", "email": "ada@example.com", "password": "pw" }),
            None,
        ),
    )
    .await;

    let response = send(
        &app,
        json_request(
            "POST",
            "/auth/login",
            json!({ "email": "ada@example.com", "password": "pw" }),
            None,
        ),
    )
    .await;
    let cookie = response.headers().get(SET_COOKIE).unwrap().to_str().unwrap();
    assert!(cookie.starts_with("sid="));
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("Path=/"));
    assert!(cookie.contains("Max-Age=86400"));
    assert!(!cookie.contains("Secure"));
}

#[tokio::test]
async fn register_rejects_missing_fields_and_duplicates() {
    let state = test_state();
    let app = build_router(state.clone());

    let response = send(
        &app,
        json_request("POST", "/auth/register", json!({ "email": "a@b.co" }), None),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "All fields are required");

    login(&app, "ada@example.com").await;
    let response = send(
        &app,
        json_request(
            "POST",
            "/auth/register",
            json!({ "name": "Other", "email": "ADA@example.com", "password": "x" }),
            None,
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let users: i64 = state.storage.with_connection(|conn| {
        conn.query_row("SELECT COUNT(*) FROM users;", [], |row| row.get(0))
            .unwrap()
    });
    assert_eq!(users, 1);
}

#[tokio::test]
async fn login_with_bad_credentials_is_unauthorized() {
    let app = build_router(test_state());
    login(&app, "ada@example.com").await;

    let response = send(
        &app,
        json_request(
            "POST",
            "/auth/login",
            json!({ "email": "ada@example.com", "password": "wrong" }),
            None,
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(response.headers().get(SET_COOKIE).is_none());

    let response = send(
        &app,
        json_request("POST", "/auth/login", json!({ "email": "" }), None),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn create_form_requires_session() {
    let app = build_router(test_state());
    let response = send(&app, json_request("POST", "/forms", sample_form(), None)).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["error"], "Unauthorized");
}

#[tokio::test]
async fn created_forms_are_listed_and_fetchable() {
    let app = build_router(test_state());
    let (token, _) = login(&app, "ada@example.com").await;
    let form = create_form(&app, &token).await;

    assert_eq!(form["title"], "Team pulse");
    assert_eq!(form["fields"].as_array().unwrap().len(), 2);
    assert_eq!(form["fields"][1]["type"], "dropdown");
    assert!(form["fields"][0]["id"].as_str().is_some());

    let response = send(&app, get_request("/forms", None)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let listed = body_json(response).await;
    assert_eq!(listed.as_array().unwrap().len(), 1);
    assert_eq!(listed[0]["id"], form["id"]);

    let uri = format!("/forms/{}", form["id"].as_str().unwrap());
    let response = send(&app, get_request(&uri, None)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, form);
}

#[tokio::test]
async fn create_form_rejects_invalid_input() {
    let app = build_router(test_state());
    let (token, _) = login(&app, "ada@example.com").await;

    let cases = [
        json!({ "title": "No fields" }),
        json!({ "fields": [] }),
        json!({ "title": "Bad", "fields": [{ "type": "radio", "label": "Pick" }] }),
        json!({ "title": "Bad", "fields": [{ "type": "signature", "label": "Sign" }] }),
    ];
    for body in cases {
        let response = send(&app, json_request("POST", "/forms", body, Some(&token))).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(body_json(response).await["error"].is_string());
    }

    let response = send(&app, get_request("/forms", None)).await;
    assert_eq!(body_json(response).await, json!([]));
}

#[tokio::test]
async fn unknown_form_is_not_found() {
    let app = build_router(test_state());
    for uri in [format!("/forms/{}", Uuid::new_v4()), "/forms/not-a-uuid".to_string()] {
        let response = send(&app, get_request(&uri, None)).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(response).await["error"], "Form not found");
    }
}

#[tokio::test]
async fn submissions_are_recorded_for_existing_forms() {
    let app = build_router(test_state());
    let (token, user_id) = login(&app, "ada@example.com").await;
    let form = create_form(&app, &token).await;
    let uri = format!("/forms/{}/submissions", form["id"].as_str().unwrap());

    let response = send(
        &app,
        json_request(
            "POST",
            &uri,
            json!({ "userId": user_id, "data": { "name": "Ada" } }),
            Some(&token),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let submission = body_json(response).await["submission"].clone();
    assert_eq!(submission["userId"], user_id.as_str());
    assert_eq!(submission["formId"], form["id"]);

    let response = send(&app, get_request(&uri, Some(&token))).await;
    assert_eq!(response.status(), StatusCode::OK);
    let listed = body_json(response).await;
    assert_eq!(listed.as_array().unwrap().len(), 1);
    assert_eq!(listed[0]["data"], json!({ "name": "Ada" }));
}

#[tokio::test]
async fn submission_to_missing_form_creates_nothing() {
    let state = test_state();
    let app = build_router(state.clone());
    let (token, _) = login(&app, "ada@example.com").await;

    let uri = format!("/forms/{}/submissions", Uuid::new_v4());
    let response = send(
        &app,
        json_request("POST", &uri, json!({ "data": { "q": 1 } }), Some(&token)),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let rows: i64 = state.storage.with_connection(|conn| {
        conn.query_row("SELECT COUNT(*) FROM submissions;", [], |row| row.get(0))
            .unwrap()
    });
    assert_eq!(rows, 0);
}

#[tokio::test]
async fn submission_for_another_user_is_forbidden() {
    let app = build_router(test_state());
    let (token, _) = login(&app, "ada@example.com").await;
    let form = create_form(&app, &token).await;
    let uri = format!("/forms/{}/submissions", form["id"].as_str().unwrap());

    let response = send(
        &app,
        json_request(
            "POST",
            &uri,
            json!({ "userId": Uuid::new_v4(), "data": {} }),
            Some(&token),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = send(
        &app,
        json_request("POST", &uri, json!({ "data": {} }), None),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn malformed_json_is_a_bad_request() {
    let app = build_router(test_state());
    let request = Request::builder()
        .method("POST")
        .uri("/auth/login")
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();

    let response = send(&app, request).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_json(response).await["error"].is_string());
}
