use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use glowform_core::{Field, FormId, NewForm, StoredForm, Submission};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::{
    error::{ApiError, ApiResult},
    session::AuthUser,
    state::SharedState,
};

#[derive(Deserialize)]
pub struct CreateFormRequest {
    #[serde(default, alias = "formName")]
    title: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    fields: Option<Vec<Field>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSubmissionRequest {
    #[serde(default)]
    user_id: Option<Uuid>,
    #[serde(default)]
    data: Value,
}

/// Unparseable ids cannot name a stored form.
fn parse_form_id(raw: &str) -> ApiResult<FormId> {
    Uuid::parse_str(raw).map_err(|_| ApiError::form_not_found())
}

pub async fn create_form_handler(
    State(state): State<SharedState>,
    _auth: AuthUser,
    payload: Result<Json<CreateFormRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(payload) = payload?;
    let (Some(title), Some(fields)) = (payload.title, payload.fields) else {
        return Err(ApiError::BadRequest("Invalid input data".to_string()));
    };

    let request = NewForm {
        title,
        description: payload.description.unwrap_or_default(),
        fields,
    };
    let form: StoredForm = state
        .storage
        .forms(|service| Ok(service.create_form(request)?))?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Form created successfully", "form": form })),
    ))
}

pub async fn list_forms_handler(State(state): State<SharedState>) -> ApiResult<Json<Vec<StoredForm>>> {
    let forms = state.storage.forms(|service| Ok(service.list_forms()?))?;
    Ok(Json(forms))
}

pub async fn get_form_handler(
    State(state): State<SharedState>,
    Path(form_id): Path<String>,
) -> ApiResult<Json<StoredForm>> {
    let form_id = parse_form_id(&form_id)?;
    let form = state
        .storage
        .forms(|service| Ok(service.get_form(form_id)?))?;
    Ok(Json(form))
}

pub async fn create_submission_handler(
    State(state): State<SharedState>,
    auth: AuthUser,
    Path(form_id): Path<String>,
    payload: Result<Json<CreateSubmissionRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let form_id = parse_form_id(&form_id)?;
    let Json(payload) = payload?;
    if payload.user_id.is_some_and(|user_id| user_id != auth.user.id) {
        return Err(ApiError::Forbidden(
            "Cannot submit on behalf of another user".to_string(),
        ));
    }

    let user_id = auth.user.id;
    let submission: Submission = state.storage.forms(|service| {
        Ok(service.create_submission(form_id, user_id, payload.data)?)
    })?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Submission recorded successfully", "submission": submission })),
    ))
}

pub async fn list_submissions_handler(
    State(state): State<SharedState>,
    _auth: AuthUser,
    Path(form_id): Path<String>,
) -> ApiResult<Json<Vec<Submission>>> {
    let form_id = parse_form_id(&form_id)?;
    let submissions = state
        .storage
        .forms(|service| Ok(service.list_submissions(form_id)?))?;
    Ok(Json(submissions))
}
