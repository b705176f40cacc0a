use glowform_core::db::open_db_in_memory;
use glowform_core::repo::form_repo::SqliteFormRepository;
use glowform_core::repo::session_repo::SqliteSessionRepository;
use glowform_core::repo::submission_repo::SqliteSubmissionRepository;
use glowform_core::repo::user_repo::SqliteUserRepository;
use glowform_core::{
    AuthService, Field, FieldType, FormService, FormServiceError, FormValidationError, NewForm,
};
use rusqlite::Connection;
use serde_json::{json, Value};
use uuid::Uuid;

fn form_service(
    conn: &Connection,
) -> FormService<SqliteFormRepository<'_>, SqliteSubmissionRepository<'_>> {
    FormService::new(
        SqliteFormRepository::try_new(conn).unwrap(),
        SqliteSubmissionRepository::try_new(conn).unwrap(),
    )
}

fn register_user(conn: &Connection) -> Uuid {
    let auth = AuthService::new(
        SqliteUserRepository::try_new(conn).unwrap(),
        SqliteSessionRepository::try_new(conn).unwrap(),
    );
    auth.register("Ada", "ada@example.com", "pw").unwrap().id
}

fn new_form(title: &str) -> NewForm {
    NewForm {
        title: title.to_string(),
        description: String::new(),
        fields: vec![
            Field::with_id(Uuid::nil(), FieldType::Text, "Name").required(),
            Field::with_id(Uuid::nil(), FieldType::Radio, "Happy?").with_options(["Yes", "No"]),
        ],
    }
}

fn count_rows(conn: &Connection, table: &str) -> i64 {
    conn.query_row(&format!("SELECT COUNT(*) FROM {table};"), [], |row| {
        row.get(0)
    })
    .unwrap()
}

#[test]
fn create_form_assigns_ids_and_reads_back() {
    let conn = open_db_in_memory().unwrap();
    let service = form_service(&conn);

    let created = service.create_form(new_form("  Team survey ")).unwrap();
    assert_eq!(created.title, "Team survey");
    assert_eq!(created.fields.len(), 2);
    assert!(created.fields.iter().all(|field| !field.id.is_nil()));

    let fetched = service.get_form(created.id).unwrap();
    assert_eq!(fetched, created);
}

#[test]
fn create_form_stores_only_sub_fields_the_type_uses() {
    let conn = open_db_in_memory().unwrap();
    let service = form_service(&conn);

    let field: Field = serde_json::from_value(json!({
        "type": "text",
        "label": "Q",
        "options": ["a", "b"],
        "likertScale": 7
    }))
    .unwrap();
    let created = service
        .create_form(NewForm {
            title: "Stray options".to_string(),
            description: String::new(),
            fields: vec![field],
        })
        .unwrap();
    assert!(created.fields[0].options.is_none());
    assert!(created.fields[0].likert_scale.is_none());

    let raw: String = conn
        .query_row(
            "SELECT fields FROM forms WHERE id = ?1;",
            [created.id.to_string()],
            |row| row.get(0),
        )
        .unwrap();
    let stored: Value = serde_json::from_str(&raw).unwrap();
    assert!(stored[0].get("options").is_none());
    assert!(stored[0].get("likertScale").is_none());
}

#[test]
fn create_form_rejects_blank_title_and_invalid_fields() {
    let conn = open_db_in_memory().unwrap();
    let service = form_service(&conn);

    let err = service.create_form(new_form("   ")).unwrap_err();
    assert!(matches!(err, FormServiceError::InvalidInput(_)));

    let mut invalid = new_form("Broken");
    invalid
        .fields
        .push(Field::with_id(Uuid::nil(), FieldType::Dropdown, "Pick"));
    let err = service.create_form(invalid).unwrap_err();
    assert!(matches!(
        err,
        FormServiceError::Validation(FormValidationError::Field { .. })
    ));
    assert_eq!(count_rows(&conn, "forms"), 0);
}

#[test]
fn list_forms_returns_creation_order() {
    let conn = open_db_in_memory().unwrap();
    let service = form_service(&conn);

    let first = service.create_form(new_form("First")).unwrap();
    let second = service.create_form(new_form("Second")).unwrap();

    let listed = service.list_forms().unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].id, first.id);
    assert_eq!(listed[1].id, second.id);
}

#[test]
fn get_unknown_form_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    let service = form_service(&conn);
    let id = Uuid::new_v4();

    let err = service.get_form(id).unwrap_err();
    assert!(matches!(err, FormServiceError::FormNotFound(missing) if missing == id));
}

#[test]
fn submission_is_stored_for_existing_form() {
    let conn = open_db_in_memory().unwrap();
    let user_id = register_user(&conn);
    let service = form_service(&conn);
    let form = service.create_form(new_form("Survey")).unwrap();

    let answers = json!({ form.fields[0].id.to_string(): "Ada" });
    let submission = service
        .create_submission(form.id, user_id, answers.clone())
        .unwrap();
    assert_eq!(submission.form_id, form.id);
    assert_eq!(submission.user_id, user_id);

    let listed = service.list_submissions(form.id).unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].data, answers);
}

#[test]
fn submission_to_missing_form_creates_no_row() {
    let conn = open_db_in_memory().unwrap();
    let user_id = register_user(&conn);
    let service = form_service(&conn);
    let missing = Uuid::new_v4();

    let err = service
        .create_submission(missing, user_id, json!({ "q": "a" }))
        .unwrap_err();
    assert!(matches!(err, FormServiceError::FormNotFound(id) if id == missing));
    assert_eq!(count_rows(&conn, "submissions"), 0);
}

#[test]
fn submission_without_data_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let user_id = register_user(&conn);
    let service = form_service(&conn);
    let form = service.create_form(new_form("Survey")).unwrap();

    let err = service
        .create_submission(form.id, user_id, Value::Null)
        .unwrap_err();
    assert!(matches!(err, FormServiceError::InvalidInput(_)));
    assert_eq!(count_rows(&conn, "submissions"), 0);
}

#[test]
fn corrupted_fields_column_is_reported() {
    let conn = open_db_in_memory().unwrap();
    let service = form_service(&conn);
    let form = service.create_form(new_form("Survey")).unwrap();

    conn.execute(
        "UPDATE forms SET fields = 'not json' WHERE id = ?1;",
        [form.id.to_string()],
    )
    .unwrap();

    let err = service.get_form(form.id).unwrap_err();
    assert!(matches!(err, FormServiceError::Repo(_)));
}
