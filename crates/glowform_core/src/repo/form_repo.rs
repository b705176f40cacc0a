//! Form repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist full form definitions (fields as one JSON column).
//! - List forms in creation order without pagination.
//!
//! # Invariants
//! - Writes validate the whole field list before SQL mutations.
//! - Reads reject invalid persisted JSON instead of masking it.

use crate::model::field::Field;
use crate::model::form::FormId;
use crate::model::record::StoredForm;
use crate::repo::{ensure_connection_ready, parse_uuid, RepoError, RepoResult};
use rusqlite::{params, Connection, OptionalExtension, Row};

const FORM_SELECT_SQL: &str = "SELECT
    id,
    title,
    description,
    fields,
    created_at
FROM forms";

/// Repository interface for stored forms.
pub trait FormRepository {
    fn create_form(&self, form: &StoredForm) -> RepoResult<FormId>;
    fn get_form(&self, id: FormId) -> RepoResult<Option<StoredForm>>;
    fn list_forms(&self) -> RepoResult<Vec<StoredForm>>;
    fn form_exists(&self, id: FormId) -> RepoResult<bool>;
}

/// SQLite-backed form repository.
pub struct SqliteFormRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteFormRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(
            conn,
            "forms",
            &["id", "title", "description", "fields", "created_at"],
        )?;
        Ok(Self { conn })
    }
}

impl FormRepository for SqliteFormRepository<'_> {
    fn create_form(&self, form: &StoredForm) -> RepoResult<FormId> {
        form.to_config().validate()?;
        let fields = serde_json::to_string(&form.fields)
            .map_err(|err| RepoError::InvalidData(format!("unserializable fields: {err}")))?;

        self.conn.execute(
            "INSERT INTO forms (id, title, description, fields, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                form.id.to_string(),
                form.title.as_str(),
                form.description.as_str(),
                fields,
                form.created_at,
            ],
        )?;

        Ok(form.id)
    }

    fn get_form(&self, id: FormId) -> RepoResult<Option<StoredForm>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{FORM_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_form_row(row)?));
        }
        Ok(None)
    }

    fn list_forms(&self) -> RepoResult<Vec<StoredForm>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{FORM_SELECT_SQL} ORDER BY created_at ASC, rowid ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut forms = Vec::new();
        while let Some(row) = rows.next()? {
            forms.push(parse_form_row(row)?);
        }
        Ok(forms)
    }

    fn form_exists(&self, id: FormId) -> RepoResult<bool> {
        let found = self
            .conn
            .query_row(
                "SELECT 1 FROM forms WHERE id = ?1;",
                [id.to_string()],
                |row| row.get::<_, i64>(0),
            )
            .optional()?;
        Ok(found.is_some())
    }
}

fn parse_form_row(row: &Row<'_>) -> RepoResult<StoredForm> {
    let id_text: String = row.get("id")?;
    let id = parse_uuid(&id_text, "forms.id")?;

    let fields_text: String = row.get("fields")?;
    let fields: Vec<Field> = serde_json::from_str(&fields_text).map_err(|err| {
        RepoError::InvalidData(format!("invalid fields json for form {id}: {err}"))
    })?;

    Ok(StoredForm {
        id,
        title: row.get("title")?,
        description: row.get("description")?,
        fields,
        created_at: row.get("created_at")?,
    })
}

