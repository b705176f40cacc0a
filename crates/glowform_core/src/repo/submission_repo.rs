//! Submission repository contracts and SQLite implementation.
//!
//! # Invariants
//! - Submissions are insert-only; there is no update path.
//! - Payloads are stored as JSON text and decoded on read.

use crate::model::form::FormId;
use crate::model::record::{Submission, SubmissionId};
use crate::repo::{ensure_connection_ready, parse_uuid, RepoError, RepoResult};
use rusqlite::{params, Connection, Row};

/// Repository interface for form submissions.
pub trait SubmissionRepository {
    fn create_submission(&self, submission: &Submission) -> RepoResult<SubmissionId>;
    /// Lists submissions of one form in creation order.
    fn list_submissions(&self, form_id: FormId) -> RepoResult<Vec<Submission>>;
}

/// SQLite-backed submission repository.
pub struct SqliteSubmissionRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteSubmissionRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(
            conn,
            "submissions",
            &["id", "form_id", "user_id", "data", "created_at"],
        )?;
        Ok(Self { conn })
    }
}

impl SubmissionRepository for SqliteSubmissionRepository<'_> {
    fn create_submission(&self, submission: &Submission) -> RepoResult<SubmissionId> {
        let data = serde_json::to_string(&submission.data)
            .map_err(|err| RepoError::InvalidData(format!("unserializable payload: {err}")))?;

        self.conn.execute(
            "INSERT INTO submissions (id, form_id, user_id, data, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                submission.id.to_string(),
                submission.form_id.to_string(),
                submission.user_id.to_string(),
                data,
                submission.created_at,
            ],
        )?;

        Ok(submission.id)
    }

    fn list_submissions(&self, form_id: FormId) -> RepoResult<Vec<Submission>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, form_id, user_id, data, created_at
             FROM submissions
             WHERE form_id = ?1
             ORDER BY created_at ASC, rowid ASC;",
        )?;
        let mut rows = stmt.query([form_id.to_string()])?;
        let mut submissions = Vec::new();
        while let Some(row) = rows.next()? {
            submissions.push(parse_submission_row(row)?);
        }
        Ok(submissions)
    }
}

fn parse_submission_row(row: &Row<'_>) -> RepoResult<Submission> {
    let id_text: String = row.get("id")?;
    let form_text: String = row.get("form_id")?;
    let user_text: String = row.get("user_id")?;
    let data_text: String = row.get("data")?;
    let data = serde_json::from_str(&data_text).map_err(|err| {
        RepoError::InvalidData(format!("invalid json in submissions.data: {err}"))
    })?;

    Ok(Submission {
        id: parse_uuid(&id_text, "submissions.id")?,
        form_id: parse_uuid(&form_text, "submissions.form_id")?,
        user_id: parse_uuid(&user_text, "submissions.user_id")?,
        data,
        created_at: row.get("created_at")?,
    })
}
