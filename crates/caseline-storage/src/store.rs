//! Record-level operations over the caseline database.

use std::path::Path;

use rusqlite::{Connection, OptionalExtension, params};
use sha2::{Digest, Sha256};

use crate::{StorageError, schema};

/// Kind of an uploaded document within a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Outline,
    Supporting,
}

impl DocumentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentKind::Outline => "outline",
            DocumentKind::Supporting => "supporting",
        }
    }
}

#[derive(Debug, Clone)]
pub struct UserRecord {
    pub id: i64,
    pub username: String,
    pub email: String,
}

#[derive(Debug, Clone)]
pub struct ProjectRecord {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub created_at: String,
    pub archived: bool,
}

#[derive(Debug, Clone)]
pub struct DocumentRecord {
    pub id: i64,
    pub project_id: i64,
    pub filename: String,
    pub file_type: String,
    pub created_at: String,
}

#[derive(Debug, Clone)]
pub struct OutputRecord {
    pub project_id: i64,
    pub timeline_content: String,
    pub narrative_content: String,
    pub created_at: String,
}

/// Connection wrapper owning all record and object operations.
pub struct Store {
    pub(crate) conn: Connection,
}

impl Store {
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        let conn = Connection::open(path)?;
        schema::init_database(&conn)?;
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()?;
        schema::init_database(&conn)?;
        Ok(Self { conn })
    }

    // ── Users ───────────────────────────────────────────────────────────

    /// Create a user with a salted password hash. Duplicate username or
    /// email is reported as [`StorageError::Conflict`].
    pub fn create_user(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<i64, StorageError> {
        let salt = generate_salt();
        let hash = hash_password(&salt, password);
        let result = self.conn.execute(
            "INSERT INTO users (username, email, password_hash, salt) VALUES (?1, ?2, ?3, ?4)",
            params![username, email, hash, salt],
        );
        match result {
            Ok(_) => Ok(self.conn.last_insert_rowid()),
            Err(e) if is_unique_violation(&e) => Err(StorageError::Conflict("user".to_string())),
            Err(e) => Err(e.into()),
        }
    }

    /// Check a username/password pair, returning the user on success.
    pub fn verify_user(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<UserRecord>, StorageError> {
        let row = self
            .conn
            .query_row(
                "SELECT id, username, email, password_hash, salt FROM users WHERE username = ?1",
                params![username],
                |row| {
                    Ok((
                        UserRecord {
                            id: row.get(0)?,
                            username: row.get(1)?,
                            email: row.get(2)?,
                        },
                        row.get::<_, String>(3)?,
                        row.get::<_, String>(4)?,
                    ))
                },
            )
            .optional()?;

        Ok(row.and_then(|(user, stored_hash, salt)| {
            if hash_password(&salt, password) == stored_hash {
                Some(user)
            } else {
                None
            }
        }))
    }

    // ── Projects ────────────────────────────────────────────────────────

    pub fn create_project(&self, user_id: i64, name: &str) -> Result<i64, StorageError> {
        self.conn.execute(
            "INSERT INTO projects (user_id, name) VALUES (?1, ?2)",
            params![user_id, name],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn list_projects(&self, user_id: i64) -> Result<Vec<ProjectRecord>, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, user_id, name, created_at, archived FROM projects
             WHERE user_id = ?1 ORDER BY created_at DESC, id DESC",
        )?;
        let rows = stmt
            .query_map(params![user_id], project_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Fetch a project only if it belongs to `user_id`.
    pub fn get_project(
        &self,
        user_id: i64,
        project_id: i64,
    ) -> Result<Option<ProjectRecord>, StorageError> {
        let row = self
            .conn
            .query_row(
                "SELECT id, user_id, name, created_at, archived FROM projects
                 WHERE id = ?1 AND user_id = ?2",
                params![project_id, user_id],
                project_from_row,
            )
            .optional()?;
        Ok(row)
    }

    pub fn archive_project(&self, user_id: i64, project_id: i64) -> Result<bool, StorageError> {
        let n = self.conn.execute(
            "UPDATE projects SET archived = 1 WHERE id = ?1 AND user_id = ?2",
            params![project_id, user_id],
        )?;
        Ok(n > 0)
    }

    /// Delete a project with its documents, output, and stored objects.
    pub fn delete_project(&self, user_id: i64, project_id: i64) -> Result<bool, StorageError> {
        let prefix = crate::project_key_prefix(user_id, project_id);
        self.delete_objects_with_prefix(&prefix)?;
        let n = self.conn.execute(
            "DELETE FROM projects WHERE id = ?1 AND user_id = ?2",
            params![project_id, user_id],
        )?;
        Ok(n > 0)
    }

    // ── Documents ───────────────────────────────────────────────────────

    /// Record an uploaded document. A project has at most one outline:
    /// uploading a new one replaces the previous outline row.
    pub fn add_document(
        &self,
        project_id: i64,
        filename: &str,
        kind: DocumentKind,
    ) -> Result<i64, StorageError> {
        if kind == DocumentKind::Outline {
            self.conn.execute(
                "DELETE FROM documents WHERE project_id = ?1 AND file_type = 'outline'",
                params![project_id],
            )?;
        }
        self.conn.execute(
            "INSERT INTO documents (project_id, filename, file_type) VALUES (?1, ?2, ?3)",
            params![project_id, filename, kind.as_str()],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Store an outline upload: the bytes go to the object store and the
    /// document row replaces any previous outline. The superseded
    /// outline's blob is deleted so replacement leaves no orphan object.
    pub fn replace_outline(
        &self,
        user_id: i64,
        project_id: i64,
        filename: &str,
        data: &[u8],
    ) -> Result<i64, StorageError> {
        if let Some(old) = self.outline_document(project_id)? {
            if old.filename != filename {
                self.delete_object(&crate::object_key(user_id, project_id, &old.filename))?;
            }
        }
        self.put_object(&crate::object_key(user_id, project_id, filename), data)?;
        self.add_document(project_id, filename, DocumentKind::Outline)
    }

    pub fn list_documents(&self, project_id: i64) -> Result<Vec<DocumentRecord>, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, project_id, filename, file_type, created_at FROM documents
             WHERE project_id = ?1 ORDER BY id",
        )?;
        let rows = stmt
            .query_map(params![project_id], document_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn outline_document(
        &self,
        project_id: i64,
    ) -> Result<Option<DocumentRecord>, StorageError> {
        let row = self
            .conn
            .query_row(
                "SELECT id, project_id, filename, file_type, created_at FROM documents
                 WHERE project_id = ?1 AND file_type = 'outline'",
                params![project_id],
                document_from_row,
            )
            .optional()?;
        Ok(row)
    }

    pub fn supporting_documents(
        &self,
        project_id: i64,
    ) -> Result<Vec<DocumentRecord>, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, project_id, filename, file_type, created_at FROM documents
             WHERE project_id = ?1 AND file_type = 'supporting' ORDER BY id",
        )?;
        let rows = stmt
            .query_map(params![project_id], document_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    // ── Outputs ─────────────────────────────────────────────────────────

    /// Store a processing run's output, replacing any previous output for
    /// the project. Last write wins across distinct runs.
    pub fn save_output(
        &self,
        project_id: i64,
        timeline: &str,
        narrative: &str,
    ) -> Result<(), StorageError> {
        self.conn.execute(
            "INSERT INTO outputs (project_id, timeline_content, narrative_content, created_at)
             VALUES (?1, ?2, ?3, datetime('now'))
             ON CONFLICT(project_id) DO UPDATE SET
                 timeline_content = excluded.timeline_content,
                 narrative_content = excluded.narrative_content,
                 created_at = excluded.created_at",
            params![project_id, timeline, narrative],
        )?;
        Ok(())
    }

    pub fn get_output(&self, project_id: i64) -> Result<Option<OutputRecord>, StorageError> {
        let row = self
            .conn
            .query_row(
                "SELECT project_id, timeline_content, narrative_content, created_at
                 FROM outputs WHERE project_id = ?1",
                params![project_id],
                |row| {
                    Ok(OutputRecord {
                        project_id: row.get(0)?,
                        timeline_content: row.get(1)?,
                        narrative_content: row.get(2)?,
                        created_at: row.get(3)?,
                    })
                },
            )
            .optional()?;
        Ok(row)
    }
}

fn project_from_row(row: &rusqlite::Row<'_>) -> Result<ProjectRecord, rusqlite::Error> {
    Ok(ProjectRecord {
        id: row.get(0)?,
        user_id: row.get(1)?,
        name: row.get(2)?,
        created_at: row.get(3)?,
        archived: row.get::<_, i64>(4)? != 0,
    })
}

fn document_from_row(row: &rusqlite::Row<'_>) -> Result<DocumentRecord, rusqlite::Error> {
    Ok(DocumentRecord {
        id: row.get(0)?,
        project_id: row.get(1)?,
        filename: row.get(2)?,
        file_type: row.get(3)?,
        created_at: row.get(4)?,
    })
}

fn generate_salt() -> String {
    let mut bytes = [0u8; 16];
    fastrand::fill(&mut bytes);
    hex::encode(bytes)
}

fn hash_password(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

fn is_unique_violation(e: &rusqlite::Error) -> bool {
    matches!(
        e,
        rusqlite::Error::SqliteFailure(err, _)
            if err.code == rusqlite::ErrorCode::ConstraintViolation
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> Store {
        Store::open_in_memory().unwrap()
    }

    #[test]
    fn user_roundtrip_and_bad_password() {
        let s = store();
        let id = s.create_user("alice", "alice@example.com", "hunter2").unwrap();

        let user = s.verify_user("alice", "hunter2").unwrap().unwrap();
        assert_eq!(user.id, id);
        assert!(s.verify_user("alice", "wrong").unwrap().is_none());
        assert!(s.verify_user("nobody", "hunter2").unwrap().is_none());
    }

    #[test]
    fn duplicate_username_is_a_conflict() {
        let s = store();
        s.create_user("alice", "a@example.com", "pw").unwrap();
        let err = s.create_user("alice", "b@example.com", "pw").unwrap_err();
        assert!(matches!(err, StorageError::Conflict(_)));
    }

    #[test]
    fn projects_are_scoped_to_their_owner() {
        let s = store();
        let alice = s.create_user("alice", "a@example.com", "pw").unwrap();
        let bob = s.create_user("bob", "b@example.com", "pw").unwrap();
        let project = s.create_project(alice, "Smith v. Jones").unwrap();

        assert!(s.get_project(alice, project).unwrap().is_some());
        assert!(s.get_project(bob, project).unwrap().is_none());
        assert_eq!(s.list_projects(bob).unwrap().len(), 0);
    }

    #[test]
    fn outline_upload_replaces_previous_outline() {
        let s = store();
        let user = s.create_user("alice", "a@example.com", "pw").unwrap();
        let project = s.create_project(user, "case").unwrap();

        s.add_document(project, "v1.txt", DocumentKind::Outline).unwrap();
        s.add_document(project, "v2.txt", DocumentKind::Outline).unwrap();
        s.add_document(project, "exhibit.pdf", DocumentKind::Supporting)
            .unwrap();

        let outline = s.outline_document(project).unwrap().unwrap();
        assert_eq!(outline.filename, "v2.txt");
        assert_eq!(s.list_documents(project).unwrap().len(), 2);
        assert_eq!(s.supporting_documents(project).unwrap().len(), 1);
    }

    #[test]
    fn replacing_an_outline_deletes_the_superseded_blob() {
        let s = store();
        let user = s.create_user("alice", "a@example.com", "pw").unwrap();
        let project = s.create_project(user, "case").unwrap();

        s.replace_outline(user, project, "v1.txt", b"first").unwrap();
        s.replace_outline(user, project, "v2.txt", b"second").unwrap();

        let v1_key = crate::object_key(user, project, "v1.txt");
        let v2_key = crate::object_key(user, project, "v2.txt");
        assert!(s.get_object(&v1_key).unwrap().is_none());
        assert_eq!(s.get_object(&v2_key).unwrap().unwrap(), b"second");
        assert_eq!(s.outline_document(project).unwrap().unwrap().filename, "v2.txt");

        // Same filename: the blob is overwritten, not deleted.
        s.replace_outline(user, project, "v2.txt", b"amended").unwrap();
        assert_eq!(s.get_object(&v2_key).unwrap().unwrap(), b"amended");
    }

    #[test]
    fn output_upsert_keeps_one_row_per_project() {
        let s = store();
        let user = s.create_user("alice", "a@example.com", "pw").unwrap();
        let project = s.create_project(user, "case").unwrap();

        assert!(s.get_output(project).unwrap().is_none());
        s.save_output(project, "timeline v1", "narrative v1").unwrap();
        s.save_output(project, "timeline v2", "narrative v2").unwrap();

        let output = s.get_output(project).unwrap().unwrap();
        assert_eq!(output.timeline_content, "timeline v2");
        assert_eq!(output.narrative_content, "narrative v2");

        let count: i64 = s
            .conn
            .query_row(
                "SELECT COUNT(*) FROM outputs WHERE project_id = ?1",
                params![project],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn delete_project_removes_rows_and_objects() {
        let s = store();
        let user = s.create_user("alice", "a@example.com", "pw").unwrap();
        let project = s.create_project(user, "case").unwrap();
        s.add_document(project, "brief.pdf", DocumentKind::Supporting)
            .unwrap();
        s.save_output(project, "t", "n").unwrap();
        let key = crate::object_key(user, project, "brief.pdf");
        s.put_object(&key, b"bytes").unwrap();

        assert!(s.delete_project(user, project).unwrap());
        assert!(s.get_project(user, project).unwrap().is_none());
        assert!(s.get_output(project).unwrap().is_none());
        assert_eq!(s.list_documents(project).unwrap().len(), 0);
        assert!(s.get_object(&key).unwrap().is_none());
    }

    #[test]
    fn opens_on_disk_database() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("caseline.db");
        {
            let s = Store::open(&path).unwrap();
            s.create_user("alice", "a@example.com", "pw").unwrap();
        }
        let s = Store::open(&path).unwrap();
        assert!(s.verify_user("alice", "pw").unwrap().is_some());
    }
}
