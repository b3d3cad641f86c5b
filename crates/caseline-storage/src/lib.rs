use thiserror::Error;

pub mod objects;
pub mod schema;
pub mod store;

pub use store::{DocumentKind, DocumentRecord, OutputRecord, ProjectRecord, Store, UserRecord};

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("{0} already exists")]
    Conflict(String),
}

/// Storage key for an uploaded file, scoped by owner and project.
pub fn object_key(user_id: i64, project_id: i64, filename: &str) -> String {
    format!("user_{user_id}/project_{project_id}/{filename}")
}

/// Key prefix covering every object belonging to one project.
pub fn project_key_prefix(user_id: i64, project_id: i64) -> String {
    format!("user_{user_id}/project_{project_id}/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_keys_are_scoped_per_user_and_project() {
        assert_eq!(object_key(3, 7, "brief.pdf"), "user_3/project_7/brief.pdf");
        assert!(object_key(3, 7, "brief.pdf").starts_with(&project_key_prefix(3, 7)));
        assert!(!object_key(3, 8, "brief.pdf").starts_with(&project_key_prefix(3, 7)));
    }
}
