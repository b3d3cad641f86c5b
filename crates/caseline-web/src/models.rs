//! Request and response DTOs for the JSON API.

use serde::{Deserialize, Serialize};

use caseline_storage::{DocumentRecord, ProjectRecord};

// ── Auth ────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct TokenResponse {
    pub token: String,
}

// ── Projects ────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct CreateProjectRequest {
    pub name: String,
}

#[derive(Serialize)]
pub struct ProjectJson {
    pub id: i64,
    pub name: String,
    pub created_at: String,
    pub archived: bool,
}

impl From<&ProjectRecord> for ProjectJson {
    fn from(p: &ProjectRecord) -> Self {
        ProjectJson {
            id: p.id,
            name: p.name.clone(),
            created_at: p.created_at.clone(),
            archived: p.archived,
        }
    }
}

#[derive(Serialize)]
pub struct DocumentJson {
    pub id: i64,
    pub filename: String,
    pub file_type: String,
    pub created_at: String,
}

impl From<&DocumentRecord> for DocumentJson {
    fn from(d: &DocumentRecord) -> Self {
        DocumentJson {
            id: d.id,
            filename: d.filename.clone(),
            file_type: d.file_type.clone(),
            created_at: d.created_at.clone(),
        }
    }
}

#[derive(Serialize)]
pub struct ProjectDetailJson {
    #[serde(flatten)]
    pub project: ProjectJson,
    pub documents: Vec<DocumentJson>,
    pub has_output: bool,
}

// ── Upload / processing ─────────────────────────────────────────────────

#[derive(Serialize)]
pub struct UploadResponse {
    pub saved: Vec<String>,
}

#[derive(Serialize)]
pub struct ProcessResponse {
    pub timeline: String,
    pub narrative: String,
    /// Filenames whose summarization failed; the narrative was built with
    /// placeholder content for these.
    pub document_failures: Vec<String>,
    /// True when the final narrative call failed and the stored narrative
    /// is the placeholder text.
    pub narrative_degraded: bool,
}

#[derive(Serialize)]
pub struct ErrorJson {
    pub error: String,
}
