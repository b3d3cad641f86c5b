use std::sync::{Arc, Mutex};

use dashmap::DashMap;

use caseline_core::config_file::LlmConfig;
use caseline_core::llm::CompletionBackend;
use caseline_core::PdfTextBackend;
use caseline_storage::Store;

/// Shared application state accessible from all handlers.
pub struct AppState {
    pub store: Mutex<Store>,
    /// Bearer token -> user id.
    pub sessions: DashMap<String, i64>,
    /// Per-project processing locks so concurrent process requests for the
    /// same project are serialized instead of racing on the output row.
    pub processing_locks: DashMap<i64, Arc<tokio::sync::Mutex<()>>>,
    pub llm: Arc<dyn CompletionBackend>,
    pub pdf: Arc<dyn PdfTextBackend>,
    pub llm_cfg: LlmConfig,
}

impl AppState {
    /// Lock handle for one project, created on first use.
    pub fn project_lock(&self, project_id: i64) -> Arc<tokio::sync::Mutex<()>> {
        self.processing_locks
            .entry(project_id)
            .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
            .clone()
    }

    /// Issue a new session token for a user: 32 hex chars (128 random bits).
    pub fn create_session(&self, user_id: i64) -> String {
        let token = format!("{:016x}{:016x}", fastrand::u64(..), fastrand::u64(..));
        self.sessions.insert(token.clone(), user_id);
        token
    }
}
