use std::sync::Arc;

use axum::Json;
use axum::extract::{Multipart, Path, State};

use caseline_core::narrative::NARRATIVE_FAILED_SENTINEL;
use caseline_core::pipeline::{PipelineError, RawDocument, process_project};
use caseline_core::timeline::{decode_outline, format_timeline};
use caseline_storage::{DocumentKind, object_key};

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::models::{ProcessResponse, UploadResponse};
use crate::state::AppState;
use crate::upload;

pub async fn upload(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(project_id): Path<i64>,
    multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    let fields = upload::parse_multipart(multipart)
        .await
        .map_err(ApiError::bad_request)?;

    let store = state.store.lock().unwrap();
    store
        .get_project(user.user_id, project_id)?
        .ok_or_else(|| ApiError::not_found("project not found"))?;

    let mut saved = Vec::new();

    if let Some(outline) = &fields.outline {
        store.replace_outline(user.user_id, project_id, &outline.filename, &outline.data)?;
        saved.push(outline.filename.clone());
    }

    for doc in &fields.supporting {
        let key = object_key(user.user_id, project_id, &doc.filename);
        store.put_object(&key, &doc.data)?;
        store.add_document(project_id, &doc.filename, DocumentKind::Supporting)?;
        saved.push(doc.filename.clone());
    }

    tracing::info!(project_id, count = saved.len(), "files uploaded");
    Ok(Json(UploadResponse { saved }))
}

pub async fn process(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(project_id): Path<i64>,
) -> Result<Json<ProcessResponse>, ApiError> {
    // Serialize processing per project: a project has at most one current
    // output, and two concurrent runs must not interleave their writes.
    let lock = state.project_lock(project_id);
    let _guard = lock.lock().await;

    // Load everything the run needs while holding the store lock, then
    // release it for the duration of the remote calls.
    let (outline_bytes, documents) = {
        let store = state.store.lock().unwrap();
        store
            .get_project(user.user_id, project_id)?
            .ok_or_else(|| ApiError::not_found("project not found"))?;

        let outline = store
            .outline_document(project_id)?
            .ok_or_else(|| ApiError::bad_request("no outline uploaded for this project"))?;
        let outline_bytes = store
            .get_object(&object_key(user.user_id, project_id, &outline.filename))?
            .ok_or_else(|| ApiError::bad_request("outline file is missing from storage"))?;

        let mut documents = Vec::new();
        for doc in store.supporting_documents(project_id)? {
            match store.get_object(&object_key(user.user_id, project_id, &doc.filename))? {
                Some(data) => documents.push(RawDocument {
                    filename: doc.filename,
                    data,
                }),
                None => {
                    tracing::warn!(filename = %doc.filename, "stored object missing, skipping");
                }
            }
        }
        (outline_bytes, documents)
    };

    let result = process_project(
        state.llm.as_ref(),
        state.pdf.as_ref(),
        &state.llm_cfg,
        &outline_bytes,
        &documents,
    )
    .await;

    let (timeline, narrative, document_failures, narrative_degraded) = match result {
        Ok(output) => (
            output.timeline,
            output.narrative,
            output.document_failures,
            false,
        ),
        Err(PipelineError::Outline(e)) => {
            return Err(ApiError::bad_request(format!("invalid outline: {e}")));
        }
        // The final narrative call failed: keep the run's timeline (it is
        // deterministic, so recompute it) and store the placeholder so the
        // project still has a current output.
        Err(PipelineError::Narrative(e)) => {
            tracing::error!(project_id, error = %e, "narrative generation failed");
            let timeline = decode_outline(&outline_bytes)
                .map(format_timeline)
                .map_err(|e| ApiError::bad_request(format!("invalid outline: {e}")))?;
            (timeline, NARRATIVE_FAILED_SENTINEL.to_string(), Vec::new(), true)
        }
    };

    {
        let store = state.store.lock().unwrap();
        store.save_output(project_id, &timeline, &narrative)?;
    }
    tracing::info!(project_id, degraded = narrative_degraded, "processing run stored");

    Ok(Json(ProcessResponse {
        timeline,
        narrative,
        document_failures,
        narrative_degraded,
    }))
}
