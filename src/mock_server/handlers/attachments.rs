//! Attachment endpoint handlers.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use tokio::sync::RwLock;

use super::not_found;
use crate::mock_server::state::MockState;

/// PUT /rest/wikis/xwiki/spaces/data/pages/{id}/attachments/{file}
pub async fn put_attachment(
    State(state): State<Arc<RwLock<MockState>>>,
    Path((id, file)): Path<(String, String)>,
    body: Bytes,
) -> Response {
    let mut state = state.write().await;
    let Some(patient) = state.get_patient_mut(&id) else {
        return not_found(format!("Patient {id}"));
    };

    match patient.attachments.insert(file, body.to_vec()) {
        Some(_) => StatusCode::ACCEPTED.into_response(),
        None => StatusCode::CREATED.into_response(),
    }
}

/// DELETE /rest/wikis/xwiki/spaces/data/pages/{id}/attachments/{file}
pub async fn delete_attachment(
    State(state): State<Arc<RwLock<MockState>>>,
    Path((id, file)): Path<(String, String)>,
) -> Response {
    let mut state = state.write().await;
    let removed = state
        .get_patient_mut(&id)
        .and_then(|patient| patient.attachments.remove(&file));
    match removed {
        Some(_) => StatusCode::NO_CONTENT.into_response(),
        None => not_found(format!("Attachment {file} of {id}")),
    }
}

/// GET /bin/download/data/{id}/{file}
pub async fn download_attachment(
    State(state): State<Arc<RwLock<MockState>>>,
    Path((id, file)): Path<(String, String)>,
) -> Response {
    let state = state.read().await;
    match state
        .get_patient(&id)
        .and_then(|patient| patient.attachments.get(&file))
    {
        Some(contents) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "application/octet-stream")],
            contents.clone(),
        )
            .into_response(),
        None => not_found(format!("Attachment {file} of {id}")),
    }
}
