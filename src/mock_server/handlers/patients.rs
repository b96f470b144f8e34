//! Patient endpoint handlers.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{Html, IntoResponse, Response},
    Json,
};
use base64::Engine;
use tokio::sync::RwLock;

use super::{alternatives_xml, not_found, xml_response};
use crate::cli::DEFAULT_USERNAME;
use crate::mock_server::state::MockState;

/// User name and password from a Basic `Authorization` header.
pub(crate) fn basic_auth_credentials(headers: &HeaderMap) -> Option<(String, String)> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let encoded = value.strip_prefix("Basic ")?;
    let decoded = base64::engine::general_purpose::STANDARD
        .decode(encoded)
        .ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (user, password) = decoded.split_once(':')?;
    Some((user.to_string(), password.to_string()))
}

/// POST /rest/patients
pub async fn create_patient(
    State(state): State<Arc<RwLock<MockState>>>,
    headers: HeaderMap,
) -> Response {
    let owner = basic_auth_credentials(&headers)
        .map(|(user, _)| user)
        .unwrap_or_else(|| DEFAULT_USERNAME.to_string());

    let mut state = state.write().await;
    let id = state.create_patient(&owner);

    (
        StatusCode::CREATED,
        [(header::LOCATION, format!("/rest/patients/{id}"))],
    )
        .into_response()
}

/// DELETE /rest/patients/{id}
pub async fn delete_patient(
    State(state): State<Arc<RwLock<MockState>>>,
    Path(id): Path<String>,
) -> Response {
    let mut state = state.write().await;
    match state.patients.remove(&id) {
        Some(_) => StatusCode::NO_CONTENT.into_response(),
        None => not_found(format!("Patient {id}")),
    }
}

/// GET /rest/patients/eid/{eid}
///
/// A unique match is answered in JSON, several matches with an XML list of
/// alternatives.
pub async fn get_patient_by_external_id(
    State(state): State<Arc<RwLock<MockState>>>,
    Path(eid): Path<String>,
) -> Response {
    let state = state.read().await;
    let ids = state.find_external_id(&eid);
    match ids.as_slice() {
        [] => not_found(format!("External ID {eid}")),
        [id] => (StatusCode::OK, Json(serde_json::json!({ "id": id }))).into_response(),
        _ => xml_response(StatusCode::MULTIPLE_CHOICES, alternatives_xml(&eid, &ids)),
    }
}

/// GET /bin/edit/data/{id}
pub async fn edit_patient(
    State(state): State<Arc<RwLock<MockState>>>,
    Path(id): Path<String>,
) -> Response {
    let mut state = state.write().await;
    match state.get_patient_mut(&id) {
        Some(patient) => {
            patient.edited = true;
            Html(format!("<html><body>Editing {id}</body></html>")).into_response()
        }
        None => not_found(format!("Patient {id}")),
    }
}
