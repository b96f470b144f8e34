//! Object endpoint handlers.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Form,
};
use tokio::sync::RwLock;

use super::{not_found, object_xml, objects_xml, xml_response};
use crate::mock_server::state::MockState;
use crate::models::PropertyMap;

/// Properties from `property#<name>` form fields.
fn form_properties(form: &[(String, String)]) -> PropertyMap {
    form.iter()
        .filter_map(|(key, value)| {
            key.strip_prefix("property#")
                .map(|name| (name.to_string(), value.clone()))
        })
        .collect()
}

/// GET /rest/wikis/xwiki/spaces/data/pages/{id}/objects
pub async fn list_objects(
    State(state): State<Arc<RwLock<MockState>>>,
    Path(id): Path<String>,
) -> Response {
    let state = state.read().await;
    let Some(patient) = state.get_patient(&id) else {
        return not_found(format!("Patient {id}"));
    };

    let summaries = patient.objects.iter().flat_map(|(class, objects)| {
        objects.keys().map(move |number| (class.as_str(), *number))
    });
    xml_response(StatusCode::OK, objects_xml(summaries))
}

/// POST /rest/wikis/xwiki/spaces/data/pages/{id}/objects
pub async fn create_object(
    State(state): State<Arc<RwLock<MockState>>>,
    Path(id): Path<String>,
    Form(form): Form<Vec<(String, String)>>,
) -> Response {
    let Some(class) = form
        .iter()
        .find(|(key, _)| key == "className")
        .map(|(_, value)| value.clone())
    else {
        return (StatusCode::BAD_REQUEST, "className is required").into_response();
    };

    let mut state = state.write().await;
    let Some(patient) = state.get_patient_mut(&id) else {
        return not_found(format!("Patient {id}"));
    };

    let props = form_properties(&form);
    let number = patient.add_object(&class, props.clone());
    let location = format!(
        "/rest/wikis/xwiki/spaces/data/pages/{id}/objects/{}/{number}",
        urlencoding::encode(&class)
    );

    (
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        xml_response(StatusCode::CREATED, object_xml(&id, &class, number, &props)),
    )
        .into_response()
}

/// GET /rest/wikis/xwiki/spaces/data/pages/{id}/objects/{class}
pub async fn list_class_objects(
    State(state): State<Arc<RwLock<MockState>>>,
    Path((id, class)): Path<(String, String)>,
) -> Response {
    let state = state.read().await;
    let Some(patient) = state.get_patient(&id) else {
        return not_found(format!("Patient {id}"));
    };

    let numbers: Vec<u32> = patient
        .objects
        .get(&class)
        .map(|objects| objects.keys().copied().collect())
        .unwrap_or_default();
    xml_response(
        StatusCode::OK,
        objects_xml(numbers.into_iter().map(|number| (class.as_str(), number))),
    )
}

/// GET /rest/wikis/xwiki/spaces/data/pages/{id}/objects/{class}/{number}
pub async fn get_object(
    State(state): State<Arc<RwLock<MockState>>>,
    Path((id, class, number)): Path<(String, String, u32)>,
) -> Response {
    let state = state.read().await;
    match state
        .get_patient(&id)
        .and_then(|patient| patient.object(&class, number))
    {
        Some(props) => xml_response(StatusCode::OK, object_xml(&id, &class, number, props)),
        None => not_found(format!("Object {class}[{number}] of {id}")),
    }
}

/// PUT /rest/wikis/xwiki/spaces/data/pages/{id}/objects/{class}/{number}
///
/// Only the submitted properties change.
pub async fn update_object(
    State(state): State<Arc<RwLock<MockState>>>,
    Path((id, class, number)): Path<(String, String, u32)>,
    Form(form): Form<Vec<(String, String)>>,
) -> Response {
    let mut state = state.write().await;
    let Some(props) = state
        .get_patient_mut(&id)
        .and_then(|patient| patient.object_mut(&class, number))
    else {
        return not_found(format!("Object {class}[{number}] of {id}"));
    };

    props.extend(form_properties(&form));
    xml_response(StatusCode::ACCEPTED, object_xml(&id, &class, number, props))
}

/// DELETE /rest/wikis/xwiki/spaces/data/pages/{id}/objects/{class}/{number}
pub async fn delete_object(
    State(state): State<Arc<RwLock<MockState>>>,
    Path((id, class, number)): Path<(String, String, u32)>,
) -> Response {
    let mut state = state.write().await;
    let removed = state
        .get_patient_mut(&id)
        .is_some_and(|patient| patient.remove_object(&class, number));
    if removed {
        StatusCode::NO_CONTENT.into_response()
    } else {
        not_found(format!("Object {class}[{number}] of {id}"))
    }
}
