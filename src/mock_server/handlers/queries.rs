//! Query and class endpoint handlers.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tokio::sync::RwLock;

use super::{class_xml, not_found, search_results_xml, xml_response};
use crate::mock_server::state::MockState;

/// Query parameters of the query endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct QueryParams {
    pub q: String,
    #[serde(rename = "type")]
    pub query_type: Option<String>,
}

/// GET /rest/wikis/xwiki/query
pub async fn run_query(
    State(state): State<Arc<RwLock<MockState>>>,
    Query(params): Query<QueryParams>,
) -> Response {
    if params.query_type.as_deref() != Some("hql") {
        return (StatusCode::BAD_REQUEST, "Only HQL queries are supported").into_response();
    }

    let state = state.read().await;
    let ids = state.query(&params.q);
    xml_response(StatusCode::OK, search_results_xml(&ids))
}

/// GET /rest/wikis/xwiki/classes/{class}
pub async fn get_class(
    State(state): State<Arc<RwLock<MockState>>>,
    Path(class): Path<String>,
) -> Response {
    let state = state.read().await;
    match state.classes.get(&class) {
        Some(schema) => xml_response(StatusCode::OK, class_xml(schema)),
        None => not_found(format!("Class {class}")),
    }
}
