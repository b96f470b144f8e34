//! Mock PhenoTips server.
//!
//! Provides an axum-based HTTP server that simulates the PhenoTips REST API.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;

use super::fixtures::{DefaultScenario, Fixtures};
use super::handlers;
use super::state::MockState;

const PAGES: &str = "/rest/wikis/xwiki/spaces/data/pages";

/// A mock PhenoTips server for testing.
///
/// The server runs in the background and can be used to test the PhenoTips
/// client against a realistic API implementation.
pub struct MockServer {
    /// The URL where the server is listening.
    url: String,
    /// Handle to the server task.
    handle: JoinHandle<()>,
    /// Shared state that can be modified during tests.
    state: Arc<RwLock<MockState>>,
}

impl MockServer {
    /// Start a new mock server with default fixtures.
    ///
    /// The server listens on a random available port and returns immediately.
    /// Use `url()` to get the server's base URL.
    pub async fn start() -> Self {
        Self::with_state(Self::default_state()).await
    }

    /// Start a mock server with empty state.
    ///
    /// Useful when you want to control exactly what data is available.
    pub async fn start_empty() -> Self {
        Self::with_state(MockState::new()).await
    }

    /// Start a mock server with custom state.
    pub async fn with_state(state: MockState) -> Self {
        let shared_state = state.shared();
        let app = Self::create_router(shared_state.clone());

        // Bind to a random available port
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to address");
        let addr = listener.local_addr().expect("Failed to get local address");

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Server error");
        });

        Self {
            url: format!("http://{}", addr),
            handle,
            state: shared_state,
        }
    }

    /// Get the base URL of the mock server.
    ///
    /// Use this URL when creating a `PhenoTipsClient` for testing.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Get access to the server's shared state.
    ///
    /// This allows inspecting or modifying the mock data during a test.
    pub fn state(&self) -> Arc<RwLock<MockState>> {
        self.state.clone()
    }

    /// Shutdown the server.
    ///
    /// This aborts the server task. It's safe to call multiple times.
    pub async fn shutdown(self) {
        self.handle.abort();
        let _ = self.handle.await;
    }

    /// Create the default state with common test fixtures.
    fn default_state() -> MockState {
        Self::state_from_scenario(Fixtures::default_scenario())
    }

    /// Create state from a scenario.
    fn state_from_scenario(scenario: DefaultScenario) -> MockState {
        let mut state = MockState::new();

        for schema in scenario.classes {
            state.classes.insert(schema.name.clone(), schema);
        }

        for (space, name) in scenario.pages {
            state = state.with_page(space, name);
        }

        for (id, patient) in scenario.patients {
            state.insert_patient(id, patient);
        }

        state
    }

    /// Create the axum router with all routes.
    fn create_router(state: Arc<RwLock<MockState>>) -> Router {
        Router::new()
            // Patient routes
            .route("/rest/patients", post(handlers::create_patient))
            .route("/rest/patients/:id", delete(handlers::delete_patient))
            .route(
                "/rest/patients/eid/:eid",
                get(handlers::get_patient_by_external_id),
            )
            .route("/bin/edit/data/:id", get(handlers::edit_patient))
            // Object routes
            .route(
                &format!("{PAGES}/:id/objects"),
                get(handlers::list_objects).post(handlers::create_object),
            )
            .route(
                &format!("{PAGES}/:id/objects/:class"),
                get(handlers::list_class_objects),
            )
            .route(
                &format!("{PAGES}/:id/objects/:class/:number"),
                get(handlers::get_object)
                    .put(handlers::update_object)
                    .delete(handlers::delete_object),
            )
            // Attachment routes
            .route(
                &format!("{PAGES}/:id/attachments/:file"),
                put(handlers::put_attachment).delete(handlers::delete_attachment),
            )
            .route(
                "/bin/download/data/:id/:file",
                get(handlers::download_attachment),
            )
            // Query and class routes
            .route("/rest/wikis/xwiki/query", get(handlers::run_query))
            .route("/rest/wikis/xwiki/classes/:class", get(handlers::get_class))
            .route_layer(middleware::from_fn_with_state(
                state.clone(),
                require_credentials,
            ))
            // Health check
            .route("/health", get(health_check))
            .with_state(state)
    }
}

/// Reject requests without the configured credentials.
async fn require_credentials(
    State(state): State<Arc<RwLock<MockState>>>,
    request: Request,
    next: Next,
) -> Response {
    let required = state.read().await.required_credentials.clone();
    if let Some(required) = required {
        if handlers::basic_auth_credentials(request.headers()).as_ref() != Some(&required) {
            return StatusCode::UNAUTHORIZED.into_response();
        }
    }
    next.run(request).await
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "ok"
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock_server::MockPatient;
    use crate::{PatientFilter, PhenoTipsClient};

    #[tokio::test]
    async fn test_server_starts_and_responds() {
        let server = MockServer::start().await;

        // Server should be accessible
        let client = reqwest::Client::new();
        let response = client
            .get(format!("{}/health", server.url()))
            .send()
            .await
            .expect("Failed to send request");

        assert!(response.status().is_success());
        assert_eq!(response.text().await.unwrap(), "ok");

        server.shutdown().await;
    }

    #[tokio::test]
    async fn test_get_patient_with_client() {
        let server = MockServer::start().await;
        let client = PhenoTipsClient::new(server.url(), "Admin", "admin").unwrap();

        let patient = client.get("P0000001").await.expect("Failed to get patient");

        assert_eq!(patient["first_name"], "Ann");

        server.shutdown().await;
    }

    #[tokio::test]
    async fn test_list_patients_with_client() {
        let server = MockServer::start().await;
        let client = PhenoTipsClient::new(server.url(), "Admin", "admin").unwrap();

        let ids = client
            .list(&PatientFilter::default().study("Cohort1"))
            .await
            .expect("Failed to list patients");

        assert_eq!(ids, vec!["P0000001", "P0000003"]);

        server.shutdown().await;
    }

    #[tokio::test]
    async fn test_empty_server() {
        let server = MockServer::start_empty().await;
        let client = PhenoTipsClient::new(server.url(), "Admin", "admin").unwrap();

        let result = client.get("P0000001").await;

        assert!(result.is_err());

        server.shutdown().await;
    }

    #[tokio::test]
    async fn test_required_credentials() {
        let state = MockState::new()
            .with_required_credentials("Admin", "secret")
            .with_patient("P0000001", MockPatient::new(&[("first_name", "Ann")]));
        let server = MockServer::with_state(state).await;

        let wrong = PhenoTipsClient::new(server.url(), "Admin", "admin").unwrap();
        let err = wrong.get("P0000001").await.unwrap_err();
        assert_eq!(err.status(), Some(401));

        let right = PhenoTipsClient::new(server.url(), "Admin", "secret").unwrap();
        assert_eq!(right.get("P0000001").await.unwrap()["first_name"], "Ann");

        server.shutdown().await;
    }
}
