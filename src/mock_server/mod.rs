//! Mock PhenoTips server for E2E testing.
//!
//! This module provides an in-memory mock server that simulates the PhenoTips
//! REST API for integration and end-to-end testing. Unlike wiremock which
//! mocks at the HTTP level per-test, this server maintains state across
//! requests, enabling realistic workflow testing.
//!
//! # Example
//!
//! ```ignore
//! use phenotips::mock_server::MockServer;
//! use phenotips::PhenoTipsClient;
//!
//! #[tokio::test]
//! async fn test_workflow() {
//!     let server = MockServer::start().await;
//!     let client = PhenoTipsClient::new(server.url(), "Admin", "admin").unwrap();
//!
//!     // Server comes with default fixtures
//!     let patient = client.get("P0000001").await.unwrap();
//!     assert_eq!(patient["first_name"], "Ann");
//!
//!     server.shutdown().await;
//! }
//! ```

mod fixtures;
mod handlers;
mod server;
mod state;

pub use fixtures::{DefaultScenario, Fixtures};
pub use server::MockServer;
pub use state::{MockPatient, MockState, ObjectSet};
