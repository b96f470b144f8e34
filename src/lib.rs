//! PhenoTips API client library.
//!
//! A Rust library for reading and writing patient records on a PhenoTips
//! server through its XWiki REST API, plus a CSV exporter built on top of it.
//! Patient data is exchanged as flat property maps; pedigree editing goes
//! through the server's own pedigree editor driven over WebDriver.
//!
//! # Quick Start
//!
//! ```no_run
//! use phenotips::{PatientFilter, PhenoTipsClient};
//!
//! #[tokio::main]
//! async fn main() -> phenotips::Result<()> {
//!     // Create client from environment variables
//!     let client = PhenoTipsClient::from_env()?;
//!
//!     // List the patients of one study
//!     let ids = client.list(&PatientFilter::default().study("Cohort1")).await?;
//!     println!("Found {} patients", ids.len());
//!
//!     // Read the primary properties of the first one
//!     if let Some(id) = ids.first() {
//!         let patient = client.get(id).await?;
//!         println!("{id}: {:?}", patient.get("last_name"));
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! All operations are methods on [`PhenoTipsClient`], grouped by what they
//! act on:
//!
//! - patients: create, delete, properties, owner, study
//! - objects attached to a patient, with typed wrappers for collaborators,
//!   relatives and VCF records (see [`PatientObject`])
//! - attachments
//! - class schemas and page listings
//! - pedigrees, through a lazily started [`BrowserSession`]
//!
//! Queries are built with [`HqlQuery`], which keeps user-supplied values out
//! of the statement structure.
//!
//! # Configuration
//!
//! The client reads configuration from environment variables:
//!
//! - `PHENOTIPS_BASE_URL` (optional) - Server URL (defaults to `http://localhost:8080`)
//! - `PHENOTIPS_USERNAME` (required) - Account name
//! - `PHENOTIPS_PASSWORD` (required) - Account password
//! - `PHENOTIPS_SSL_VERIFY` (optional) - Set to `false` to accept invalid certificates
//! - `PHENOTIPS_WEBDRIVER_URL` (optional) - WebDriver endpoint for pedigree editing

mod browser;
mod client;
mod config;
mod error;
mod export;
mod models;
pub mod naming;
mod query;
mod xml;

pub mod cli;
pub mod output;

#[cfg(feature = "test-server")]
pub mod mock_server;

// Re-export core types
pub use browser::{basic_authorization, BrowserSession};
pub use client::PhenoTipsClient;
pub use config::{normalize_base_url, ClientConfig, DEFAULT_BASE_URL};
pub use error::{PhenoTipsError, Result};
pub use query::{quote_literal, HqlQuery, PatientFilter};

// Re-export models
pub use models::*;

// Re-export the exporter
pub use export::{export_patients, format_elapsed, ExportSummary, PatientSource};

pub use output::PrettyPrint;
