//! Error types for PhenoTips operations.

use std::time::Duration;

use thiserror::Error;

/// Errors that can occur while talking to a PhenoTips server.
#[derive(Debug, Error)]
pub enum PhenoTipsError {
    /// Configuration is missing or incomplete.
    #[error("PhenoTips configuration required: {0}")]
    ConfigMissing(String),

    /// A reference name did not have the expected `xwiki:` qualification.
    #[error("Invalid page name '{name}': expected 'xwiki:{namespace}.<name>' or 'xwiki:<name>'")]
    InvalidName { name: String, namespace: String },

    /// The server answered with a non-success status.
    #[error("PhenoTips API error (HTTP {status}): {message}")]
    ApiError { status: u16, message: String },

    /// The external ID lookup returned neither JSON nor XML.
    #[error("Expected JSON or XML, got content type '{0}'")]
    UnexpectedContentType(String),

    /// A create call succeeded but the server did not say where.
    #[error("Response to {0} carried no usable Location header")]
    MissingLocation(String),

    /// An object was fetched but lacked a property the operation needs.
    #[error("Object {class} is missing property '{property}'")]
    MissingProperty { class: String, property: String },

    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// XML response could not be parsed.
    #[error("Failed to parse XML response: {0}")]
    XmlError(#[from] quick_xml::de::DeError),

    /// JSON parsing error.
    #[error("Failed to parse JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    UrlError(#[from] url::ParseError),

    /// Local file or stream I/O failed.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// CSV output failed.
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    /// The WebDriver session could not be started.
    #[error("Could not start browser session: {0}")]
    BrowserSession(#[from] fantoccini::error::NewSessionError),

    /// A WebDriver command failed.
    #[error("Browser command failed: {0}")]
    Browser(#[from] fantoccini::error::CmdError),

    /// The pedigree editor did not show a readiness signal in time.
    #[error("Pedigree editor not ready: '{selector}' did not appear within {timeout:?}")]
    BrowserTimeout { selector: String, timeout: Duration },
}

impl PhenoTipsError {
    /// HTTP status of an API error, if this is one.
    pub fn status(&self) -> Option<u16> {
        match self {
            PhenoTipsError::ApiError { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Result type alias for PhenoTips operations.
pub type Result<T> = core::result::Result<T, PhenoTipsError>;
