//! PhenoTips API client.
//!
//! Low-level HTTP client that handles authentication and raw requests.
//! Patient, object, attachment, page and pedigree operations are built on
//! top of it in the `models` modules.

use std::sync::Arc;

use reqwest::{Client, Response, StatusCode};
use serde::Serialize;
use tokio::sync::Mutex;
use url::Url;

use crate::browser::BrowserSession;
use crate::config::{normalize_base_url, ClientConfig};
use crate::error::{PhenoTipsError, Result};

const USER_AGENT: &str = concat!("phenotips/", env!("CARGO_PKG_VERSION"));

/// Path of the wiki page that stores a patient record.
pub(crate) fn page_path(patient_id: &str) -> String {
    format!(
        "rest/wikis/xwiki/spaces/data/pages/{}",
        urlencoding::encode(patient_id)
    )
}

/// PhenoTips API client.
///
/// Handles authentication and HTTP requests against the REST API, and owns
/// the optional browser session used for pedigree editing.
///
/// This struct is cheaply cloneable; clones share the connection pool and
/// the browser session.
///
/// # Example
///
/// ```no_run
/// use phenotips::PhenoTipsClient;
///
/// # async fn example() -> phenotips::Result<()> {
/// let client = PhenoTipsClient::new("http://localhost:8080", "Admin", "admin")?;
/// let patient = client.get("P0000001").await?;
/// println!("{:?}", patient.get("last_name"));
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct PhenoTipsClient {
    http: Client,
    base_url: Arc<Url>,
    username: String,
    password: String,
    webdriver_url: Arc<str>,
    browser: Arc<Mutex<Option<BrowserSession>>>,
}

impl std::fmt::Debug for PhenoTipsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PhenoTipsClient")
            .field("base_url", &self.base_url.as_str())
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

impl PhenoTipsClient {
    /// Create a client from `PHENOTIPS_*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if the username or password is not set.
    pub fn from_env() -> Result<Self> {
        Self::with_config(ClientConfig::from_env()?)
    }

    /// Create a new client with default settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid.
    pub fn new(base_url: &str, username: &str, password: &str) -> Result<Self> {
        Self::with_config(ClientConfig::new(base_url, username, password))
    }

    /// Create a client from a full configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid or the HTTP client cannot
    /// be built.
    pub fn with_config(config: ClientConfig) -> Result<Self> {
        // Joining relative paths needs a trailing slash
        let base_url = Url::parse(&format!("{}/", normalize_base_url(&config.base_url)))?;

        let http = Client::builder()
            .user_agent(USER_AGENT)
            .brotli(true)
            .gzip(true)
            .deflate(true)
            .timeout(config.timeout)
            .danger_accept_invalid_certs(!config.ssl_verify)
            .build()
            .map_err(PhenoTipsError::HttpError)?;

        Ok(Self {
            http,
            base_url: Arc::new(base_url),
            username: config.username,
            password: config.password,
            webdriver_url: Arc::from(config.webdriver_url),
            browser: Arc::new(Mutex::new(None)),
        })
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Get the account name used for authentication.
    pub fn username(&self) -> &str {
        &self.username
    }

    pub(crate) fn password(&self) -> &str {
        &self.password
    }

    pub(crate) fn webdriver_url(&self) -> &str {
        &self.webdriver_url
    }

    pub(crate) fn browser_slot(&self) -> &Mutex<Option<BrowserSession>> {
        &self.browser
    }

    /// Resolve a path relative to the base URL.
    pub fn url(&self, path: &str) -> Result<Url> {
        Ok(self.base_url.join(path)?)
    }

    /// Make a GET request.
    #[tracing::instrument(skip(self))]
    pub async fn get_raw(&self, path: &str) -> Result<Response> {
        let response = self.send_get(path).await?;
        Self::check_response(response).await
    }

    /// Make a GET request where 404 means "absent" rather than failure.
    #[tracing::instrument(skip(self))]
    pub async fn get_optional(&self, path: &str) -> Result<Option<Response>> {
        let response = self.send_get(path).await?;
        if response.status() == StatusCode::NOT_FOUND {
            tracing::debug!("{} not found", path);
            return Ok(None);
        }
        Self::check_response(response).await.map(Some)
    }

    /// Make a GET request with query parameters.
    #[tracing::instrument(skip(self, query))]
    pub async fn get_with_query<Q: Serialize + ?Sized>(
        &self,
        path: &str,
        query: &Q,
    ) -> Result<Response> {
        let url = self.url(path)?;

        let response = self
            .http
            .get(url)
            .basic_auth(&self.username, Some(&self.password))
            .query(query)
            .send()
            .await
            .map_err(PhenoTipsError::HttpError)?;

        Self::check_response(response).await
    }

    /// Make a POST request without a body.
    #[tracing::instrument(skip(self))]
    pub async fn post_empty(&self, path: &str) -> Result<Response> {
        let url = self.url(path)?;

        let response = self
            .http
            .post(url)
            .basic_auth(&self.username, Some(&self.password))
            .send()
            .await
            .map_err(PhenoTipsError::HttpError)?;

        Self::check_response(response).await
    }

    /// Make a POST request with a form-encoded body.
    #[tracing::instrument(skip(self, form))]
    pub async fn post_form(&self, path: &str, form: &[(String, String)]) -> Result<Response> {
        let url = self.url(path)?;

        let response = self
            .http
            .post(url)
            .basic_auth(&self.username, Some(&self.password))
            .form(form)
            .send()
            .await
            .map_err(PhenoTipsError::HttpError)?;

        Self::check_response(response).await
    }

    /// Make a PUT request with a form-encoded body.
    #[tracing::instrument(skip(self, form))]
    pub async fn put_form(&self, path: &str, form: &[(String, String)]) -> Result<Response> {
        let url = self.url(path)?;

        let response = self
            .http
            .put(url)
            .basic_auth(&self.username, Some(&self.password))
            .form(form)
            .send()
            .await
            .map_err(PhenoTipsError::HttpError)?;

        Self::check_response(response).await
    }

    /// Make a PUT request with a raw binary body.
    #[tracing::instrument(skip(self, body), fields(len = body.len()))]
    pub async fn put_bytes(&self, path: &str, body: Vec<u8>) -> Result<Response> {
        let url = self.url(path)?;

        let response = self
            .http
            .put(url)
            .basic_auth(&self.username, Some(&self.password))
            .body(body)
            .send()
            .await
            .map_err(PhenoTipsError::HttpError)?;

        Self::check_response(response).await
    }

    /// Make a DELETE request.
    #[tracing::instrument(skip(self))]
    pub async fn delete_raw(&self, path: &str) -> Result<Response> {
        let url = self.url(path)?;

        let response = self
            .http
            .delete(url)
            .basic_auth(&self.username, Some(&self.password))
            .send()
            .await
            .map_err(PhenoTipsError::HttpError)?;

        Self::check_response(response).await
    }

    pub(crate) async fn send_get(&self, path: &str) -> Result<Response> {
        let url = self.url(path)?;
        tracing::debug!(%url, "GET");

        self.http
            .get(url)
            .basic_auth(&self.username, Some(&self.password))
            .send()
            .await
            .map_err(PhenoTipsError::HttpError)
    }

    /// Last path segment of the `Location` header of a create response.
    pub(crate) fn location_tail(response: &Response, what: &str) -> Result<String> {
        response
            .headers()
            .get(reqwest::header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|location| location.rsplit('/').next())
            .filter(|tail| !tail.is_empty())
            .map(|tail| {
                urlencoding::decode(tail)
                    .map(|s| s.into_owned())
                    .unwrap_or_else(|_| tail.to_string())
            })
            .ok_or_else(|| PhenoTipsError::MissingLocation(what.to_string()))
    }

    /// Check response status and convert errors.
    pub(crate) async fn check_response(response: Response) -> Result<Response> {
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        let message = Self::extract_error_message(response, status).await;
        Err(PhenoTipsError::ApiError {
            status: status.as_u16(),
            message,
        })
    }

    /// Extract error message from a failed response.
    async fn extract_error_message(response: Response, status: StatusCode) -> String {
        let body = match response.text().await {
            Ok(b) => b,
            Err(_) => return format!("HTTP {status}"),
        };

        let body = body.trim();
        if body.is_empty() {
            return format!("HTTP {status}");
        }

        // XWiki error pages can be long HTML documents
        let mut message: String = body.chars().take(200).collect();
        if message.len() < body.len() {
            message.push('…');
        }
        message
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_debug() {
        let client = PhenoTipsClient::new("http://localhost:8080", "Admin", "hunter2").unwrap();
        let debug = format!("{:?}", client);
        assert!(debug.contains("PhenoTipsClient"));
        assert!(debug.contains("base_url"));
        // Password should not be in debug output
        assert!(!debug.contains("hunter2"));
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let client1 = PhenoTipsClient::new("http://localhost:8080", "a", "b").unwrap();
        let client2 = PhenoTipsClient::new("http://localhost:8080/", "a", "b").unwrap();
        assert_eq!(client1.base_url().as_str(), client2.base_url().as_str());
        assert_eq!(client1.base_url().as_str(), "http://localhost:8080/");
    }

    #[test]
    fn test_base_url_without_scheme() {
        let client = PhenoTipsClient::new("phenotips.local:8080", "a", "b").unwrap();
        assert_eq!(client.base_url().as_str(), "http://phenotips.local:8080/");
    }

    #[test]
    fn test_url_keeps_context_path() {
        let client = PhenoTipsClient::new("https://example.org/phenotips", "a", "b").unwrap();
        let url = client.url("rest/patients").unwrap();
        assert_eq!(url.as_str(), "https://example.org/phenotips/rest/patients");
    }

    #[test]
    fn test_page_path_encodes_id() {
        assert_eq!(
            page_path("P0000001"),
            "rest/wikis/xwiki/spaces/data/pages/P0000001"
        );
        assert_eq!(
            page_path("a b"),
            "rest/wikis/xwiki/spaces/data/pages/a%20b"
        );
    }
}
