//! Client configuration.
//!
//! Settings can be given explicitly or read from `PHENOTIPS_*` environment
//! variables. The binaries layer command-line flags and interactive prompts
//! on top of the same struct.

use std::env;
use std::time::Duration;

use crate::error::{PhenoTipsError, Result};

/// Base URL used when none is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";

/// WebDriver endpoint used for pedigree editing when none is configured.
pub const DEFAULT_WEBDRIVER_URL: &str = "http://localhost:4444";

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

pub const ENV_BASE_URL: &str = "PHENOTIPS_BASE_URL";
pub const ENV_USERNAME: &str = "PHENOTIPS_USERNAME";
pub const ENV_PASSWORD: &str = "PHENOTIPS_PASSWORD";
pub const ENV_SSL_VERIFY: &str = "PHENOTIPS_SSL_VERIFY";
pub const ENV_WEBDRIVER_URL: &str = "PHENOTIPS_WEBDRIVER_URL";

/// Connection settings for a [`PhenoTipsClient`](crate::PhenoTipsClient).
#[derive(Clone)]
pub struct ClientConfig {
    /// Server root, e.g. `http://localhost:8080`.
    pub base_url: String,
    /// Account used for HTTP Basic authentication.
    pub username: String,
    pub password: String,
    /// Verify TLS certificates. Disable only for self-signed test servers.
    pub ssl_verify: bool,
    /// Timeout for each REST request.
    pub timeout: Duration,
    /// WebDriver endpoint that drives the pedigree editor.
    pub webdriver_url: String,
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("username", &self.username)
            .field("ssl_verify", &self.ssl_verify)
            .field("timeout", &self.timeout)
            .field("webdriver_url", &self.webdriver_url)
            .finish_non_exhaustive()
    }
}

impl ClientConfig {
    /// Create a configuration with default TLS, timeout and WebDriver settings.
    pub fn new(base_url: &str, username: &str, password: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            username: username.to_string(),
            password: password.to_string(),
            ssl_verify: true,
            timeout: DEFAULT_TIMEOUT,
            webdriver_url: DEFAULT_WEBDRIVER_URL.to_string(),
        }
    }

    /// Read the configuration from environment variables.
    ///
    /// `PHENOTIPS_USERNAME` and `PHENOTIPS_PASSWORD` are required;
    /// `PHENOTIPS_BASE_URL`, `PHENOTIPS_SSL_VERIFY` and
    /// `PHENOTIPS_WEBDRIVER_URL` are optional.
    ///
    /// # Errors
    ///
    /// Returns [`PhenoTipsError::ConfigMissing`] if a required variable is unset.
    pub fn from_env() -> Result<Self> {
        let username = env::var(ENV_USERNAME).map_err(|_| {
            PhenoTipsError::ConfigMissing(format!("{ENV_USERNAME} environment variable not set"))
        })?;
        let password = env::var(ENV_PASSWORD).map_err(|_| {
            PhenoTipsError::ConfigMissing(format!("{ENV_PASSWORD} environment variable not set"))
        })?;
        let base_url = env::var(ENV_BASE_URL).unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());

        let mut config = Self::new(&base_url, &username, &password);
        if let Ok(value) = env::var(ENV_SSL_VERIFY) {
            config.ssl_verify = parse_flag(&value);
        }
        if let Ok(url) = env::var(ENV_WEBDRIVER_URL) {
            config.webdriver_url = url;
        }
        Ok(config)
    }

    pub fn with_ssl_verify(mut self, ssl_verify: bool) -> Self {
        self.ssl_verify = ssl_verify;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_webdriver_url(mut self, url: &str) -> Self {
        self.webdriver_url = url.to_string();
        self
    }
}

/// Normalize user input into a server root URL.
///
/// Adds `http://` when no scheme is given and strips trailing slashes.
pub fn normalize_base_url(input: &str) -> String {
    let trimmed = input.trim();
    let with_scheme = if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("http://{trimmed}")
    };
    with_scheme.trim_end_matches('/').to_string()
}

fn parse_flag(value: &str) -> bool {
    !matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "0" | "false" | "no" | "off"
    )
}
