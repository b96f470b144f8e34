//! Browser session for the pedigree editor.
//!
//! Pedigree drawings are rendered by a JavaScript editor; saving JSON through
//! the REST API does not update the stored drawing. Writes therefore go
//! through the editor page itself, driven over WebDriver.
//!
//! Sessions target chromedriver. The `Authorization` header is attached to
//! every page request through the Chrome DevTools protocol, since WebDriver
//! itself has no way to set request headers.

use std::time::Duration;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use fantoccini::error::CmdError;
use fantoccini::wd::WebDriverCompatibleCommand;
use fantoccini::{Client, ClientBuilder, Locator};
use reqwest::Method;
use serde_json::{json, Value};
use url::Url;

use crate::client::PhenoTipsClient;
use crate::error::{PhenoTipsError, Result};

/// How long to wait for editor readiness signals.
pub const EDITOR_TIMEOUT: Duration = Duration::from_secs(20);

/// Present once the editor has drawn the pedigree canvas.
pub const CANVAS_SELECTOR: &str = "#canvas svg";

/// Present once the editor has finished saving.
pub const SAVED_SELECTOR: &str = "#action-save.menu-item";

const WINDOW_WIDTH: u32 = 1920;
const WINDOW_HEIGHT: u32 = 1080;

const SAVE_SCRIPT: &str = "window.editor.getSaveLoadEngine().save();";

/// An open WebDriver session.
///
/// Cloning is cheap; clones drive the same browser.
#[derive(Clone)]
pub struct BrowserSession {
    driver: Client,
}

impl std::fmt::Debug for BrowserSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BrowserSession").finish_non_exhaustive()
    }
}

/// `Authorization` header value for HTTP Basic authentication.
pub fn basic_authorization(username: &str, password: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{username}:{password}")))
}

fn session_capabilities() -> serde_json::Map<String, Value> {
    let mut capabilities = serde_json::Map::new();
    capabilities.insert("browserName".to_string(), json!("chrome"));
    capabilities.insert(
        "goog:chromeOptions".to_string(),
        json!({ "args": ["--headless", "--disable-gpu"] }),
    );
    capabilities
}

/// A Chrome DevTools command sent through chromedriver's
/// `goog/cdp/execute` endpoint.
struct DevToolsCommand {
    cmd: &'static str,
    params: Value,
}

impl DevToolsCommand {
    fn enable_network() -> Self {
        Self {
            cmd: "Network.enable",
            params: json!({}),
        }
    }

    fn extra_headers(authorization: &str) -> Self {
        Self {
            cmd: "Network.setExtraHTTPHeaders",
            params: json!({ "headers": { "Authorization": authorization } }),
        }
    }
}

// Params may hold credentials
impl std::fmt::Debug for DevToolsCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DevToolsCommand")
            .field("cmd", &self.cmd)
            .finish_non_exhaustive()
    }
}

impl WebDriverCompatibleCommand for DevToolsCommand {
    fn endpoint(
        &self,
        base_url: &Url,
        session_id: Option<&str>,
    ) -> std::result::Result<Url, url::ParseError> {
        base_url.join(&format!(
            "session/{}/goog/cdp/execute",
            session_id.unwrap_or_default()
        ))
    }

    fn method_and_body(&self, _request_url: &Url) -> (Method, Option<String>) {
        let body = json!({ "cmd": self.cmd, "params": self.params });
        (Method::POST, Some(body.to_string()))
    }
}

impl BrowserSession {
    /// Start a session whose page requests carry Basic credentials.
    ///
    /// # Errors
    ///
    /// Returns [`PhenoTipsError::Browser`] if the driver does not accept
    /// DevTools commands, i.e. is not chromedriver.
    #[tracing::instrument(skip(password))]
    pub async fn connect(webdriver_url: &str, username: &str, password: &str) -> Result<Self> {
        let driver = ClientBuilder::native()
            .capabilities(session_capabilities())
            .connect(webdriver_url)
            .await?;

        let authorization = basic_authorization(username, password);
        driver.issue_cmd(DevToolsCommand::enable_network()).await?;
        driver
            .issue_cmd(DevToolsCommand::extra_headers(&authorization))
            .await?;

        // Large enough that no editor control is cut off
        driver.set_window_size(WINDOW_WIDTH, WINDOW_HEIGHT).await?;
        tracing::info!("browser session started");

        Ok(Self { driver })
    }

    /// Load the editor page and wait until the canvas is drawn.
    pub async fn open_editor(&self, url: Url) -> Result<()> {
        tracing::debug!(path = url.path(), "opening pedigree editor");
        self.driver.goto(url.as_str()).await?;
        self.wait_for(CANVAS_SELECTOR).await
    }

    /// Run a script in the page; `arguments[i]` refers to `args[i]`.
    pub async fn run(&self, script: &str, args: Vec<Value>) -> Result<Value> {
        Ok(self.driver.execute(script, args).await?)
    }

    /// Save the editor state and wait for the save to complete.
    pub async fn save(&self) -> Result<()> {
        self.run(SAVE_SCRIPT, Vec::new()).await?;
        self.wait_for(SAVED_SELECTOR).await
    }

    async fn wait_for(&self, selector: &str) -> Result<()> {
        match self
            .driver
            .wait()
            .at_most(EDITOR_TIMEOUT)
            .for_element(Locator::Css(selector))
            .await
        {
            Ok(_) => Ok(()),
            Err(CmdError::WaitTimeout) => Err(PhenoTipsError::BrowserTimeout {
                selector: selector.to_string(),
                timeout: EDITOR_TIMEOUT,
            }),
            Err(err) => Err(err.into()),
        }
    }

    /// End the WebDriver session.
    pub async fn close(self) -> Result<()> {
        self.driver.close().await?;
        tracing::info!("browser session closed");
        Ok(())
    }
}

impl PhenoTipsClient {
    /// The browser session, started on first use.
    ///
    /// The session stays open until [`close_browser`](Self::close_browser).
    pub async fn browser(&self) -> Result<BrowserSession> {
        let mut slot = self.browser_slot().lock().await;
        if let Some(session) = slot.as_ref() {
            return Ok(session.clone());
        }
        let session =
            BrowserSession::connect(self.webdriver_url(), self.username(), self.password()).await?;
        *slot = Some(session.clone());
        Ok(session)
    }

    /// Whether a browser session is currently open.
    pub async fn has_browser(&self) -> bool {
        self.browser_slot().lock().await.is_some()
    }

    /// Close the browser session if one is open.
    ///
    /// A later pedigree write starts a new session.
    pub async fn close_browser(&self) -> Result<()> {
        let session = self.browser_slot().lock().await.take();
        match session {
            Some(session) => session.close().await,
            None => Ok(()),
        }
    }

    /// URL of the pedigree editor for a patient.
    ///
    /// `basicauth=1` makes XWiki answer anonymous requests with a 401
    /// challenge instead of the login form, so the embedded credentials are
    /// used even before the injected header takes effect.
    pub fn pedigree_editor_url(&self, patient_id: &str) -> Result<Url> {
        let mut url = self.url(&format!("bin/{}", urlencoding::encode(patient_id)))?;
        url.query_pairs_mut()
            .append_pair("sheet", "PhenoTips.PedigreeEditor")
            .append_pair("basicauth", "1");
        // Only fails for URLs that cannot carry credentials, which base URLs never are
        let _ = url.set_username(self.username());
        let _ = url.set_password(Some(self.password()));
        Ok(url)
    }
}
