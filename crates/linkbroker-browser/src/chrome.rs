//! Chromium-backed login agent.
//!
//! Launches a throwaway Chromium with a temp profile and a DevTools port,
//! walks the provider's login form over CDP, waits for the logged-in
//! marker, and captures the resulting cookies. The child process and the
//! profile directory are torn down on every exit path: the child is spawned
//! kill-on-drop and the profile is a `TempDir`, so cancellation or an early
//! `?` return still reaps both.

use std::net::TcpListener;
use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use linkbroker_session::SessionCookie;
use serde_json::{json, Value};
use tokio::process::{Child, Command};
use tracing::{debug, info};

use crate::agent::LoginAgent;
use crate::cdp::CdpClient;
use crate::error::LoginError;

/// Tunables for the Chromium login flow.
#[derive(Debug, Clone)]
pub struct ChromeConfig {
    /// Browser binary to launch.
    pub binary: PathBuf,
    /// Run without a visible window.
    pub headless: bool,
    /// URL of the provider's login form.
    pub login_url: String,
    /// Seconds to wait for the login form to render.
    pub form_wait_secs: u64,
    /// Seconds to wait for the logged-in marker after submitting.
    pub login_wait_secs: u64,
}

impl Default for ChromeConfig {
    fn default() -> Self {
        Self {
            binary: std::env::var("CHROME_BINARY")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("chromium")),
            headless: true,
            login_url: "https://www.linkedin.com/login".to_string(),
            form_wait_secs: 10,
            login_wait_secs: 15,
        }
    }
}

/// [`LoginAgent`] implementation driving a real Chromium instance.
pub struct ChromeLoginAgent {
    config: ChromeConfig,
}

/// Owns the spawned browser and its profile until login is done.
struct BrowserGuard {
    child: Child,
    _profile: tempfile::TempDir,
}

impl Drop for BrowserGuard {
    fn drop(&mut self) {
        // kill_on_drop covers process teardown; this just makes the intent
        // explicit when the guard is dropped while the child still runs.
        let _ = self.child.start_kill();
    }
}

impl ChromeLoginAgent {
    pub fn new(config: ChromeConfig) -> Self {
        Self { config }
    }

    fn free_port() -> Result<u16, LoginError> {
        let listener = TcpListener::bind("127.0.0.1:0")?;
        Ok(listener.local_addr()?.port())
    }

    fn launch(&self, port: u16) -> Result<BrowserGuard, LoginError> {
        let profile = tempfile::tempdir()?;
        let mut command = Command::new(&self.config.binary);
        command
            .arg(format!("--remote-debugging-port={}", port))
            .arg(format!("--user-data-dir={}", profile.path().display()))
            .arg("--no-first-run")
            .arg("--no-default-browser-check")
            .arg("--disable-background-networking")
            .kill_on_drop(true)
            .stdout(std::process::Stdio::null())
            .stderr(std::process::Stdio::null());
        if self.config.headless {
            command.arg("--headless=new");
        }
        command.arg("about:blank");
        let child = command.spawn()?;
        debug!("launched {} on devtools port {}", self.config.binary.display(), port);
        Ok(BrowserGuard {
            child,
            _profile: profile,
        })
    }

    /// Poll the DevTools HTTP endpoint until the first page target shows up.
    async fn discover_target(&self, port: u16) -> Result<String, LoginError> {
        let url = format!("http://127.0.0.1:{}/json", port);
        for _ in 0..40 {
            if let Ok(response) = reqwest::get(&url).await {
                if let Ok(targets) = response.json::<Value>().await {
                    let ws_url = targets
                        .as_array()
                        .into_iter()
                        .flatten()
                        .find(|t| t["type"] == "page")
                        .and_then(|t| t["webSocketDebuggerUrl"].as_str())
                        .map(str::to_string);
                    if let Some(ws_url) = ws_url {
                        return Ok(ws_url);
                    }
                }
            }
            tokio::time::sleep(Duration::from_millis(250)).await;
        }
        Err(LoginError::DevToolsUnreachable(format!(
            "no page target appeared on {}",
            url
        )))
    }

    /// Poll a boolean page expression until it holds or the deadline passes.
    async fn wait_for(
        cdp: &mut CdpClient,
        expression: &str,
        deadline: Duration,
    ) -> Result<bool, LoginError> {
        let started = tokio::time::Instant::now();
        while started.elapsed() < deadline {
            if cdp.evaluate(expression).await? == Value::Bool(true) {
                return Ok(true);
            }
            tokio::time::sleep(Duration::from_millis(250)).await;
        }
        Ok(false)
    }

    async fn drive_login(
        &self,
        cdp: &mut CdpClient,
        username: &str,
        password: &str,
    ) -> Result<Vec<SessionCookie>, LoginError> {
        cdp.call("Page.enable", json!({})).await?;
        cdp.call("Page.navigate", json!({ "url": self.config.login_url }))
            .await?;

        let form_ready = Self::wait_for(
            cdp,
            "document.getElementById('username') !== null",
            Duration::from_secs(self.config.form_wait_secs),
        )
        .await?;
        if !form_ready {
            return Err(LoginError::FormInteraction(
                "login form did not render a username field".to_string(),
            ));
        }

        // Native setters + input events so the page's own form handling sees
        // the values; a bare `.value =` assignment is ignored by some SPAs.
        let fill = format!(
            r#"(() => {{
                const set = (id, value) => {{
                    const el = document.getElementById(id);
                    const setter = Object.getOwnPropertyDescriptor(
                        window.HTMLInputElement.prototype, 'value').set;
                    setter.call(el, value);
                    el.dispatchEvent(new Event('input', {{ bubbles: true }}));
                }};
                set('username', {});
                set('password', {});
                document.querySelector('button[type="submit"]').click();
                return true;
            }})()"#,
            js_string(username),
            js_string(password),
        );
        cdp.evaluate(&fill).await?;

        let logged_in = Self::wait_for(
            cdp,
            "document.getElementById('global-nav-search') !== null",
            Duration::from_secs(self.config.login_wait_secs),
        )
        .await?;
        if !logged_in {
            return Err(LoginError::NotAccepted);
        }

        let result = cdp.call("Network.getAllCookies", json!({})).await?;
        let cookies = parse_cookies(&result);
        info!("captured {} cookies from browser session", cookies.len());
        Ok(cookies)
    }
}

#[async_trait]
impl LoginAgent for ChromeLoginAgent {
    async fn login(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Vec<SessionCookie>, LoginError> {
        let port = Self::free_port()?;
        let _guard = self.launch(port)?;
        let ws_url = self.discover_target(port).await?;
        let mut cdp = CdpClient::connect(&ws_url).await?;
        self.drive_login(&mut cdp, username, password).await
    }
}

/// Quote a value as a JavaScript string literal.
fn js_string(value: &str) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| "\"\"".to_string())
}

fn parse_cookies(result: &Value) -> Vec<SessionCookie> {
    result["cookies"]
        .as_array()
        .into_iter()
        .flatten()
        .filter_map(|raw| {
            let name = raw["name"].as_str()?.to_string();
            let value = raw["value"].as_str()?.to_string();
            let attributes = raw
                .as_object()
                .map(|obj| {
                    obj.iter()
                        .filter(|(k, _)| k.as_str() != "name" && k.as_str() != "value")
                        .map(|(k, v)| (k.clone(), v.clone()))
                        .collect()
                })
                .unwrap_or_default();
            Some(SessionCookie {
                name,
                value,
                attributes,
            })
        })
        .collect()
}
