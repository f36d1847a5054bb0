//! Playwright browser automation
//!
//! Every page is a separate `node` process running a small agent script. The
//! agent launches a browser, opens one page and then answers one JSON command
//! per stdin line with one JSON reply per stdout line:
//!
//! ```text
//! -> {"id":1,"op":"open","url":"http://localhost:4200/"}
//! <- {"id":1,"ok":true}
//! -> {"id":2,"op":"find_by_text","text":"Forms","exact":true}
//! <- {"id":2,"ok":true,"element":"e1"}
//! -> {"id":3,"op":"click","element":"e1"}
//! <- {"id":3,"ok":false,"kind":"interaction","message":"..."}
//! ```

use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tempfile::TempDir;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::process::{Child, ChildStdin, ChildStdout, Command as TokioCommand};
use tracing::{debug, info, warn};

use crate::driver::{BrowserDriver, BrowserPage, ElementHandle};
use crate::error::{DriverError, SuiteError, SuiteResult};

const AGENT_SCRIPT: &str = r#"
const readline = require('readline');
const playwright = require('playwright');

const reply = (msg, done) => process.stdout.write(JSON.stringify(msg) + '\n', done);

(async () => {
  const opts = JSON.parse(process.env.NAVSUITE_AGENT_OPTIONS);
  const browser = await playwright[opts.browser].launch({ headless: opts.headless });
  const context = await browser.newContext({
    viewport: { width: opts.viewportWidth, height: opts.viewportHeight },
    baseURL: opts.baseUrl || undefined,
  });
  context.setDefaultTimeout(opts.actionTimeoutMs);
  context.setDefaultNavigationTimeout(opts.navigationTimeoutMs);
  const page = await context.newPage();
  const elements = new Map();
  let nextElement = 0;

  reply({ ready: true });

  const rl = readline.createInterface({ input: process.stdin });
  for await (const line of rl) {
    if (!line.trim()) continue;
    const cmd = JSON.parse(line);
    const fail = (kind, error) =>
      reply({ id: cmd.id, ok: false, kind, message: error.message || String(error) });
    try {
      switch (cmd.op) {
        case 'open':
          try {
            await page.goto(cmd.url);
          } catch (e) {
            fail('navigation', e);
            continue;
          }
          reply({ id: cmd.id, ok: true });
          break;
        case 'find_by_text': {
          const locator = page.getByText(cmd.text, { exact: cmd.exact });
          try {
            await locator.first().waitFor({ state: 'attached' });
          } catch (e) {
            fail('not_found', e);
            continue;
          }
          const handle = 'e' + (++nextElement);
          elements.set(handle, locator);
          reply({ id: cmd.id, ok: true, element: handle });
          break;
        }
        case 'click': {
          const locator = elements.get(cmd.element);
          if (!locator) {
            fail('interaction', new Error('unknown element ' + cmd.element));
            continue;
          }
          try {
            await locator.click();
          } catch (e) {
            fail('interaction', e);
            continue;
          }
          reply({ id: cmd.id, ok: true });
          break;
        }
        case 'close':
          await browser.close();
          // Exit only once the reply has been flushed to the pipe.
          reply({ id: cmd.id, ok: true }, () => process.exit(0));
          return;
        default:
          fail('session', new Error('unknown op ' + cmd.op));
      }
    } catch (e) {
      fail('session', e);
    }
  }
  await browser.close();
})().catch((e) => {
  reply({ ready: false, message: e.message || String(e) });
  process.exit(1);
});
"#;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Browser {
    #[default]
    Chromium,
    Firefox,
    Webkit,
}

impl Browser {
    pub fn as_str(&self) -> &'static str {
        match self {
            Browser::Chromium => "chromium",
            Browser::Firefox => "firefox",
            Browser::Webkit => "webkit",
        }
    }
}

impl FromStr for Browser {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "chromium" | "chrome" => Ok(Browser::Chromium),
            "firefox" => Ok(Browser::Firefox),
            "webkit" | "safari" => Ok(Browser::Webkit),
            other => Err(format!("unknown browser: {}", other)),
        }
    }
}

/// Configuration for Playwright
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaywrightConfig {
    /// Base URL that relative navigation resolves against
    pub base_url: Option<String>,
    pub browser: Browser,
    pub headless: bool,
    pub viewport_width: u32,
    pub viewport_height: u32,
    /// Timeout for locating and clicking elements
    pub action_timeout_ms: u64,
    pub navigation_timeout_ms: u64,
    /// Node binary used to run the agent
    pub node_binary: PathBuf,
    /// Directory whose `node_modules` provides `playwright`
    pub project_dir: PathBuf,
}

impl Default for PlaywrightConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            browser: Browser::Chromium,
            headless: true,
            viewport_width: 1280,
            viewport_height: 720,
            action_timeout_ms: 5000,
            navigation_timeout_ms: 30000,
            node_binary: PathBuf::from("node"),
            project_dir: PathBuf::from("."),
        }
    }
}

impl PlaywrightConfig {
    fn agent_options(&self) -> serde_json::Value {
        json!({
            "browser": self.browser.as_str(),
            "headless": self.headless,
            "viewportWidth": self.viewport_width,
            "viewportHeight": self.viewport_height,
            "baseUrl": self.base_url,
            "actionTimeoutMs": self.action_timeout_ms,
            "navigationTimeoutMs": self.navigation_timeout_ms,
        })
    }
}

/// Driver that launches one Playwright agent per page
pub struct PlaywrightDriver {
    config: PlaywrightConfig,
    agent_dir: TempDir,
}

impl PlaywrightDriver {
    pub fn new(config: PlaywrightConfig) -> SuiteResult<Self> {
        Self::check_playwright_installed(&config)?;

        let agent_dir = tempfile::tempdir()?;
        std::fs::write(agent_dir.path().join("agent.js"), AGENT_SCRIPT)?;

        info!(
            "Using Playwright {} (headless: {})",
            config.browser.as_str(),
            config.headless
        );
        Ok(Self { config, agent_dir })
    }

    /// Check if Playwright is installed
    fn check_playwright_installed(config: &PlaywrightConfig) -> SuiteResult<()> {
        let output = Command::new("npx")
            .args(["playwright", "--version"])
            .current_dir(&config.project_dir)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status();

        match output {
            Ok(status) if status.success() => Ok(()),
            _ => Err(SuiteError::PlaywrightNotFound),
        }
    }

    async fn spawn_page(&self) -> SuiteResult<PlaywrightPage> {
        let agent = self.agent_dir.path().join("agent.js");
        let node_modules = self.config.project_dir.join("node_modules");
        let options = serde_json::to_string(&self.config.agent_options())?;

        debug!("Spawning Playwright agent: {}", agent.display());

        let mut child = TokioCommand::new(&self.config.node_binary)
            .arg(&agent)
            .current_dir(&self.config.project_dir)
            .env("NODE_PATH", node_modules)
            .env("NAVSUITE_AGENT_OPTIONS", options)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                SuiteError::Playwright(format!(
                    "failed to spawn {}: {}",
                    self.config.node_binary.display(),
                    e
                ))
            })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| SuiteError::Playwright("agent stdin unavailable".into()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| SuiteError::Playwright("agent stdout unavailable".into()))?;

        let mut page = PlaywrightPage {
            child,
            stdin,
            stdout: BufReader::new(stdout).lines(),
            next_id: 0,
            closed: false,
        };

        let ready: AgentReady = page.read_message().await.map_err(|e| {
            SuiteError::Playwright(format!("agent did not start: {}", e))
        })?;
        if !ready.ready {
            return Err(SuiteError::Playwright(format!(
                "browser launch failed: {}",
                ready.message.unwrap_or_default()
            )));
        }

        Ok(page)
    }
}

#[async_trait]
impl BrowserDriver for PlaywrightDriver {
    async fn new_page(&self) -> Result<Box<dyn BrowserPage>, DriverError> {
        let page = self
            .spawn_page()
            .await
            .map_err(|e| DriverError::Session(e.to_string()))?;
        Ok(Box::new(page))
    }
}

#[derive(Debug, Deserialize)]
struct AgentReady {
    ready: bool,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AgentReply {
    #[serde(default)]
    id: Option<u64>,
    ok: bool,
    #[serde(default)]
    element: Option<String>,
    #[serde(default)]
    kind: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// What the command was about, used to build a typed error from a reply
enum Subject<'a> {
    Url(&'a str),
    Text { text: &'a str, exact: bool },
    Element(&'a ElementHandle),
    Session,
}

impl AgentReply {
    fn into_result(self, subject: Subject<'_>) -> Result<Option<String>, DriverError> {
        if self.ok {
            return Ok(self.element);
        }
        let reason = self.message.unwrap_or_else(|| "unknown error".to_string());
        let err = match (self.kind.as_deref(), subject) {
            (Some("navigation"), Subject::Url(url)) => DriverError::Navigation {
                url: url.to_string(),
                reason,
            },
            (Some("not_found"), Subject::Text { text, exact }) => DriverError::NotFound {
                text: text.to_string(),
                exact,
                reason,
            },
            (Some("interaction"), Subject::Element(element)) => DriverError::Interaction {
                element: element.to_string(),
                reason,
            },
            (kind, _) => DriverError::Session(format!(
                "{}: {}",
                kind.unwrap_or("unknown"),
                reason
            )),
        };
        Err(err)
    }
}

/// A page backed by a running Playwright agent
pub struct PlaywrightPage {
    child: Child,
    stdin: ChildStdin,
    stdout: Lines<BufReader<ChildStdout>>,
    next_id: u64,
    closed: bool,
}

impl PlaywrightPage {
    async fn read_message<T: serde::de::DeserializeOwned>(&mut self) -> Result<T, DriverError> {
        let line = self
            .stdout
            .next_line()
            .await
            .map_err(|e| DriverError::Session(format!("agent read failed: {}", e)))?
            .ok_or_else(|| DriverError::Session("agent exited".to_string()))?;
        serde_json::from_str(&line)
            .map_err(|e| DriverError::Session(format!("malformed agent reply {:?}: {}", line, e)))
    }

    async fn request(
        &mut self,
        mut command: serde_json::Value,
        subject: Subject<'_>,
    ) -> Result<Option<String>, DriverError> {
        if self.closed {
            return Err(DriverError::Session("page already closed".to_string()));
        }
        self.next_id += 1;
        let id = self.next_id;
        command["id"] = json!(id);

        let mut line = command.to_string();
        line.push('\n');
        self.stdin
            .write_all(line.as_bytes())
            .await
            .map_err(|e| DriverError::Session(format!("agent write failed: {}", e)))?;
        self.stdin
            .flush()
            .await
            .map_err(|e| DriverError::Session(format!("agent write failed: {}", e)))?;

        let reply: AgentReply = self.read_message().await?;
        if reply.id != Some(id) {
            return Err(DriverError::Session(format!(
                "reply id {:?} does not match request {}",
                reply.id, id
            )));
        }
        reply.into_result(subject)
    }
}

#[async_trait]
impl BrowserPage for PlaywrightPage {
    async fn open(&mut self, url: &str) -> Result<(), DriverError> {
        self.request(json!({ "op": "open", "url": url }), Subject::Url(url))
            .await?;
        Ok(())
    }

    async fn find_by_text(
        &mut self,
        text: &str,
        exact: bool,
    ) -> Result<ElementHandle, DriverError> {
        let element = self
            .request(
                json!({ "op": "find_by_text", "text": text, "exact": exact }),
                Subject::Text { text, exact },
            )
            .await?
            .ok_or_else(|| DriverError::Session("agent returned no element id".to_string()))?;
        Ok(ElementHandle::new(element, text))
    }

    async fn click(&mut self, element: &ElementHandle) -> Result<(), DriverError> {
        self.request(
            json!({ "op": "click", "element": element.id }),
            Subject::Element(element),
        )
        .await?;
        Ok(())
    }

    async fn close(&mut self) -> Result<(), DriverError> {
        if self.closed {
            return Ok(());
        }
        let result = self
            .request(json!({ "op": "close" }), Subject::Session)
            .await
            .map(|_| ());
        self.closed = true;
        if let Err(e) = self.child.wait().await {
            warn!("Failed to reap Playwright agent: {}", e);
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reply(json: &str) -> AgentReply {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_browser_from_str() {
        assert_eq!("firefox".parse::<Browser>().unwrap(), Browser::Firefox);
        assert_eq!("Chrome".parse::<Browser>().unwrap(), Browser::Chromium);
        assert!("lynx".parse::<Browser>().is_err());
    }

    #[test]
    fn test_successful_reply_carries_element() {
        let r = reply(r#"{"id":2,"ok":true,"element":"e1"}"#);
        let element = r
            .into_result(Subject::Text {
                text: "Forms",
                exact: true,
            })
            .unwrap();
        assert_eq!(element.as_deref(), Some("e1"));
    }

    #[test]
    fn test_error_kinds_map_to_driver_errors() {
        let err = reply(r#"{"id":1,"ok":false,"kind":"navigation","message":"net::ERR"}"#)
            .into_result(Subject::Url("http://localhost:4200/"))
            .unwrap_err();
        assert!(
            matches!(err, DriverError::Navigation { url, .. } if url == "http://localhost:4200/")
        );

        let err = reply(r#"{"id":2,"ok":false,"kind":"not_found","message":"Timeout 5000ms"}"#)
            .into_result(Subject::Text {
                text: "Charts",
                exact: true,
            })
            .unwrap_err();
        assert!(matches!(err, DriverError::NotFound { exact: true, .. }));

        let handle = ElementHandle::new("e3", "Forms");
        let err = reply(
            r#"{"id":3,"ok":false,"kind":"interaction","message":"strict mode violation"}"#,
        )
        .into_result(Subject::Element(&handle))
        .unwrap_err();
        assert!(matches!(err, DriverError::Interaction { .. }));

        let err = reply(r#"{"id":4,"ok":false,"kind":"session","message":"boom"}"#)
            .into_result(Subject::Session)
            .unwrap_err();
        assert_eq!(err, DriverError::Session("session: boom".to_string()));
    }

    #[test]
    fn test_agent_options_use_config() {
        let config = PlaywrightConfig {
            base_url: Some("http://localhost:4200".into()),
            browser: Browser::Webkit,
            ..Default::default()
        };
        let opts = config.agent_options();
        assert_eq!(opts["browser"], "webkit");
        assert_eq!(opts["baseUrl"], "http://localhost:4200");
        assert_eq!(opts["actionTimeoutMs"], 5000);
    }

    const STUB_PLAYWRIGHT: &str = r#"
const page = {
  goto: async () => {},
  getByText: () => ({ first: () => ({ waitFor: async () => {} }), click: async () => {} }),
};
const context = {
  setDefaultTimeout() {},
  setDefaultNavigationTimeout() {},
  newPage: async () => page,
};
const browser = { newContext: async () => context, close: async () => {} };
module.exports = { chromium: { launch: async () => browser } };
"#;

    fn has_node() -> bool {
        Command::new("node")
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|s| s.success())
            .unwrap_or(false)
    }

    #[tokio::test]
    async fn test_agent_round_trip_and_clean_close() {
        if !has_node() {
            eprintln!("Skipping: node not available");
            return;
        }

        let project = tempfile::tempdir().unwrap();
        let module = project.path().join("node_modules").join("playwright");
        std::fs::create_dir_all(&module).unwrap();
        std::fs::write(module.join("index.js"), STUB_PLAYWRIGHT).unwrap();

        let agent_dir = tempfile::tempdir().unwrap();
        std::fs::write(agent_dir.path().join("agent.js"), AGENT_SCRIPT).unwrap();
        let driver = PlaywrightDriver {
            config: PlaywrightConfig {
                project_dir: project.path().to_path_buf(),
                ..Default::default()
            },
            agent_dir,
        };

        let mut page = driver.new_page().await.unwrap();
        page.open("http://localhost:4200/").await.unwrap();
        let forms = page.find_by_text("Forms", true).await.unwrap();
        page.click(&forms).await.unwrap();
        page.close().await.unwrap();
    }
}
