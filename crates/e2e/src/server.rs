//! Application server management - spawning and health checking the app under test

use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tokio::time::sleep;
use tracing::{info, warn};

use crate::error::{SuiteError, SuiteResult};

/// Configuration for launching the application under test
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WebServerConfig {
    /// Shell command that serves the application (run through `sh -c`)
    pub command: String,

    /// URL polled until the application answers
    pub url: String,

    /// Working directory for the command
    pub cwd: Option<PathBuf>,

    /// Skip spawning when something already answers at `url`
    pub reuse_existing: bool,

    pub startup_timeout_secs: u64,
}

impl Default for WebServerConfig {
    fn default() -> Self {
        Self {
            command: "npm start".to_string(),
            url: "http://localhost:4200/".to_string(),
            cwd: None,
            reuse_existing: true,
            startup_timeout_secs: 120,
        }
    }
}

/// Handle to the application server. Stops the server when dropped.
pub struct WebServer {
    child: Option<Child>,
    url: String,
}

impl WebServer {
    /// Start the server, or attach to one already answering when allowed
    pub async fn start(config: WebServerConfig) -> SuiteResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(2))
            .build()?;

        if config.reuse_existing && is_up(&client, &config.url).await {
            info!("Reusing server already running at {}", config.url);
            return Ok(Self {
                child: None,
                url: config.url,
            });
        }

        info!("Starting web server: {}", config.command);

        let mut cmd = Command::new("sh");
        cmd.arg("-c")
            .arg(&config.command)
            .stdout(Stdio::null())
            .stderr(Stdio::inherit());
        if let Some(cwd) = &config.cwd {
            cmd.current_dir(cwd);
        }
        // Own process group, so stopping reaches whatever the shell launched.
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            cmd.process_group(0);
        }

        let child = cmd.spawn().map_err(|e| {
            SuiteError::ServerStartup(format!("Failed to spawn {:?}: {}", config.command, e))
        })?;

        let mut server = Self {
            child: Some(child),
            url: config.url,
        };

        if let Err(e) = server
            .wait_for_healthy(&client, Duration::from_secs(config.startup_timeout_secs))
            .await
        {
            let _ = server.stop();
            return Err(e);
        }

        info!("Server is healthy at {}", server.url);
        Ok(server)
    }

    /// Poll the URL until it answers
    async fn wait_for_healthy(
        &mut self,
        client: &reqwest::Client,
        timeout: Duration,
    ) -> SuiteResult<()> {
        let start = Instant::now();
        let mut attempts = 0;

        while start.elapsed() < timeout {
            attempts += 1;

            if let Some(child) = self.child.as_mut() {
                if let Some(status) = child.try_wait()? {
                    return Err(SuiteError::ServerStartup(format!(
                        "server command exited early with {}",
                        status
                    )));
                }
            }

            match client.get(&self.url).send().await {
                Ok(resp) if resp.status().is_success() || resp.status().is_redirection() => {
                    return Ok(());
                }
                Ok(resp) => {
                    warn!("Health check returned {}", resp.status());
                }
                Err(e) => {
                    if attempts == 1 {
                        info!("Waiting for server to start...");
                    }
                    // Connection refused is expected while the server is starting
                    if !e.is_connect() {
                        warn!("Health check error: {}", e);
                    }
                }
            }

            sleep(Duration::from_millis(100)).await;
        }

        Err(SuiteError::ServerHealthCheck(attempts))
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Whether this handle spawned the server (as opposed to reusing one)
    pub fn is_owned(&self) -> bool {
        self.child.is_some()
    }

    /// Stop the server if this handle started it
    pub fn stop(&mut self) -> SuiteResult<()> {
        let Some(mut child) = self.child.take() else {
            return Ok(());
        };
        info!("Stopping server (pid: {})", child.id());

        // Try graceful shutdown first
        #[cfg(unix)]
        {
            use nix::sys::signal::{killpg, Signal};
            use nix::unistd::Pid;

            let group = Pid::from_raw(child.id() as i32);
            if killpg(group, Signal::SIGTERM).is_ok() {
                std::thread::sleep(Duration::from_millis(500));
                let _ = killpg(group, Signal::SIGKILL);
            }
        }

        // Force kill if still running
        let _ = child.kill();
        let _ = child.wait();

        Ok(())
    }
}

impl Drop for WebServer {
    fn drop(&mut self) {
        let _ = self.stop();
    }
}

async fn is_up(client: &reqwest::Client, url: &str) -> bool {
    match client.get(url).send().await {
        Ok(resp) => resp.status().is_success() || resp.status().is_redirection(),
        Err(_) => false,
    }
}
