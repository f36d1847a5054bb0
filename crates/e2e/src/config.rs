//! Runner configuration

use std::path::{Path, PathBuf};

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{SuiteError, SuiteResult};
use crate::playwright::PlaywrightConfig;
use crate::server::WebServerConfig;

/// Top-level configuration, usually read from `navsuite.toml`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    /// Directory searched for `*.yaml` / `*.yml` suite files
    pub specs_dir: PathBuf,

    /// Output directory for results
    pub output_dir: PathBuf,

    /// Only run tests whose full title matches this pattern
    pub grep: Option<String>,

    pub playwright: PlaywrightConfig,

    /// Application to start before running, if any
    pub web_server: Option<WebServerConfig>,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            specs_dir: PathBuf::from("tests/specs"),
            output_dir: PathBuf::from("test-results"),
            grep: None,
            playwright: PlaywrightConfig::default(),
            web_server: None,
        }
    }
}

impl RunnerConfig {
    pub fn from_toml(toml: &str) -> SuiteResult<Self> {
        toml::from_str(toml).map_err(SuiteError::from)
    }

    pub fn from_file(path: &Path) -> SuiteResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            SuiteError::InvalidConfig(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_toml(&content)
    }

    /// Compile the grep pattern, if one is set
    pub fn grep_regex(&self) -> SuiteResult<Option<Regex>> {
        self.grep
            .as_deref()
            .map(Regex::new)
            .transpose()
            .map_err(SuiteError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::playwright::Browser;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = RunnerConfig::from_toml("").unwrap();
        assert_eq!(config.specs_dir, PathBuf::from("tests/specs"));
        assert!(config.web_server.is_none());
        assert!(config.playwright.headless);
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
specs_dir = "e2e"
grep = "datepicker"

[playwright]
browser = "firefox"
headless = false
base_url = "http://localhost:4200"

[web_server]
command = "npx ng serve"
startup_timeout_secs = 60
"#;
        let config = RunnerConfig::from_toml(toml).unwrap();
        assert_eq!(config.specs_dir, PathBuf::from("e2e"));
        assert_eq!(config.playwright.browser, Browser::Firefox);
        assert!(!config.playwright.headless);
        assert_eq!(config.playwright.viewport_width, 1280);
        let server = config.web_server.unwrap();
        assert_eq!(server.startup_timeout_secs, 60);
        assert_eq!(server.url, "http://localhost:4200/");
    }

    #[test]
    fn test_invalid_grep_is_an_error() {
        let config = RunnerConfig {
            grep: Some("(".into()),
            ..Default::default()
        };
        assert!(matches!(config.grep_regex(), Err(SuiteError::Regex(_))));
    }
}
