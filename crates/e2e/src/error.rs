//! Error types for suite registration and execution

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised by a browser driver while executing a single action
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DriverError {
    #[error("Navigation to {url} failed: {reason}")]
    Navigation { url: String, reason: String },

    #[error("No element matching text {text:?} (exact: {exact}): {reason}")]
    NotFound {
        text: String,
        exact: bool,
        reason: String,
    },

    #[error("Element {element} is not interactable: {reason}")]
    Interaction { element: String, reason: String },

    #[error("Browser session error: {0}")]
    Session(String),
}

/// Coarse classification of a [`DriverError`], recorded in reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Navigation,
    NotFound,
    Interaction,
    Session,
}

impl DriverError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DriverError::Navigation { .. } => ErrorKind::Navigation,
            DriverError::NotFound { .. } => ErrorKind::NotFound,
            DriverError::Interaction { .. } => ErrorKind::Interaction,
            DriverError::Session(_) => ErrorKind::Session,
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ErrorKind::Navigation => "navigation",
            ErrorKind::NotFound => "not_found",
            ErrorKind::Interaction => "interaction",
            ErrorKind::Session => "session",
        };
        f.write_str(s)
    }
}

#[derive(Error, Debug)]
pub enum SuiteError {
    #[error("Duplicate test {name:?} in suite {suite:?}")]
    DuplicateTest { suite: String, name: String },

    #[error("Test spec parse error: {0}")]
    SpecParse(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Playwright not found. Install with: npm i -D playwright && npx playwright install")]
    PlaywrightNotFound,

    #[error("Playwright error: {0}")]
    Playwright(String),

    #[error("Server failed to start: {0}")]
    ServerStartup(String),

    #[error("Server health check failed after {0} attempts")]
    ServerHealthCheck(usize),

    #[error("Driver error: {0}")]
    Driver(#[from] DriverError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid grep pattern: {0}")]
    Regex(#[from] regex::Error),
}

pub type SuiteResult<T> = Result<T, SuiteError>;
