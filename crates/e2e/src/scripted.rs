//! In-memory browser driver
//!
//! `ScriptedDriver` never touches a browser. Every call succeeds unless it was
//! registered as failing, and every call is recorded together with the page
//! that issued it. The CLI uses it for `--dry-run`; tests use it to observe
//! hook order and failure isolation.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::driver::{BrowserDriver, BrowserPage, ElementHandle};
use crate::error::DriverError;

/// A recorded driver call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Open(String),
    FindByText { text: String, exact: bool },
    Click(String),
    Close,
}

#[derive(Debug, Clone, Default)]
struct Script {
    unreachable: HashSet<String>,
    missing: HashSet<String>,
    not_interactable: HashSet<String>,
}

/// Driver that records calls instead of driving a browser
#[derive(Debug, Clone, Default)]
pub struct ScriptedDriver {
    script: Arc<Script>,
    log: Arc<Mutex<Vec<(usize, Call)>>>,
    pages: Arc<AtomicUsize>,
}

impl ScriptedDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `open(url)` fail with a navigation error
    pub fn with_unreachable(mut self, url: impl Into<String>) -> Self {
        self.script_mut().unreachable.insert(url.into());
        self
    }

    /// Make `find_by_text(text, _)` fail with a not-found error
    pub fn with_missing_text(mut self, text: impl Into<String>) -> Self {
        self.script_mut().missing.insert(text.into());
        self
    }

    /// Make clicking an element found by `text` fail with an interaction error
    pub fn with_not_interactable(mut self, text: impl Into<String>) -> Self {
        self.script_mut().not_interactable.insert(text.into());
        self
    }

    fn script_mut(&mut self) -> &mut Script {
        Arc::make_mut(&mut self.script)
    }

    /// All recorded calls, in order, tagged with the issuing page number
    pub fn calls(&self) -> Vec<(usize, Call)> {
        self.log.lock().clone()
    }

    /// Calls issued by one page
    pub fn calls_for_page(&self, page: usize) -> Vec<Call> {
        self.log
            .lock()
            .iter()
            .filter(|(p, _)| *p == page)
            .map(|(_, c)| c.clone())
            .collect()
    }

    /// Number of pages handed out so far
    pub fn pages_opened(&self) -> usize {
        self.pages.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BrowserDriver for ScriptedDriver {
    async fn new_page(&self) -> Result<Box<dyn BrowserPage>, DriverError> {
        let number = self.pages.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(ScriptedPage {
            number,
            script: Arc::clone(&self.script),
            log: Arc::clone(&self.log),
            next_element: 0,
        }))
    }
}

struct ScriptedPage {
    number: usize,
    script: Arc<Script>,
    log: Arc<Mutex<Vec<(usize, Call)>>>,
    next_element: usize,
}

impl ScriptedPage {
    fn record(&self, call: Call) {
        self.log.lock().push((self.number, call));
    }
}

#[async_trait]
impl BrowserPage for ScriptedPage {
    async fn open(&mut self, url: &str) -> Result<(), DriverError> {
        self.record(Call::Open(url.to_string()));
        if self.script.unreachable.contains(url) {
            return Err(DriverError::Navigation {
                url: url.to_string(),
                reason: "net::ERR_CONNECTION_REFUSED".to_string(),
            });
        }
        Ok(())
    }

    async fn find_by_text(
        &mut self,
        text: &str,
        exact: bool,
    ) -> Result<ElementHandle, DriverError> {
        self.record(Call::FindByText {
            text: text.to_string(),
            exact,
        });
        if self.script.missing.contains(text) {
            return Err(DriverError::NotFound {
                text: text.to_string(),
                exact,
                reason: "no matching element".to_string(),
            });
        }
        self.next_element += 1;
        Ok(ElementHandle::new(format!("e{}", self.next_element), text))
    }

    async fn click(&mut self, element: &ElementHandle) -> Result<(), DriverError> {
        self.record(Call::Click(element.text.clone()));
        if self.script.not_interactable.contains(&element.text) {
            return Err(DriverError::Interaction {
                element: element.to_string(),
                reason: "element is not visible".to_string(),
            });
        }
        Ok(())
    }

    async fn close(&mut self) -> Result<(), DriverError> {
        self.record(Call::Close);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_pages_are_numbered_in_order() {
        let driver = ScriptedDriver::new();
        let mut first = driver.new_page().await.unwrap();
        let mut second = driver.new_page().await.unwrap();
        second.open("/b").await.unwrap();
        first.open("/a").await.unwrap();

        assert_eq!(driver.pages_opened(), 2);
        assert_eq!(driver.calls_for_page(0), vec![Call::Open("/a".into())]);
        assert_eq!(driver.calls_for_page(1), vec![Call::Open("/b".into())]);
    }

    #[tokio::test]
    async fn test_scripted_failures() {
        let driver = ScriptedDriver::new()
            .with_unreachable("http://localhost:1/")
            .with_not_interactable("Forms");
        let mut page = driver.new_page().await.unwrap();

        let err = page.open("http://localhost:1/").await.unwrap_err();
        assert!(matches!(err, DriverError::Navigation { .. }));

        let forms = page.find_by_text("Forms", true).await.unwrap();
        let err = page.click(&forms).await.unwrap_err();
        assert!(matches!(err, DriverError::Interaction { .. }));
    }
}
