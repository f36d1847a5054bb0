//! Browser driver seam
//!
//! The registry never talks to a browser directly. Every action goes through
//! a [`BrowserPage`] obtained from a [`BrowserDriver`], one page per test case.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::DriverError;

/// Opaque reference to an element located on a page
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElementHandle {
    /// Driver-assigned identifier, only meaningful to the page that issued it
    pub id: String,

    /// Text the element was located by
    pub text: String,
}

impl ElementHandle {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
        }
    }
}

impl std::fmt::Display for ElementHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({:?})", self.id, self.text)
    }
}

/// A single isolated browser page owned by one running test case
#[async_trait]
pub trait BrowserPage: Send {
    /// Navigate to a URL
    async fn open(&mut self, url: &str) -> Result<(), DriverError>;

    /// Locate an element by its text content
    async fn find_by_text(
        &mut self,
        text: &str,
        exact: bool,
    ) -> Result<ElementHandle, DriverError>;

    /// Click a previously located element
    async fn click(&mut self, element: &ElementHandle) -> Result<(), DriverError>;

    /// Release the page and any browser resources behind it
    async fn close(&mut self) -> Result<(), DriverError> {
        Ok(())
    }
}

/// Factory for fresh browser pages
#[async_trait]
pub trait BrowserDriver: Send + Sync {
    async fn new_page(&self) -> Result<Box<dyn BrowserPage>, DriverError>;
}

#[async_trait]
impl<D: BrowserDriver + ?Sized> BrowserDriver for std::sync::Arc<D> {
    async fn new_page(&self) -> Result<Box<dyn BrowserPage>, DriverError> {
        (**self).new_page().await
    }
}
