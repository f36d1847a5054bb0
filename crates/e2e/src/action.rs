//! Actions and action sequences executed against a browser page

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::driver::BrowserPage;
use crate::error::DriverError;

/// A single step against the browser driver
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    /// Navigate to a URL (relative URLs resolve against the driver's base URL)
    Navigate { url: String },

    /// Locate an element by text and click it
    Click {
        text: String,
        #[serde(default)]
        exact: bool,
    },
}

impl Action {
    pub fn navigate(url: impl Into<String>) -> Self {
        Action::Navigate { url: url.into() }
    }

    pub fn click(text: impl Into<String>) -> Self {
        Action::Click {
            text: text.into(),
            exact: false,
        }
    }

    pub fn click_exact(text: impl Into<String>) -> Self {
        Action::Click {
            text: text.into(),
            exact: true,
        }
    }

    /// Short label used in logs and failure reports
    pub fn describe(&self) -> String {
        match self {
            Action::Navigate { url } => format!("navigate:{}", url),
            Action::Click { text, exact: true } => format!("click:{:?} (exact)", text),
            Action::Click { text, exact: false } => format!("click:{:?}", text),
        }
    }

    async fn perform(&self, page: &mut dyn BrowserPage) -> Result<(), DriverError> {
        match self {
            Action::Navigate { url } => page.open(url).await,
            Action::Click { text, exact } => {
                let element = page.find_by_text(text, *exact).await?;
                page.click(&element).await
            }
        }
    }
}

/// The step that stopped an action sequence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepFailure {
    pub index: usize,
    pub step: String,
    pub error: DriverError,
}

/// An ordered list of actions, run in order until the first failure
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActionSequence(Vec<Action>);

impl ActionSequence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn navigate(mut self, url: impl Into<String>) -> Self {
        self.0.push(Action::navigate(url));
        self
    }

    pub fn click(mut self, text: impl Into<String>) -> Self {
        self.0.push(Action::click(text));
        self
    }

    pub fn click_exact(mut self, text: impl Into<String>) -> Self {
        self.0.push(Action::click_exact(text));
        self
    }

    pub fn actions(&self) -> &[Action] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Execute every action against `page`, stopping at the first error
    pub async fn run(&self, page: &mut dyn BrowserPage) -> Result<(), StepFailure> {
        for (index, action) in self.0.iter().enumerate() {
            debug!("Executing step: {}", action.describe());
            if let Err(error) = action.perform(page).await {
                return Err(StepFailure {
                    index,
                    step: action.describe(),
                    error,
                });
            }
        }
        Ok(())
    }
}

impl From<Vec<Action>> for ActionSequence {
    fn from(actions: Vec<Action>) -> Self {
        Self(actions)
    }
}

impl FromIterator<Action> for ActionSequence {
    fn from_iter<I: IntoIterator<Item = Action>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::BrowserDriver;
    use crate::scripted::{Call, ScriptedDriver};

    #[test]
    fn test_parse_actions_from_yaml() {
        let yaml = r#"
- action: navigate
  url: http://localhost:4200/
- action: click
  text: Forms
  exact: true
- action: click
  text: Form Layouts
"#;
        let seq: ActionSequence = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(
            seq,
            ActionSequence::new()
                .navigate("http://localhost:4200/")
                .click_exact("Forms")
                .click("Form Layouts")
        );
    }

    #[tokio::test]
    async fn test_click_is_find_then_click() {
        let driver = ScriptedDriver::new();
        let mut page = driver.new_page().await.unwrap();
        ActionSequence::new()
            .click_exact("Charts")
            .run(page.as_mut())
            .await
            .unwrap();

        assert_eq!(
            driver.calls_for_page(0),
            vec![
                Call::FindByText {
                    text: "Charts".into(),
                    exact: true
                },
                Call::Click("Charts".into()),
            ]
        );
    }

    #[tokio::test]
    async fn test_run_stops_at_first_failure() {
        let driver = ScriptedDriver::new().with_missing_text("Charts");
        let mut page = driver.new_page().await.unwrap();
        let failure = ActionSequence::new()
            .navigate("/")
            .click("Charts")
            .click("Forms")
            .run(page.as_mut())
            .await
            .unwrap_err();

        assert_eq!(failure.index, 1);
        assert_eq!(failure.step, "click:\"Charts\"");
        // "Forms" must never be looked up
        assert_eq!(driver.calls_for_page(0).len(), 2);
    }
}
