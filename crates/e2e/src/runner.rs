//! Sequential execution of a suite tree against a browser driver

use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::action::StepFailure;
use crate::driver::{BrowserDriver, BrowserPage};
use crate::error::{ErrorKind, SuiteResult};
use crate::plan::{Disposition, ExecutionPlan, PlannedCase, SkipReason};
use crate::suite::{Hook, SuiteTree};

/// Part of a test case that was executing when it failed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum Phase {
    /// Acquiring the page
    Setup,
    BeforeEach {
        hook: usize,
        #[serde(default)]
        title: Option<String>,
    },
    Body,
    AfterEach {
        hook: usize,
        #[serde(default)]
        title: Option<String>,
    },
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::Setup => f.write_str("setup"),
            Phase::Body => f.write_str("body"),
            Phase::BeforeEach {
                hook,
                title: Some(t),
            } => write!(f, "before_each #{} ({})", hook, t),
            Phase::BeforeEach { hook, title: None } => write!(f, "before_each #{}", hook),
            Phase::AfterEach {
                hook,
                title: Some(t),
            } => write!(f, "after_each #{} ({})", hook, t),
            Phase::AfterEach { hook, title: None } => write!(f, "after_each #{}", hook),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Failure {
    #[serde(flatten)]
    pub phase: Phase,
    /// Index of the failing step within its action sequence
    pub step_index: usize,
    pub step: String,
    pub kind: ErrorKind,
    pub message: String,
}

impl Failure {
    fn from_step(phase: Phase, failure: StepFailure) -> Self {
        Self {
            phase,
            step_index: failure.index,
            step: failure.step,
            kind: failure.error.kind(),
            message: failure.error.to_string(),
        }
    }
}

impl std::fmt::Display for Failure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} step {} [{}] {}: {}",
            self.phase, self.step_index, self.step, self.kind, self.message
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    Passed,
    Failed { failure: Failure },
    Skipped { reason: SkipReason },
}

impl Outcome {
    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Passed => "passed",
            Outcome::Failed { .. } => "failed",
            Outcome::Skipped { .. } => "skipped",
        }
    }
}

/// Result of running a single test
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseResult {
    pub title: String,
    pub path: Vec<String>,
    pub name: String,
    pub outcome: Outcome,
    pub duration_ms: u64,
}

/// Result of running a whole plan
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub started_at: DateTime<Utc>,
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub duration_ms: u64,
    pub results: Vec<CaseResult>,
}

impl RunReport {
    pub fn success(&self) -> bool {
        self.failed == 0
    }

    /// `(title, outcome)` pairs in execution order
    pub fn outcomes(&self) -> Vec<(&str, &Outcome)> {
        self.results
            .iter()
            .map(|r| (r.title.as_str(), &r.outcome))
            .collect()
    }

    pub fn find(&self, title: &str) -> Option<&CaseResult> {
        self.results.iter().find(|r| r.title == title)
    }

    /// Write results as `test-results.json` inside `output_dir`
    pub fn write_results(&self, output_dir: &Path) -> SuiteResult<PathBuf> {
        std::fs::create_dir_all(output_dir)?;

        let path = output_dir.join("test-results.json");
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, json)?;

        info!("Results written to: {}", path.display());
        Ok(path)
    }
}

/// Runs planned tests one at a time, each on a fresh page
pub struct SuiteRunner<D> {
    driver: D,
}

impl<D: BrowserDriver> SuiteRunner<D> {
    pub fn new(driver: D) -> Self {
        Self { driver }
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// Run every test in the tree, honoring focus
    pub async fn run_all(&self, tree: &SuiteTree) -> RunReport {
        let plan = ExecutionPlan::new(tree, None);
        self.run_plan(&plan).await
    }

    pub async fn run_plan(&self, plan: &ExecutionPlan<'_>) -> RunReport {
        let started_at = Utc::now();
        let start = Instant::now();
        let mut results = Vec::with_capacity(plan.len());
        let (mut passed, mut failed, mut skipped) = (0, 0, 0);

        info!(
            "Running {} test(s), {} skipped...",
            plan.runnable().count(),
            plan.skipped().count()
        );

        for case in plan.cases() {
            let result = self.run_case(case).await;
            match &result.outcome {
                Outcome::Passed => {
                    passed += 1;
                    info!("✓ {} ({} ms)", result.title, result.duration_ms);
                }
                Outcome::Failed { failure } => {
                    failed += 1;
                    error!("✗ {} - {}", result.title, failure);
                }
                Outcome::Skipped { reason } => {
                    skipped += 1;
                    debug!("- {} ({})", result.title, reason);
                }
            }
            results.push(result);
        }

        let duration_ms = start.elapsed().as_millis() as u64;

        info!(
            "Test Results: {} passed, {} failed, {} skipped ({} ms)",
            passed, failed, skipped, duration_ms
        );

        RunReport {
            started_at,
            total: plan.len(),
            passed,
            failed,
            skipped,
            duration_ms,
            results,
        }
    }

    async fn run_case(&self, case: &PlannedCase<'_>) -> CaseResult {
        let start = Instant::now();
        let outcome = match case.disposition {
            Disposition::Skip(reason) => Outcome::Skipped { reason },
            Disposition::Run => {
                debug!("Running test: {}", case.title());
                match self.execute(case).await {
                    None => Outcome::Passed,
                    Some(failure) => Outcome::Failed { failure },
                }
            }
        };

        CaseResult {
            title: case.title(),
            path: case.path.iter().map(|s| s.to_string()).collect(),
            name: case.test.name.clone(),
            outcome,
            duration_ms: start.elapsed().as_millis() as u64,
        }
    }

    /// Execute one test on its own page; returns the first failure, if any
    async fn execute(&self, case: &PlannedCase<'_>) -> Option<Failure> {
        let mut page = match self.driver.new_page().await {
            Ok(page) => page,
            Err(e) => {
                return Some(Failure {
                    phase: Phase::Setup,
                    step_index: 0,
                    step: "new_page".to_string(),
                    kind: e.kind(),
                    message: e.to_string(),
                })
            }
        };

        let mut failure = run_setup(page.as_mut(), &case.before_each).await;

        if failure.is_none() {
            if let Err(step) = case.test.body.run(page.as_mut()).await {
                failure = Some(Failure::from_step(Phase::Body, step));
            }
        }

        // Teardown always runs once the page exists; its failure never masks an earlier one.
        let teardown = run_teardown(page.as_mut(), &case.after_each).await;
        failure = failure.or(teardown);

        if let Err(e) = page.close().await {
            warn!("Failed to close page for {}: {}", case.title(), e);
        }

        failure
    }
}

/// Run setup hooks in order, stopping at the first failure
async fn run_setup(page: &mut dyn BrowserPage, hooks: &[&Hook]) -> Option<Failure> {
    for (index, hook) in hooks.iter().enumerate() {
        if let Err(step) = hook.steps.run(page).await {
            let phase = Phase::BeforeEach {
                hook: index,
                title: hook.title.clone(),
            };
            return Some(Failure::from_step(phase, step));
        }
    }
    None
}

/// Run every teardown hook, even after one fails, and keep the first failure
async fn run_teardown(page: &mut dyn BrowserPage, hooks: &[&Hook]) -> Option<Failure> {
    let mut first = None;
    for (index, hook) in hooks.iter().enumerate() {
        if let Err(step) = hook.steps.run(page).await {
            warn!("after_each #{} failed: {}", index, step.error);
            let phase = Phase::AfterEach {
                hook: index,
                title: hook.title.clone(),
            };
            first = first.or(Some(Failure::from_step(phase, step)));
        }
    }
    first
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::ActionSequence;
    use crate::scripted::ScriptedDriver;

    #[tokio::test]
    async fn test_report_counts() {
        let tree = SuiteTree::build(|root| {
            root.describe_only("focused", |s| {
                s.test("ok", ActionSequence::new().click("A"));
                s.test("broken", ActionSequence::new().click("Missing"));
            });
            root.describe("other", |s| {
                s.test("skipped", ActionSequence::new().click("A"));
            });
        })
        .unwrap();

        let runner = SuiteRunner::new(ScriptedDriver::new().with_missing_text("Missing"));
        let report = runner.run_all(&tree).await;

        assert_eq!(report.total, 3);
        assert_eq!((report.passed, report.failed, report.skipped), (1, 1, 1));
        assert!(!report.success());
        // skipped tests never acquire a page
        assert_eq!(runner.driver().pages_opened(), 2);
    }

    #[tokio::test]
    async fn test_write_results_json() {
        let tree = SuiteTree::build(|root| {
            root.test("t", ActionSequence::new().navigate("/"));
        })
        .unwrap();
        let report = SuiteRunner::new(ScriptedDriver::new()).run_all(&tree).await;

        let dir = tempfile::tempdir().unwrap();
        let path = report.write_results(dir.path()).unwrap();
        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(json["passed"], 1);
        assert_eq!(json["results"][0]["outcome"]["status"], "passed");
    }

    #[test]
    fn test_failure_serializes_flat() {
        let failure = Failure {
            phase: Phase::BeforeEach {
                hook: 1,
                title: None,
            },
            step_index: 0,
            step: "click:\"Charts\"".into(),
            kind: ErrorKind::NotFound,
            message: "gone".into(),
        };
        let json = serde_json::to_value(&Outcome::Failed { failure }).unwrap();
        assert_eq!(json["status"], "failed");
        assert_eq!(json["failure"]["phase"], "before_each");
        assert_eq!(json["failure"]["hook"], 1);
        assert_eq!(json["failure"]["kind"], "not_found");
    }
}
