//! navsuite E2E framework
//!
//! This crate provides a declarative suite registry for browser navigation
//! tests that:
//! - Builds an immutable suite tree through explicit nested builders
//! - Resolves inherited hooks and suite focus in one planning pass
//! - Runs each test on a fresh page behind an async driver trait
//! - Drives Playwright through a JSON-lines agent process
//! - Loads suites from declarative YAML files
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    SuiteTree (immutable)                    │
//! │    Root ── File ── Describe(focused?) ── TestCase           │
//! │            before_each / after_each hooks per suite         │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ExecutionPlan::new(tree, grep)                             │
//! │    └── [PlannedCase { hooks root→leaf, Run | Skip }]        │
//! ├─────────────────────────────────────────────────────────────┤
//! │  SuiteRunner<D: BrowserDriver>                              │
//! │    ├── new_page() per test                                  │
//! │    ├── before_each* → body → after_each*                    │
//! │    └── RunReport { passed, failed, skipped, results }       │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod action;
pub mod config;
pub mod driver;
pub mod error;
pub mod plan;
pub mod playwright;
pub mod runner;
pub mod scripted;
pub mod server;
pub mod spec;
pub mod suite;

pub use action::{Action, ActionSequence};
pub use config::RunnerConfig;
pub use driver::{BrowserDriver, BrowserPage, ElementHandle};
pub use error::{DriverError, ErrorKind, SuiteError, SuiteResult};
pub use plan::{Disposition, ExecutionPlan, PlannedCase, SkipReason};
pub use runner::{CaseResult, Outcome, RunReport, SuiteRunner};
pub use scripted::ScriptedDriver;
pub use spec::SpecFile;
pub use suite::{Hook, Suite, SuiteBuilder, SuiteTree, TestCase};
