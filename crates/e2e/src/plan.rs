//! Execution planning
//!
//! One depth-first pass over the tree resolves, for every test, the hooks it
//! inherits and whether it runs at all.

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::suite::{Hook, Suite, SuiteChild, SuiteKind, SuiteTree, TestCase};

/// Why a planned test will not execute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Another suite is focused and this test is not under any focused suite
    OutsideFocus,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::OutsideFocus => f.write_str("outside focused suite"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    Run,
    Skip(SkipReason),
}

/// A test together with everything needed to execute it
#[derive(Debug, Clone)]
pub struct PlannedCase<'t> {
    /// Names of the enclosing suites, outermost first (the root is omitted)
    pub path: Vec<&'t str>,
    pub test: &'t TestCase,
    /// Setup hooks, outermost suite first
    pub before_each: Vec<&'t Hook>,
    /// Teardown hooks, innermost suite first
    pub after_each: Vec<&'t Hook>,
    pub disposition: Disposition,
}

impl PlannedCase<'_> {
    /// Full title, e.g. `first-test > suite1 > the first test`
    pub fn title(&self) -> String {
        let mut parts = self.path.clone();
        parts.push(&self.test.name);
        parts.join(" > ")
    }

    pub fn is_runnable(&self) -> bool {
        self.disposition == Disposition::Run
    }
}

#[derive(Debug, Clone)]
pub struct ExecutionPlan<'t> {
    cases: Vec<PlannedCase<'t>>,
}

/// Inherited state while walking down the tree
#[derive(Clone, Default)]
struct Scope<'t> {
    path: Vec<&'t str>,
    before_each: Vec<&'t Hook>,
    after_each: Vec<&'t Hook>,
    focused: bool,
    in_describe: bool,
}

impl<'t> ExecutionPlan<'t> {
    /// Plan every test in the tree, optionally keeping only tests whose full
    /// title matches `grep`
    pub fn new(tree: &'t SuiteTree, grep: Option<&Regex>) -> Self {
        let mut cases = Vec::new();
        let focus_active = tree.has_focus();
        walk(tree.root(), Scope::default(), focus_active, grep, &mut cases);
        Self { cases }
    }

    pub fn cases(&self) -> &[PlannedCase<'t>] {
        &self.cases
    }

    pub fn runnable(&self) -> impl Iterator<Item = &PlannedCase<'t>> {
        self.cases.iter().filter(|c| c.is_runnable())
    }

    pub fn skipped(&self) -> impl Iterator<Item = &PlannedCase<'t>> {
        self.cases.iter().filter(|c| !c.is_runnable())
    }

    pub fn len(&self) -> usize {
        self.cases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }
}

fn walk<'t>(
    suite: &'t Suite,
    mut scope: Scope<'t>,
    focus_active: bool,
    grep: Option<&Regex>,
    out: &mut Vec<PlannedCase<'t>>,
) {
    if suite.kind != SuiteKind::Root {
        scope.path.push(&suite.name);
    }
    scope.in_describe |= suite.kind == SuiteKind::Describe;
    scope.focused |= suite.focused;
    scope.before_each.extend(suite.before_each.iter());
    scope.after_each.extend(suite.after_each.iter());

    for child in &suite.children {
        match child {
            SuiteChild::Suite(nested) => walk(nested, scope.clone(), focus_active, grep, out),
            SuiteChild::Test(test) => {
                // Tests outside any declared suite are never suppressed by focus.
                let disposition = if !focus_active || scope.focused || !scope.in_describe {
                    Disposition::Run
                } else {
                    Disposition::Skip(SkipReason::OutsideFocus)
                };
                let case = PlannedCase {
                    path: scope.path.clone(),
                    test,
                    before_each: scope.before_each.clone(),
                    after_each: scope.after_each.iter().rev().copied().collect(),
                    disposition,
                };
                if grep.map_or(true, |re| re.is_match(&case.title())) {
                    out.push(case);
                }
            }
        }
    }
}
