//! Suite tree and its builder
//!
//! A tree is declared once through [`SuiteTree::build`]. Each nested
//! declaration gets its own [`SuiteBuilder`]; when the nested body returns, the
//! finished child is appended to its parent. Once built the tree is immutable.
//!
//! ```
//! use navsuite_e2e::{ActionSequence, SuiteTree};
//!
//! let tree = SuiteTree::build(|root| {
//!     root.before_each(ActionSequence::new().navigate("http://localhost:4200/"));
//!     root.describe_only("suite1", |s| {
//!         s.before_each(ActionSequence::new().click_exact("Charts"));
//!         s.test("the first test", ActionSequence::new().click_exact("Forms"));
//!     });
//!     root.test("top level", ActionSequence::new().click("Datepicker"));
//! })
//! .unwrap();
//!
//! assert!(tree.has_focus());
//! assert_eq!(tree.test_count(), 2);
//! ```

use serde::{Deserialize, Serialize};

use crate::action::ActionSequence;
use crate::error::{SuiteError, SuiteResult};

/// Where a suite sits in the declaration structure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuiteKind {
    /// The implicit top of the tree
    Root,
    /// One loaded spec file
    File,
    /// A declared suite
    Describe,
}

/// A setup or teardown hook
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hook {
    #[serde(default)]
    pub title: Option<String>,
    pub steps: ActionSequence,
}

impl Hook {
    pub fn new(steps: ActionSequence) -> Self {
        Self { title: None, steps }
    }

    pub fn titled(title: impl Into<String>, steps: ActionSequence) -> Self {
        Self {
            title: Some(title.into()),
            steps,
        }
    }
}

impl From<ActionSequence> for Hook {
    fn from(steps: ActionSequence) -> Self {
        Hook::new(steps)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestCase {
    pub name: String,
    pub body: ActionSequence,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SuiteChild {
    Test(TestCase),
    Suite(Suite),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suite {
    pub name: String,
    pub kind: SuiteKind,
    pub focused: bool,
    pub before_each: Vec<Hook>,
    pub after_each: Vec<Hook>,
    pub children: Vec<SuiteChild>,
}

impl Suite {
    fn new(name: impl Into<String>, kind: SuiteKind, focused: bool) -> Self {
        Self {
            name: name.into(),
            kind,
            focused,
            before_each: Vec::new(),
            after_each: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Tests declared directly in this suite
    pub fn tests(&self) -> impl Iterator<Item = &TestCase> {
        self.children.iter().filter_map(|c| match c {
            SuiteChild::Test(t) => Some(t),
            SuiteChild::Suite(_) => None,
        })
    }

    /// Suites declared directly in this suite
    pub fn suites(&self) -> impl Iterator<Item = &Suite> {
        self.children.iter().filter_map(|c| match c {
            SuiteChild::Suite(s) => Some(s),
            SuiteChild::Test(_) => None,
        })
    }

    /// Whether this suite or any descendant is focused
    pub fn contains_focus(&self) -> bool {
        self.focused || self.suites().any(Suite::contains_focus)
    }

    /// Number of tests in this subtree
    pub fn test_count(&self) -> usize {
        self.tests().count() + self.suites().map(Suite::test_count).sum::<usize>()
    }
}

/// Accumulator for one suite's declarations
pub struct SuiteBuilder {
    suite: Suite,
    errors: Vec<SuiteError>,
}

impl SuiteBuilder {
    fn new(name: impl Into<String>, kind: SuiteKind, focused: bool) -> Self {
        Self {
            suite: Suite::new(name, kind, focused),
            errors: Vec::new(),
        }
    }

    /// Name of the suite being declared
    pub fn name(&self) -> &str {
        &self.suite.name
    }

    /// Register a hook run before every test in this suite and its descendants
    pub fn before_each(&mut self, hook: impl Into<Hook>) -> &mut Self {
        self.suite.before_each.push(hook.into());
        self
    }

    /// Register a hook run after every test in this suite and its descendants
    pub fn after_each(&mut self, hook: impl Into<Hook>) -> &mut Self {
        self.suite.after_each.push(hook.into());
        self
    }

    /// Register a test case. Names must be unique within this suite.
    pub fn test(&mut self, name: impl Into<String>, body: ActionSequence) -> &mut Self {
        let name = name.into();
        if self.suite.tests().any(|t| t.name == name) {
            self.errors.push(SuiteError::DuplicateTest {
                suite: self.suite.name.clone(),
                name,
            });
            return self;
        }
        self.suite
            .children
            .push(SuiteChild::Test(TestCase { name, body }));
        self
    }

    /// Declare a nested suite, optionally focused
    pub fn suite<F>(&mut self, name: impl Into<String>, focused: bool, body: F) -> &mut Self
    where
        F: FnOnce(&mut SuiteBuilder),
    {
        self.nested(name, SuiteKind::Describe, focused, body)
    }

    pub fn describe<F>(&mut self, name: impl Into<String>, body: F) -> &mut Self
    where
        F: FnOnce(&mut SuiteBuilder),
    {
        self.suite(name, false, body)
    }

    /// Declare a focused suite; while any suite is focused, only tests under
    /// focused suites and top-level tests run
    pub fn describe_only<F>(&mut self, name: impl Into<String>, body: F) -> &mut Self
    where
        F: FnOnce(&mut SuiteBuilder),
    {
        self.suite(name, true, body)
    }

    /// Declare a file scope. Tests directly inside it count as top-level.
    pub fn file<F>(&mut self, name: impl Into<String>, body: F) -> &mut Self
    where
        F: FnOnce(&mut SuiteBuilder),
    {
        self.nested(name, SuiteKind::File, false, body)
    }

    fn nested<F>(
        &mut self,
        name: impl Into<String>,
        kind: SuiteKind,
        focused: bool,
        body: F,
    ) -> &mut Self
    where
        F: FnOnce(&mut SuiteBuilder),
    {
        let mut child = SuiteBuilder::new(name, kind, focused);
        body(&mut child);
        self.errors.append(&mut child.errors);
        self.suite.children.push(SuiteChild::Suite(child.suite));
        self
    }

    fn finish(self) -> SuiteResult<Suite> {
        match self.errors.into_iter().next() {
            Some(err) => Err(err),
            None => Ok(self.suite),
        }
    }
}

/// An immutable, fully declared suite tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuiteTree {
    root: Suite,
}

impl SuiteTree {
    /// Run the declarations in `body` against a fresh root and freeze the result
    pub fn build<F>(body: F) -> SuiteResult<Self>
    where
        F: FnOnce(&mut SuiteBuilder),
    {
        let mut root = SuiteBuilder::new("", SuiteKind::Root, false);
        body(&mut root);
        Ok(Self {
            root: root.finish()?,
        })
    }

    pub fn root(&self) -> &Suite {
        &self.root
    }

    /// Whether any suite in the tree is focused
    pub fn has_focus(&self) -> bool {
        self.root.contains_focus()
    }

    pub fn test_count(&self) -> usize {
        self.root.test_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn click(text: &str) -> ActionSequence {
        ActionSequence::new().click(text)
    }

    #[test]
    fn test_declaration_order_is_kept() {
        let tree = SuiteTree::build(|root| {
            root.test("a", click("A"));
            root.describe("s", |s| {
                s.test("b", click("B"));
            });
            root.test("c", click("C"));
        })
        .unwrap();

        let names: Vec<_> = tree
            .root()
            .children
            .iter()
            .map(|c| match c {
                SuiteChild::Test(t) => t.name.as_str(),
                SuiteChild::Suite(s) => s.name.as_str(),
            })
            .collect();
        assert_eq!(names, vec!["a", "s", "c"]);
        assert_eq!(tree.test_count(), 3);
        assert!(!tree.has_focus());
    }

    #[test]
    fn test_duplicate_test_in_nested_suite_fails_build() {
        let err = SuiteTree::build(|root| {
            root.describe("suite1", |s| {
                s.test("t", click("A"));
                s.test("t", click("B"));
            });
        })
        .unwrap_err();

        match err {
            SuiteError::DuplicateTest { suite, name } => {
                assert_eq!(suite, "suite1");
                assert_eq!(name, "t");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_same_names_in_different_suites_are_allowed() {
        let tree = SuiteTree::build(|root| {
            root.describe("suite1", |s| {
                s.test("t", click("A"));
            });
            root.describe("suite1", |s| {
                s.test("t", click("B"));
            });
        })
        .unwrap();
        assert_eq!(tree.test_count(), 2);
    }

    #[test]
    fn test_nested_focus_is_visible_from_root() {
        let tree = SuiteTree::build(|root| {
            root.file("nav.yaml", |f| {
                f.describe("outer", |o| {
                    o.describe_only("inner", |i| {
                        i.test("t", click("A"));
                    });
                });
            });
        })
        .unwrap();
        assert!(tree.has_focus());
    }
}
