//! Declarative YAML suite files
//!
//! Each file becomes a file scope in the suite tree. Items are declared in
//! order and are either a nested `describe` block or a `test`.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::action::ActionSequence;
use crate::error::{SuiteError, SuiteResult};
use crate::suite::{Hook, SuiteBuilder, SuiteTree};

/// A parsed spec file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpecFile {
    /// Scope name; defaults to the file stem when loaded from disk
    #[serde(default)]
    pub name: Option<String>,

    /// Human-readable description
    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub before_each: Vec<Hook>,

    #[serde(default)]
    pub after_each: Vec<Hook>,

    #[serde(default)]
    pub items: Vec<Item>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Item {
    Describe(DescribeBlock),
    Test(TestBlock),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DescribeBlock {
    pub describe: String,

    /// Focus this suite
    #[serde(default)]
    pub only: bool,

    #[serde(default)]
    pub before_each: Vec<Hook>,

    #[serde(default)]
    pub after_each: Vec<Hook>,

    #[serde(default)]
    pub items: Vec<Item>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TestBlock {
    pub test: String,
    pub steps: ActionSequence,
}

impl SpecFile {
    /// Parse a spec from YAML string
    pub fn from_yaml(yaml: &str) -> SuiteResult<Self> {
        serde_yaml::from_str(yaml).map_err(SuiteError::from)
    }

    /// Parse a spec from a YAML file
    pub fn from_file(path: &Path) -> SuiteResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let mut spec = Self::from_yaml(&content)
            .map_err(|e| SuiteError::SpecParse(format!("{}: {}", path.display(), e)))?;
        if spec.name.is_none() {
            spec.name = path
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned());
        }
        Ok(spec)
    }

    /// Load all spec files from a directory, in path order
    pub fn load_all(dir: &Path) -> SuiteResult<Vec<Self>> {
        if !dir.is_dir() {
            return Err(SuiteError::SpecParse(format!(
                "specs directory not found: {}",
                dir.display()
            )));
        }

        let mut specs = Vec::new();

        for entry in walkdir::WalkDir::new(dir).sort_by_file_name() {
            let entry = entry.map_err(|e| {
                let path = e.path().unwrap_or(dir).display().to_string();
                SuiteError::SpecParse(format!("cannot read {}: {}", path, e))
            })?;
            let is_spec = entry
                .path()
                .extension()
                .map(|ext| ext == "yaml" || ext == "yml")
                .unwrap_or(false);
            if !is_spec {
                continue;
            }

            let spec = Self::from_file(entry.path())?;
            specs.push(spec);
        }

        Ok(specs)
    }

    /// Number of tests declared in this file
    pub fn test_count(&self) -> usize {
        count_tests(&self.items)
    }

    /// Register this file's declarations as a file scope under `parent`
    pub fn declare(&self, parent: &mut SuiteBuilder) {
        let name = self.name.clone().unwrap_or_default();
        parent.file(name, |file| {
            declare_hooks(file, &self.before_each, &self.after_each);
            declare_items(file, &self.items);
        });
    }
}

/// Build one suite tree out of several spec files
pub fn build_tree(specs: &[SpecFile]) -> SuiteResult<SuiteTree> {
    SuiteTree::build(|root| {
        for spec in specs {
            spec.declare(root);
        }
    })
}

fn declare_hooks(builder: &mut SuiteBuilder, before: &[Hook], after: &[Hook]) {
    for hook in before {
        builder.before_each(hook.clone());
    }
    for hook in after {
        builder.after_each(hook.clone());
    }
}

fn declare_items(builder: &mut SuiteBuilder, items: &[Item]) {
    for item in items {
        match item {
            Item::Test(t) => {
                builder.test(t.test.clone(), t.steps.clone());
            }
            Item::Describe(d) => {
                builder.suite(d.describe.clone(), d.only, |suite| {
                    declare_hooks(suite, &d.before_each, &d.after_each);
                    declare_items(suite, &d.items);
                });
            }
        }
    }
}

fn count_tests(items: &[Item]) -> usize {
    items
        .iter()
        .map(|item| match item {
            Item::Test(_) => 1,
            Item::Describe(d) => count_tests(&d.items),
        })
        .sum()
}
