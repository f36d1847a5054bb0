//! CLI Commands

pub mod list;
pub mod run;

use std::path::PathBuf;

use clap::Args;
use navsuite_e2e::spec::build_tree;
use navsuite_e2e::{RunnerConfig, SpecFile, SuiteResult, SuiteTree};
use tracing::info;

/// Arguments shared by every command that loads suites
#[derive(Args, Debug)]
pub struct SpecArgs {
    /// Directory containing suite files (overrides the config file)
    #[arg(short, long)]
    pub specs: Option<PathBuf>,

    /// Only include tests whose full title matches this regular expression
    #[arg(short, long)]
    pub grep: Option<String>,
}

impl SpecArgs {
    pub fn apply(&self, config: &mut RunnerConfig) {
        if let Some(specs) = &self.specs {
            config.specs_dir = specs.clone();
        }
        if let Some(grep) = &self.grep {
            config.grep = Some(grep.clone());
        }
    }
}

/// Load every suite file under the configured directory into one tree
pub fn load_tree(config: &RunnerConfig) -> SuiteResult<SuiteTree> {
    let specs = SpecFile::load_all(&config.specs_dir)?;
    let tests: usize = specs.iter().map(SpecFile::test_count).sum();
    info!(
        "Loaded {} suite file(s) with {} test(s) from {}",
        specs.len(),
        tests,
        config.specs_dir.display()
    );
    build_tree(&specs)
}
