//! `navsuite list`: show the execution plan without running anything

use clap::Args;
use colored::Colorize;
use serde::Serialize;

use navsuite_e2e::{Disposition, ExecutionPlan, PlannedCase, RunnerConfig};

use super::{load_tree, SpecArgs};
use crate::output::{self, OutputFormat, TableDisplay};

#[derive(Args, Debug)]
pub struct ListArgs {
    #[command(flatten)]
    pub spec: SpecArgs,
}

#[derive(Debug, Serialize)]
struct PlannedRow {
    title: String,
    status: String,
    before_each: usize,
    after_each: usize,
    steps: usize,
}

impl From<&PlannedCase<'_>> for PlannedRow {
    fn from(case: &PlannedCase<'_>) -> Self {
        let status = match case.disposition {
            Disposition::Run => "run".to_string(),
            Disposition::Skip(reason) => format!("skip ({})", reason),
        };
        Self {
            title: case.title(),
            status,
            before_each: case.before_each.len(),
            after_each: case.after_each.len(),
            steps: case.test.body.len(),
        }
    }
}

impl TableDisplay for PlannedRow {
    fn headers() -> Vec<&'static str> {
        vec!["Test", "Status", "Before", "After", "Steps"]
    }

    fn row(&self) -> Vec<String> {
        let status = if self.status == "run" {
            self.status.green().to_string()
        } else {
            self.status.yellow().to_string()
        };
        vec![
            self.title.clone(),
            status,
            self.before_each.to_string(),
            self.after_each.to_string(),
            self.steps.to_string(),
        ]
    }
}

pub fn execute(
    args: ListArgs,
    mut config: RunnerConfig,
    format: OutputFormat,
) -> anyhow::Result<()> {
    args.spec.apply(&mut config);

    let tree = load_tree(&config)?;
    let grep = config.grep_regex()?;
    let plan = ExecutionPlan::new(&tree, grep.as_ref());

    let rows: Vec<PlannedRow> = plan.cases().iter().map(PlannedRow::from).collect();
    output::print_list(&rows, format);

    if tree.has_focus() {
        output::print_info("A focused suite is present; tests outside it are skipped");
    }
    Ok(())
}
