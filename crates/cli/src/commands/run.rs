//! `navsuite run`: execute suites in a browser

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use tracing::info;

use navsuite_e2e::playwright::{Browser, PlaywrightDriver};
use navsuite_e2e::server::WebServer;
use navsuite_e2e::{
    BrowserDriver, ExecutionPlan, RunReport, RunnerConfig, ScriptedDriver, SuiteRunner,
};

use super::{load_tree, SpecArgs};
use crate::output::{self, OutputFormat};

#[derive(Args, Debug)]
pub struct RunArgs {
    #[command(flatten)]
    pub spec: SpecArgs,

    /// Browser to use (chromium, firefox, webkit)
    #[arg(long)]
    pub browser: Option<Browser>,

    /// Show the browser window
    #[arg(long)]
    pub headed: bool,

    /// Base URL for relative navigation
    #[arg(long, env = "NAVSUITE_BASE_URL")]
    pub base_url: Option<String>,

    /// Output directory for results
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Do not start the configured web server
    #[arg(long)]
    pub no_server: bool,

    /// Walk the plan with an in-memory driver instead of a browser
    #[arg(long)]
    pub dry_run: bool,
}

impl RunArgs {
    fn apply(&self, config: &mut RunnerConfig) {
        self.spec.apply(config);
        if let Some(browser) = self.browser {
            config.playwright.browser = browser;
        }
        if self.headed {
            config.playwright.headless = false;
        }
        if let Some(base_url) = &self.base_url {
            config.playwright.base_url = Some(base_url.clone());
        }
        if let Some(output) = &self.output {
            config.output_dir = output.clone();
        }
        if self.no_server || self.dry_run {
            config.web_server = None;
        }
    }
}

/// Returns whether every test passed
pub async fn execute(
    args: RunArgs,
    mut config: RunnerConfig,
    format: OutputFormat,
) -> anyhow::Result<bool> {
    args.apply(&mut config);

    let tree = load_tree(&config)?;
    let grep = config.grep_regex()?;
    let plan = ExecutionPlan::new(&tree, grep.as_ref());

    let report = if args.dry_run {
        info!("Dry run: no browser will be launched");
        run_with(ScriptedDriver::new(), &plan).await
    } else {
        // Keep the server alive until the run is over.
        let _server = match config.web_server.clone() {
            Some(server) => {
                let server = WebServer::start(server)
                    .await
                    .context("starting web server")?;
                if server.is_owned() {
                    info!("Serving application at {}", server.url());
                } else {
                    info!("Using existing application at {}", server.url());
                }
                Some(server)
            }
            None => None,
        };
        let driver = PlaywrightDriver::new(config.playwright.clone())?;
        run_with(driver, &plan).await
    };

    report
        .write_results(&config.output_dir)
        .context("writing test results")?;
    output::print_report(&report, format);

    Ok(report.success())
}

async fn run_with<D: BrowserDriver>(driver: D, plan: &ExecutionPlan<'_>) -> RunReport {
    SuiteRunner::new(driver).run_plan(plan).await
}
