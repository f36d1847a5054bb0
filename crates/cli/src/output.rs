//! Output formatting for CLI

use clap::ValueEnum;
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;

use navsuite_e2e::{CaseResult, Outcome, RunReport};

/// Output format
#[derive(Debug, Clone, Copy, ValueEnum, Default)]
pub enum OutputFormat {
    /// Human-readable table format
    #[default]
    Table,
    /// JSON format
    Json,
    /// YAML format
    Yaml,
    /// Plain text format
    Plain,
}

/// Trait for items that can be displayed in a table
pub trait TableDisplay {
    fn headers() -> Vec<&'static str>;
    fn row(&self) -> Vec<String>;
}

impl TableDisplay for CaseResult {
    fn headers() -> Vec<&'static str> {
        vec!["Status", "Test", "Duration", "Details"]
    }

    fn row(&self) -> Vec<String> {
        let details = match &self.outcome {
            Outcome::Passed => String::new(),
            Outcome::Failed { failure } => failure.to_string(),
            Outcome::Skipped { reason } => reason.to_string(),
        };
        vec![
            status_label(&self.outcome),
            self.title.clone(),
            format!("{} ms", self.duration_ms),
            details,
        ]
    }
}

fn status_label(outcome: &Outcome) -> String {
    match outcome {
        Outcome::Passed => "✓ passed".green().to_string(),
        Outcome::Failed { .. } => "✗ failed".red().to_string(),
        Outcome::Skipped { .. } => "- skipped".yellow().to_string(),
    }
}

/// Print a list of items
pub fn print_list<T: Serialize + TableDisplay>(items: &[T], format: OutputFormat) {
    if items.is_empty() {
        println!("No tests found.");
        return;
    }

    match format {
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic);

            table.set_header(T::headers());
            for item in items {
                table.add_row(item.row());
            }

            println!("{table}");
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(items).unwrap_or_default());
        }
        OutputFormat::Yaml => {
            println!("{}", serde_yaml::to_string(items).unwrap_or_default());
        }
        OutputFormat::Plain => {
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    println!("---");
                }
                let row = item.row();
                for (header, value) in T::headers().iter().zip(row.iter()) {
                    println!("{}: {}", header, value);
                }
            }
        }
    }
}

/// Print a full run report
pub fn print_report(report: &RunReport, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(report).unwrap_or_default());
        }
        OutputFormat::Yaml => {
            println!("{}", serde_yaml::to_string(report).unwrap_or_default());
        }
        OutputFormat::Table | OutputFormat::Plain => {
            print_list(&report.results, format);
            let summary = format!(
                "{} passed, {} failed, {} skipped ({} ms)",
                report.passed, report.failed, report.skipped, report.duration_ms
            );
            if report.success() {
                print_success(&summary);
            } else {
                print_error(&summary);
            }
        }
    }
}

/// Print success message
pub fn print_success(message: &str) {
    println!("✅ {}", message);
}

/// Print error message
pub fn print_error(message: &str) {
    eprintln!("❌ {}", message);
}

/// Print info message
pub fn print_info(message: &str) {
    println!("ℹ️  {}", message);
}
