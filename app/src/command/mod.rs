//! Static strategy pattern for CLI commands.
//!
//! Each subcommand is its own strategy type with its own input, dispatched
//! statically from `main`.

use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate};
use tracing::{info, warn};

use casereg_config::Config;
use casereg_core::{Record, Registry, dates};

use crate::loader;

mod deadlines;
mod duplicates;
mod filter;
mod init;
mod matching;
mod report;

pub use deadlines::{DeadlinesInput, DeadlinesStrategy};
pub use duplicates::{DuplicatesInput, DuplicatesStrategy};
pub use filter::{FilterInput, FilterStrategy};
pub use init::InitStrategy;
pub use matching::{MatchInput, MatchStrategy};
pub use report::{ReportInput, ReportStrategy};

/// Core trait defining the contract for all command strategies.
///
/// Adding a command means adding a type that implements this trait and a
/// variant in the CLI that builds its input.
pub trait CommandStrategy: Send + Sync + 'static {
    /// The input type this strategy accepts.
    type Input;

    /// Execute the command with the given input.
    ///
    /// # Errors
    /// Returns an error if the registry cannot be loaded or the input does
    /// not parse.
    fn execute(&self, input: Self::Input) -> anyhow::Result<()>;
}

/// Configuration plus the registry a command works on.
struct Workspace {
    config: Config,
    registry: Registry,
}

impl Workspace {
    /// Loads the configuration and the registry snapshot.
    ///
    /// Without an explicit path the last opened snapshot is used. The path
    /// is remembered for next time; failing to remember it is not an error.
    fn open(file: Option<PathBuf>) -> anyhow::Result<Self> {
        let mut config = Config::load_or_default()?;
        let path = match file {
            Some(path) => path,
            None => config.last_file.clone().ok_or_else(|| {
                anyhow::anyhow!("No registry file given and none was opened before")
            })?,
        };

        let registry = loader::load_registry(&path, &config.columns)?;
        info!(
            "Loaded {} records, {} columns from {}",
            registry.len(),
            registry.schema().len(),
            path.display()
        );

        if let Err(e) = config.save_last_file(&path) {
            warn!("Could not remember {}: {e}", path.display());
        }
        Ok(Self { config, registry })
    }

    /// The record's person name, or its id when the name column is empty.
    fn label(&self, record: &Record) -> String {
        let name = record.value(&self.config.columns.name_field);
        if name.is_missing() {
            record.id().to_string()
        } else {
            name.render()
        }
    }
}

fn parse_today(raw: Option<&str>) -> anyhow::Result<NaiveDate> {
    match raw {
        Some(raw) => Ok(dates::parse_date(raw)?),
        None => Ok(Local::now().date_naive()),
    }
}

fn read_text(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Cannot read {}: {e}", path.display()))
}

/// Prints rows as left-aligned columns under a header.
fn print_table(headers: &[&str], rows: &[Vec<String>]) {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    print_row(headers.iter().copied(), &widths);
    print_row(rule.iter().map(String::as_str), &widths);
    for row in rows {
        print_row(row.iter().map(String::as_str), &widths);
    }
}

fn print_row<'a>(cells: impl Iterator<Item = &'a str>, widths: &[usize]) {
    let padded: Vec<String> = cells
        .zip(widths)
        .map(|(cell, width)| {
            let pad = width.saturating_sub(cell.chars().count());
            format!("{cell}{}", " ".repeat(pad))
        })
        .collect();
    println!("{}", padded.join("  ").trim_end());
}
