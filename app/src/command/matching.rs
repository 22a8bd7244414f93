use std::path::PathBuf;

use casereg_analysis::{DobPolicy, ExternalTable, MatchAnalyzer, MatchMode, ModeResult};
use casereg_core::RecordId;

use super::{Workspace, print_table, read_text};

const SNIPPET_CHARS: usize = 40;

/// Input parameters for the Match command strategy.
#[derive(Debug, Clone)]
pub struct MatchInput {
    pub file: Option<PathBuf>,
    pub text: PathBuf,
    /// Tab-separated rows, one per line
    pub table: Option<PathBuf>,
    pub dob_window: Option<usize>,
}

/// Strategy for cross-referencing the registry against a document.
///
/// Runs name matching and case-number matching over the records that are
/// not deleted and prints both results with the first mention of each hit.
#[derive(Debug, Clone, Copy)]
pub struct MatchStrategy;

impl super::CommandStrategy for MatchStrategy {
    type Input = MatchInput;

    fn execute(&self, input: Self::Input) -> anyhow::Result<()> {
        let workspace = Workspace::open(input.file)?;
        let text = read_text(&input.text)?;
        let table = match &input.table {
            Some(path) => Some(parse_table(&read_text(path)?)),
            None => None,
        };

        let mut config = workspace.config.matching.clone();
        if let Some(window) = input.dob_window {
            config.dob_policy = DobPolicy::RequireNearby { window };
        }

        let view = workspace.registry.view().filter(|record| !record.is_deleted());
        let results = MatchAnalyzer::find_matches(&view, &text, table.as_ref(), &config);

        for mode in [MatchMode::Name, MatchMode::Case] {
            let result = results.mode(mode);
            println!("== {} ==", mode.as_str());
            print_mode(&workspace, result, &text);
            println!();
        }
        Ok(())
    }
}

fn print_mode(workspace: &Workspace, result: &ModeResult, text: &str) {
    let rows: Vec<Vec<String>> = result
        .matches
        .iter()
        .map(|entry| {
            vec![
                entry.id.to_string(),
                entry.label.clone(),
                entry.count.to_string(),
                entry
                    .offsets
                    .first()
                    .map(|offset| snippet(text, *offset))
                    .unwrap_or_default(),
                join_numbers(&entry.table_rows),
            ]
        })
        .collect();
    print_table(&["#", "Matched", "Hits", "First mention", "Table rows"], &rows);

    let unique: Vec<String> = result
        .unique
        .iter()
        .map(|id| unique_label(workspace, *id))
        .collect();
    println!(
        "\n{} matched, {} without a mention: {}",
        result.matches.len(),
        unique.len(),
        unique.join("; ")
    );
}

fn unique_label(workspace: &Workspace, id: RecordId) -> String {
    workspace
        .registry
        .get(id)
        .map_or_else(|| id.to_string(), |record| workspace.label(record))
}

/// One line of document text starting at `offset`.
fn snippet(text: &str, offset: usize) -> String {
    text.get(offset..)
        .unwrap_or_default()
        .chars()
        .take_while(|c| *c != '\n')
        .take(SNIPPET_CHARS)
        .collect()
}

fn join_numbers(numbers: &[usize]) -> String {
    numbers
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

/// Tab-separated text, one row per non-blank line.
fn parse_table(content: &str) -> ExternalTable {
    ExternalTable::new(
        content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| line.split('\t').map(|cell| cell.trim().to_string()).collect())
            .collect(),
    )
}
