use std::path::PathBuf;

use casereg_analysis::{Highlights, Reason, Scope};
use casereg_core::{Record, dates};

use super::{Workspace, parse_today, print_table};

/// Input parameters for the Report command strategy.
#[derive(Debug, Clone)]
pub struct ReportInput {
    pub file: Option<PathBuf>,
    pub today: Option<String>,
}

/// Strategy for printing every highlight at once.
///
/// One row per record with at least one reason: the row colour, the cells
/// coloured on their own, and all reasons that hold.
#[derive(Debug, Clone, Copy)]
pub struct ReportStrategy;

impl super::CommandStrategy for ReportStrategy {
    type Input = ReportInput;

    fn execute(&self, input: Self::Input) -> anyhow::Result<()> {
        let workspace = Workspace::open(input.file)?;
        let today = parse_today(input.today.as_deref())?;
        let highlights = Highlights::compute(
            &workspace.registry,
            &workspace.config.deadlines,
            &workspace.config.columns.name_field,
            today,
        );

        let fields = workspace.registry.schema().user_fields();
        let mut counts = [0_usize; Reason::ALL.len()];
        let mut rows = Vec::new();
        for record in workspace.registry.iter() {
            let reasons = highlights.reasons(record);
            if reasons.is_empty() {
                continue;
            }
            for reason in &reasons {
                counts[*reason as usize] += 1;
            }
            rows.push(vec![
                record.id().to_string(),
                workspace.label(record),
                highlights
                    .row_mark(record)
                    .map_or_else(String::new, |r| r.as_str().to_string()),
                marked_cells(&highlights, record, fields),
                reasons
                    .iter()
                    .map(|r| r.as_str())
                    .collect::<Vec<_>>()
                    .join(", "),
            ]);
        }

        print_table(&["#", "Name", "Row", "Cells", "Reasons"], &rows);
        println!(
            "\n{} of {} records highlighted as of {}",
            rows.len(),
            workspace.registry.len(),
            dates::format_date(today)
        );
        for (reason, count) in Reason::ALL.iter().zip(counts) {
            if count > 0 {
                println!("  {:<14} {count}", reason.as_str());
            }
        }
        Ok(())
    }
}

/// Cells whose colour comes from a cell-scoped reason.
fn marked_cells(highlights: &Highlights, record: &Record, fields: &[String]) -> String {
    fields
        .iter()
        .filter_map(|field| {
            highlights
                .cell_mark(record, field)
                .filter(|reason| reason.scope() == Scope::Cells)
                .map(|reason| format!("{field}={}", reason.as_str()))
        })
        .collect::<Vec<_>>()
        .join(", ")
}
