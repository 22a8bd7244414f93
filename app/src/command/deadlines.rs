use std::path::PathBuf;

use casereg_analysis::{CaseStatus, DeadlineTracker, MeasureStatus};
use casereg_core::dates;

use super::{Workspace, parse_today, print_table};

/// Input parameters for the Deadlines command strategy.
#[derive(Debug, Clone)]
pub struct DeadlinesInput {
    pub file: Option<PathBuf>,
    /// `dd.mm.yyyy`; today when absent
    pub today: Option<String>,
}

/// Strategy for listing deadline warnings.
///
/// Measure terms that ran out or end within the warning window, and
/// search orders still waiting for a case to be opened.
#[derive(Debug, Clone, Copy)]
pub struct DeadlinesStrategy;

impl super::CommandStrategy for DeadlinesStrategy {
    type Input = DeadlinesInput;

    fn execute(&self, input: Self::Input) -> anyhow::Result<()> {
        let workspace = Workspace::open(input.file)?;
        let today = parse_today(input.today.as_deref())?;
        let config = &workspace.config.deadlines;
        let sets = DeadlineTracker::recompute_at(&workspace.registry, config, today);

        if sets.is_empty() {
            println!("No deadlines need attention as of {}", dates::format_date(today));
            return Ok(());
        }

        let mut rows = Vec::new();
        for record in workspace.registry.iter() {
            let id = record.id();
            if sets.expired.contains(&id) || sets.expiring_soon.contains(&id) {
                if let Some(deadline) = DeadlineTracker::measure_deadline(record, config, today) {
                    let status = match deadline.status {
                        MeasureStatus::Expired => "expired",
                        _ => "expiring soon",
                    };
                    rows.push(vec![
                        id.to_string(),
                        workspace.label(record),
                        "measure".to_string(),
                        status.to_string(),
                        dates::format_date(deadline.expiry),
                        format!("{} days left", deadline.days_left),
                    ]);
                }
            }
            if sets.case_warning.contains(&id) || sets.case_overdue.contains(&id) {
                if let Some(deadline) = DeadlineTracker::case_deadline(record, config, today) {
                    let status = match deadline.status {
                        CaseStatus::Overdue => "case overdue",
                        _ => "case pending",
                    };
                    rows.push(vec![
                        id.to_string(),
                        workspace.label(record),
                        "order".to_string(),
                        status.to_string(),
                        dates::format_date(deadline.order_date),
                        format!("{} days passed", deadline.days_passed),
                    ]);
                }
            }
        }

        print_table(&["#", "Name", "Rule", "Status", "Date", "Term"], &rows);
        println!(
            "\nAs of {}: {} expired, {} expiring soon, {} case warnings, {} case overdue",
            dates::format_date(today),
            sets.expired.len(),
            sets.expiring_soon.len(),
            sets.case_warning.len(),
            sets.case_overdue.len()
        );
        Ok(())
    }
}
