use std::path::PathBuf;

use casereg_analysis::DuplicateDetector;

use super::{Workspace, print_table};

/// Input parameters for the Duplicates command strategy.
#[derive(Debug, Clone)]
pub struct DuplicatesInput {
    pub file: Option<PathBuf>,
}

/// Strategy for listing records that share a person name.
#[derive(Debug, Clone, Copy)]
pub struct DuplicatesStrategy;

impl super::CommandStrategy for DuplicatesStrategy {
    type Input = DuplicatesInput;

    fn execute(&self, input: Self::Input) -> anyhow::Result<()> {
        let workspace = Workspace::open(input.file)?;
        let registry = &workspace.registry;
        let name_field = &workspace.config.columns.name_field;
        let groups = DuplicateDetector::groups(registry, name_field);

        if groups.is_empty() {
            println!("No duplicate names");
            return Ok(());
        }

        let rows: Vec<Vec<String>> = groups
            .iter()
            .flat_map(|(key, ids)| {
                ids.iter().map(move |id| {
                    let full = registry
                        .get(*id)
                        .map(|record| record.value(name_field).render())
                        .unwrap_or_default();
                    vec![key.clone(), id.to_string(), full]
                })
            })
            .collect();
        print_table(&["Name", "#", name_field.as_str()], &rows);
        println!("\n{} names shared by {} records", groups.len(), rows.len());
        Ok(())
    }
}
