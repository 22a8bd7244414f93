use std::path::PathBuf;

use tracing::warn;

use casereg_analysis::{FilterCondition, Highlights, Operator, RegistryQuery};
use casereg_core::Registry;

use super::{Workspace, parse_today, print_table};
use crate::loader;

/// Input parameters for the Filter command strategy.
#[derive(Debug, Clone)]
pub struct FilterInput {
    pub file: Option<PathBuf>,
    /// `field:operator[:operand]` strings
    pub conditions: Vec<String>,
    pub facet: Option<String>,
    pub search: Option<String>,
    pub hide_deleted: bool,
    pub export: Option<PathBuf>,
}

/// Strategy for filtering the registry.
///
/// Conditions are applied first, then the facet, then the text search.
/// Each printed row carries its strongest highlight.
#[derive(Debug, Clone, Copy)]
pub struct FilterStrategy;

impl super::CommandStrategy for FilterStrategy {
    type Input = FilterInput;

    fn execute(&self, input: Self::Input) -> anyhow::Result<()> {
        let workspace = Workspace::open(input.file)?;
        let registry = &workspace.registry;
        let columns = &workspace.config.columns;

        let mut query = RegistryQuery::new();
        for raw in &input.conditions {
            let condition = parse_condition(raw, registry)?;
            println!("• {condition}");
            query = query.with_condition(condition);
        }
        if let Some(facet) = input.facet {
            let choices = registry.facet_values(&columns.facet_field);
            if !choices.contains(&facet) {
                warn!(
                    "'{facet}' is not a value of '{}'; known: {}",
                    columns.facet_field,
                    choices.join(", ")
                );
            }
            query = query.with_facet(columns.facet_field.clone(), facet);
        }
        if let Some(search) = input.search {
            query = query.with_search(search);
        }

        let mut view = query.run(registry);
        if input.hide_deleted {
            view = view.filter(|record| !record.is_deleted());
        }

        let highlights = Highlights::compute(
            registry,
            &workspace.config.deadlines,
            &columns.name_field,
            parse_today(None)?,
        );
        let rows: Vec<Vec<String>> = view
            .records()
            .map(|record| {
                vec![
                    record.id().to_string(),
                    workspace.label(record),
                    record.value(&columns.facet_field).render(),
                    highlights
                        .reasons(record)
                        .first()
                        .map_or_else(String::new, |r| r.as_str().to_string()),
                ]
            })
            .collect();
        print_table(&["#", "Name", "Facet", "Highlight"], &rows);
        println!("\n{} of {} records", view.len(), registry.len());

        if let Some(path) = input.export {
            loader::export_view(&view, &path)?;
            println!("✅ Exported {} records to {}", view.len(), path.display());
        }
        Ok(())
    }
}

/// Parses `field:operator[:operand]`.
///
/// The operand is read according to the column type inferred from the
/// registry. Conditions on columns the registry does not have are accepted
/// and later ignored by the filter.
fn parse_condition(raw: &str, registry: &Registry) -> anyhow::Result<FilterCondition> {
    let mut parts = raw.splitn(3, ':');
    let field = parts.next().unwrap_or_default().trim();
    let operator = parts
        .next()
        .ok_or_else(|| anyhow::anyhow!("Condition '{raw}' needs `field:operator[:operand]`"))?;
    let operand = parts.next().unwrap_or_default();

    if field.is_empty() {
        anyhow::bail!("Condition '{raw}' has no field");
    }
    if !registry.schema().contains(field) {
        warn!("Column '{field}' is not in the registry; condition ignored");
    }

    let operator: Operator = operator
        .parse()
        .map_err(|e| anyhow::anyhow!("{e}; expected one of: {}", operator_names()))?;
    let condition = FilterCondition::parse(field, operator, operand, registry.column_kind(field))?;
    Ok(condition)
}

fn operator_names() -> String {
    Operator::ALL
        .iter()
        .map(|op| op.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}
