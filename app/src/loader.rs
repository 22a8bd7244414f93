//! Registry snapshots on disk: a JSON array of objects, one per record.
//!
//! Columns listed in the configuration as dates or booleans are converted
//! on load. Everything else keeps its JSON type.

use std::path::Path;

use chrono::NaiveDate;
use serde_json::{Map, Value as Json};
use tracing::debug;

use casereg_config::ColumnsConfig;
use casereg_core::value::parse_bool_word;
use casereg_core::{ARCHIVED_FIELD, DELETED_FIELD, Registry, RegistryView, Value, dates};

pub fn load_registry(path: &Path, columns: &ColumnsConfig) -> anyhow::Result<Registry> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Cannot read {}: {e}", path.display()))?;
    parse_registry(&content, columns)
}

pub fn parse_registry(content: &str, columns: &ColumnsConfig) -> anyhow::Result<Registry> {
    let rows: Vec<Map<String, Json>> = serde_json::from_str(content)
        .map_err(|e| anyhow::anyhow!("Registry snapshot must be an array of objects: {e}"))?;

    Ok(Registry::from_rows(
        Vec::<String>::new(),
        rows.into_iter().map(|row| {
            row.into_iter()
                .map(|(field, raw)| {
                    let value = cell(&field, raw, columns);
                    (field, value)
                })
                .collect::<Vec<_>>()
        }),
    ))
}

/// Writes the records of `view` with dates and booleans rendered as text.
pub fn export_view(view: &RegistryView<'_>, path: &Path) -> anyhow::Result<()> {
    let fields = view.registry().schema().user_fields();
    let rows: Vec<Map<String, Json>> = view
        .records()
        .map(|record| {
            let mut row: Map<String, Json> = fields
                .iter()
                .map(|field| (field.clone(), export_cell(record.value(field))))
                .collect();
            row.insert(ARCHIVED_FIELD.to_string(), Json::Bool(record.is_archived()));
            row.insert(DELETED_FIELD.to_string(), Json::Bool(record.is_deleted()));
            row
        })
        .collect();

    std::fs::write(path, serde_json::to_string_pretty(&rows)?)?;
    debug!("Exported {} records to {}", rows.len(), path.display());
    Ok(())
}

fn cell(field: &str, raw: Json, columns: &ColumnsConfig) -> Value {
    if columns.is_date_field(field) {
        date_cell(raw)
    } else if columns.is_bool_field(field) {
        Value::Bool(bool_cell(&raw))
    } else {
        plain_cell(raw)
    }
}

fn plain_cell(raw: Json) -> Value {
    match raw {
        Json::Null => Value::Null,
        Json::Bool(b) => Value::Bool(b),
        Json::Number(n) => n.as_f64().map_or(Value::Null, Value::Number),
        Json::String(s) => Value::Text(s),
        other @ (Json::Array(_) | Json::Object(_)) => Value::Text(other.to_string()),
    }
}

/// `dd.mm.yyyy` or ISO dates; other text is kept so embedded dates can
/// still be extracted.
fn date_cell(raw: Json) -> Value {
    let Json::String(text) = raw else {
        return plain_cell(raw);
    };
    if text.trim().is_empty() {
        return Value::Null;
    }
    dates::parse_date(&text)
        .ok()
        .or_else(|| NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d").ok())
        .map_or(Value::Text(text), Value::Date)
}

/// Unrecognised values read as `false`.
fn bool_cell(raw: &Json) -> bool {
    match raw {
        Json::Bool(b) => *b,
        Json::String(s) => parse_bool_word(s).unwrap_or(false),
        Json::Number(n) => n.as_i64() == Some(1),
        Json::Null | Json::Array(_) | Json::Object(_) => false,
    }
}

fn export_cell(value: &Value) -> Json {
    match value {
        Value::Null => Json::Null,
        Value::Number(n) => Json::from(*n),
        other => Json::String(other.render()),
    }
}
