//! The record table and its stable identities.
//!
//! Records are appended, edited in place and flagged, never removed. Every
//! record gets a [`RecordId`] at append time; ids grow monotonically and are
//! never reused, so any set of ids computed earlier stays valid until the
//! caller chooses to recompute it.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

use crate::error::{Error, Result};
use crate::value::{ColumnKind, Value, parse_bool_word};

pub const ARCHIVED_FIELD: &str = "is_archived";
pub const DELETED_FIELD: &str = "is_deleted";

static TRUE: Value = Value::Bool(true);
static FALSE: Value = Value::Bool(false);
static NULL: Value = Value::Null;

/// Service fields are attached to every record and are not user columns.
#[must_use]
pub fn is_service_field(field: &str) -> bool {
    field == ARCHIVED_FIELD || field == DELETED_FIELD
}

/// Stable identifier of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(u64);

impl RecordId {
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The two service flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Flag {
    Archived,
    Deleted,
}

impl Flag {
    #[must_use]
    pub const fn field_name(self) -> &'static str {
        match self {
            Self::Archived => ARCHIVED_FIELD,
            Self::Deleted => DELETED_FIELD,
        }
    }

    /// The flag stored under a service field name.
    #[must_use]
    pub fn for_field(field: &str) -> Option<Self> {
        match field {
            ARCHIVED_FIELD => Some(Self::Archived),
            DELETED_FIELD => Some(Self::Deleted),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Archived => "archived",
            Self::Deleted => "deleted",
        }
    }
}

impl FromStr for Flag {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "archived" | ARCHIVED_FIELD => Ok(Self::Archived),
            "deleted" | DELETED_FIELD => Ok(Self::Deleted),
            _ => Err(Error::UnknownField(s.to_string())),
        }
    }
}

/// One row of the registry.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    id: RecordId,
    fields: IndexMap<String, Value>,
    archived: bool,
    deleted: bool,
}

impl Record {
    #[must_use]
    pub const fn id(&self) -> RecordId {
        self.id
    }

    /// Field lookup, service fields included (as booleans).
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Value> {
        match field {
            ARCHIVED_FIELD => Some(flag_value(self.archived)),
            DELETED_FIELD => Some(flag_value(self.deleted)),
            _ => self.fields.get(field),
        }
    }

    /// Like [`Record::get`], with absent fields reading as null.
    #[must_use]
    pub fn value(&self, field: &str) -> &Value {
        self.get(field).unwrap_or(&NULL)
    }

    /// User fields in schema order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Renderings of every present user field in schema order, space-joined.
    #[must_use]
    pub fn text(&self) -> String {
        self.fields
            .values()
            .filter(|v| !v.is_missing())
            .map(Value::render)
            .collect::<Vec<_>>()
            .join(" ")
    }

    #[must_use]
    pub const fn is_archived(&self) -> bool {
        self.archived
    }

    #[must_use]
    pub const fn is_deleted(&self) -> bool {
        self.deleted
    }

    /// Neither archived nor deleted.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        !self.archived && !self.deleted
    }

    /// Reorders the fields to follow the column order of `schema`.
    fn align(&mut self, schema: &Schema) {
        self.fields
            .sort_by(|a, _, b, _| schema.position(a).cmp(&schema.position(b)));
    }

    const fn set_flag(&mut self, flag: Flag, value: bool) {
        match flag {
            Flag::Archived => self.archived = value,
            Flag::Deleted => self.deleted = value,
        }
    }
}

fn flag_value(set: bool) -> &'static Value {
    if set { &TRUE } else { &FALSE }
}

/// Ordered user field names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    fields: Vec<String>,
}

impl Schema {
    /// Builds a schema; duplicates and service names are dropped.
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut schema = Self::default();
        for field in fields {
            schema.push(field);
        }
        schema
    }

    /// Whether conditions and rules may reference `field`.
    #[must_use]
    pub fn contains(&self, field: &str) -> bool {
        is_service_field(field) || self.fields.iter().any(|f| f == field)
    }

    /// Columns offered to users: everything except the service fields.
    #[must_use]
    pub fn user_fields(&self) -> &[String] {
        &self.fields
    }

    #[must_use]
    pub fn position(&self, field: &str) -> Option<usize> {
        self.fields.iter().position(|f| f == field)
    }

    /// Appends a field; returns `false` if it was already known.
    pub fn push(&mut self, field: impl Into<String>) -> bool {
        let field = field.into();
        if self.contains(&field) {
            return false;
        }
        self.fields.push(field);
        true
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// What a mutation changed, returned to the caller so it can decide what to
/// recompute.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum RegistryEvent {
    FieldEdited {
        id: RecordId,
        field: String,
        previous: Value,
        current: Value,
    },
    FlagChanged {
        id: RecordId,
        flag: Flag,
        value: bool,
    },
}

impl RegistryEvent {
    #[must_use]
    pub const fn record(&self) -> RecordId {
        match self {
            Self::FieldEdited { id, .. } | Self::FlagChanged { id, .. } => *id,
        }
    }

    /// Whether results keyed on `field` may be stale after this event.
    ///
    /// Flag changes move records in or out of every analysis, so they affect
    /// all fields.
    #[must_use]
    pub fn affects(&self, field: &str) -> bool {
        match self {
            Self::FieldEdited {
                field: edited,
                previous,
                current,
                ..
            } => edited == field && previous != current,
            Self::FlagChanged { .. } => true,
        }
    }
}

/// All records plus the schema.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    schema: Schema,
    /// Sorted by id, since ids only grow and records are never removed.
    records: Vec<Record>,
    next_id: u64,
}

impl Registry {
    /// An empty registry with the given columns.
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            schema: Schema::new(fields),
            records: Vec::new(),
            next_id: 1,
        }
    }

    /// A registry loaded in one go.
    pub fn from_rows<F, S, R, K, V>(fields: F, rows: impl IntoIterator<Item = R>) -> Self
    where
        F: IntoIterator<Item = S>,
        S: Into<String>,
        R: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let mut registry = Self::new(fields);
        for row in rows {
            registry.append(row);
        }
        debug!(
            "Loaded registry: {} records, {} fields",
            registry.len(),
            registry.schema.len()
        );
        registry
    }

    #[must_use]
    pub const fn schema(&self) -> &Schema {
        &self.schema
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[must_use]
    pub fn get(&self, id: RecordId) -> Option<&Record> {
        self.position(id).map(|i| &self.records[i])
    }

    /// Records in insertion order, deleted ones included.
    pub fn iter(&self) -> impl Iterator<Item = &Record> {
        self.records.iter()
    }

    /// A view over every record.
    #[must_use]
    pub fn view(&self) -> RegistryView<'_> {
        RegistryView::new(self, self.records.iter().map(Record::id).collect())
    }

    /// Adds a record and returns its new id.
    ///
    /// Unknown field names extend the schema. `is_archived`/`is_deleted`
    /// keys set the flags instead of becoming fields.
    pub fn append<I, K, V>(&mut self, fields: I) -> RecordId
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let id = RecordId(self.next_id.max(1));
        self.next_id = id.0 + 1;

        let mut record = Record {
            id,
            fields: IndexMap::new(),
            archived: false,
            deleted: false,
        };
        for (name, value) in fields {
            let name = name.into();
            let value = value.into();
            if let Some(flag) = Flag::for_field(&name) {
                record.set_flag(flag, truthy(&value));
                continue;
            }
            if self.schema.push(name.as_str()) {
                debug!("Schema extended with field '{name}'");
            }
            record.fields.insert(name, value);
        }
        record.align(&self.schema);
        self.records.push(record);
        id
    }

    /// Replaces one user field value.
    pub fn set_field(
        &mut self,
        id: RecordId,
        field: &str,
        value: impl Into<Value>,
    ) -> Result<RegistryEvent> {
        if is_service_field(field) {
            return Err(Error::ServiceField(field.to_string()));
        }
        if !self.schema.contains(field) {
            return Err(Error::UnknownField(field.to_string()));
        }
        let index = self.position(id).ok_or(Error::UnknownRecord(id))?;
        let current = value.into();
        let record = &mut self.records[index];
        let previous = record.fields.insert(field.to_string(), current.clone());
        if previous.is_none() {
            record.align(&self.schema);
        }
        let previous = previous.unwrap_or_default();
        debug!("Record {id}: '{field}' edited");
        Ok(RegistryEvent::FieldEdited {
            id,
            field: field.to_string(),
            previous,
            current,
        })
    }

    /// Replaces one user field from editor text, coerced to the column type.
    pub fn set_field_text(&mut self, id: RecordId, field: &str, raw: &str) -> Result<RegistryEvent> {
        let value = self.column_kind(field).coerce(raw);
        self.set_field(id, field, value)
    }

    /// Archive/delete or restore a record.
    pub fn set_flag(&mut self, id: RecordId, flag: Flag, value: bool) -> Result<RegistryEvent> {
        let index = self.position(id).ok_or(Error::UnknownRecord(id))?;
        self.records[index].set_flag(flag, value);
        debug!("Record {id}: {} = {value}", flag.field_name());
        Ok(RegistryEvent::FlagChanged { id, flag, value })
    }

    /// Column type inferred from the present values of `field`.
    #[must_use]
    pub fn column_kind(&self, field: &str) -> ColumnKind {
        if is_service_field(field) {
            return ColumnKind::Boolean;
        }
        ColumnKind::infer(self.records.iter().map(|r| r.value(field)))
    }

    /// Next auto-number for a sequence column: max + 1, or `len + 1` when the
    /// column holds no numbers yet.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    pub fn next_sequence_value(&self, field: &str) -> i64 {
        self.records
            .iter()
            .filter_map(|r| r.value(field).as_number())
            .reduce(f64::max)
            .map_or(self.len() as i64 + 1, |max| max.floor() as i64 + 1)
    }

    /// Sorted distinct renderings of a column, blanks skipped.
    #[must_use]
    pub fn facet_values(&self, field: &str) -> Vec<String> {
        self.records
            .iter()
            .map(|r| r.value(field))
            .filter(|v| !v.is_missing())
            .map(|v| v.render().trim().to_string())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    fn position(&self, id: RecordId) -> Option<usize> {
        self.records.binary_search_by_key(&id, Record::id).ok()
    }
}

fn truthy(value: &Value) -> bool {
    value
        .as_bool()
        .or_else(|| parse_bool_word(&value.render()))
        .unwrap_or(false)
}

/// An ordered subset of a registry, by id.
#[derive(Debug, Clone)]
pub struct RegistryView<'a> {
    registry: &'a Registry,
    ids: Vec<RecordId>,
}

impl<'a> RegistryView<'a> {
    #[must_use]
    pub const fn new(registry: &'a Registry, ids: Vec<RecordId>) -> Self {
        Self { registry, ids }
    }

    #[must_use]
    pub const fn registry(&self) -> &'a Registry {
        self.registry
    }

    #[must_use]
    pub fn ids(&self) -> &[RecordId] {
        &self.ids
    }

    #[must_use]
    pub fn into_ids(self) -> Vec<RecordId> {
        self.ids
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    #[must_use]
    pub fn contains(&self, id: RecordId) -> bool {
        self.ids.contains(&id)
    }

    /// The viewed records, in view order.
    pub fn records(&self) -> impl Iterator<Item = &'a Record> + '_ {
        let registry = self.registry;
        self.ids.iter().filter_map(move |id| registry.get(*id))
    }

    /// Keeps the records satisfying `keep`, preserving order.
    #[must_use]
    pub fn filter(self, mut keep: impl FnMut(&Record) -> bool) -> Self {
        let registry = self.registry;
        let ids = self
            .ids
            .into_iter()
            .filter(|id| registry.get(*id).is_some_and(&mut keep))
            .collect();
        Self { registry, ids }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Registry {
        Registry::from_rows(
            ["ID", "ПІБ", "Стаття"],
            [
                vec![
                    ("ID", Value::from(1_i64)),
                    ("ПІБ", Value::from("Петренко Іван, 01.01.1990")),
                    ("Стаття", Value::from("185")),
                ],
                vec![
                    ("ID", Value::from(7_i64)),
                    ("ПІБ", Value::from("Коваль Олег")),
                    ("Стаття", Value::from("190")),
                ],
            ],
        )
    }

    #[test]
    fn test_ids_are_monotonic_and_survive_soft_delete() {
        let mut registry = sample();
        let ids: Vec<_> = registry.iter().map(Record::id).collect();
        assert!(ids[0] < ids[1]);

        let _ = registry.set_flag(ids[1], Flag::Deleted, true);
        let third = registry.append([("ПІБ", "Шевченко")]);
        assert!(third > ids[1]);
        assert_eq!(registry.len(), 3);
        assert!(registry.get(ids[1]).is_some_and(Record::is_deleted));
    }

    #[test]
    fn test_append_extends_schema_and_reads_missing_as_null() {
        let mut registry = sample();
        let id = registry.append([("Прокуратура", "Київська")]);
        assert!(registry.schema().contains("Прокуратура"));
        let record = registry.get(id);
        assert_eq!(record.map(|r| r.value("ПІБ")), Some(&Value::Null));
    }

    #[test]
    fn test_append_service_keys_set_flags() {
        let mut registry = sample();
        let id = registry.append([
            ("ПІБ", Value::from("Бондар")),
            (DELETED_FIELD, Value::from("так")),
        ]);
        let record = registry.get(id);
        assert!(record.is_some_and(Record::is_deleted));
        assert!(!registry.schema().user_fields().iter().any(|f| f == DELETED_FIELD));
    }

    #[test]
    fn test_service_fields_are_readable_but_not_editable() {
        let mut registry = sample();
        let id = registry.view().ids()[0];
        let _ = registry.set_flag(id, Flag::Archived, true);
        assert_eq!(
            registry.get(id).map(|r| r.value(ARCHIVED_FIELD)),
            Some(&Value::Bool(true))
        );
        assert!(matches!(
            registry.set_field(id, ARCHIVED_FIELD, false),
            Err(Error::ServiceField(_))
        ));
    }

    #[test]
    fn test_set_field_errors() {
        let mut registry = sample();
        let id = registry.view().ids()[0];
        assert!(matches!(
            registry.set_field(id, "Нема", "x"),
            Err(Error::UnknownField(_))
        ));
        let ghost = RecordId(999);
        assert!(matches!(
            registry.set_field(ghost, "ПІБ", "x"),
            Err(Error::UnknownRecord(_))
        ));
    }

    #[test]
    fn test_set_field_reports_previous_value() {
        let mut registry = sample();
        let id = registry.view().ids()[0];
        let event = registry.set_field(id, "Стаття", "186");
        let Ok(event) = event else {
            panic!("edit should succeed");
        };
        assert_eq!(event.record(), id);
        assert!(event.affects("Стаття"));
        assert!(!event.affects("ПІБ"));
        assert_eq!(
            event,
            RegistryEvent::FieldEdited {
                id,
                field: "Стаття".to_string(),
                previous: Value::from("185"),
                current: Value::from("186"),
            }
        );
    }

    #[test]
    fn test_fields_follow_schema_order_after_late_edit() {
        let mut registry = Registry::new(["Опис", "Примітка"]);
        let id = registry.append([("Примітка", "справа 22222")]);
        let _ = registry.set_field(id, "Опис", "справа 11111");

        let record = registry.get(id);
        let names: Vec<&str> = record
            .map(|r| r.fields().map(|(k, _)| k).collect())
            .unwrap_or_default();
        assert_eq!(names, vec!["Опис", "Примітка"]);
        assert_eq!(
            record.map(Record::text).as_deref(),
            Some("справа 11111 справа 22222")
        );
    }

    #[test]
    fn test_append_orders_fields_by_schema() {
        let mut registry = Registry::new(["ПІБ", "Стаття"]);
        let id = registry.append([("Стаття", "185"), ("Нове", "x"), ("ПІБ", "Коваль")]);
        let record = registry.get(id);
        assert_eq!(record.map(Record::text).as_deref(), Some("Коваль 185 x"));
    }

    #[test]
    fn test_set_field_text_coerces_to_column_kind() {
        let mut registry = sample();
        let id = registry.view().ids()[0];
        let _ = registry.set_field_text(id, "ID", "42");
        assert_eq!(registry.get(id).map(|r| r.value("ID")), Some(&Value::Number(42.0)));
        let _ = registry.set_field_text(id, "ID", "");
        assert_eq!(registry.get(id).map(|r| r.value("ID")), Some(&Value::Null));
    }

    #[test]
    fn test_next_sequence_value() {
        let registry = sample();
        assert_eq!(registry.next_sequence_value("ID"), 8);
        assert_eq!(registry.next_sequence_value("ПІБ"), 3);
    }

    #[test]
    fn test_facet_values_are_sorted_and_distinct() {
        let mut registry = sample();
        registry.append([("Стаття", "185")]);
        registry.append([("Стаття", " ")]);
        assert_eq!(registry.facet_values("Стаття"), vec!["185", "190"]);
    }

    #[test]
    fn test_view_filter_keeps_order() {
        let mut registry = sample();
        registry.append([("ПІБ", "Петренко Марія")]);
        let view = registry
            .view()
            .filter(|r| r.value("ПІБ").render().starts_with("Петренко"));
        let names: Vec<_> = view.records().map(|r| r.value("ПІБ").render()).collect();
        assert_eq!(names, vec!["Петренко Іван, 01.01.1990", "Петренко Марія"]);
    }

    #[test]
    fn test_flag_parsing() {
        assert_eq!("deleted".parse::<Flag>().ok(), Some(Flag::Deleted));
        assert_eq!(ARCHIVED_FIELD.parse::<Flag>().ok(), Some(Flag::Archived));
        assert!("hidden".parse::<Flag>().is_err());
    }
}
