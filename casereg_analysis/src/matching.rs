//! Cross-referencing registry records against an external document.
//!
//! Two modes run together over the same document:
//!
//! - **Name**: the record's name label, normalized, searched in the
//!   normalized document.
//! - **Case**: the record's case number, searched case-insensitively in the
//!   raw document.
//!
//! Each mode splits the records into matches (with occurrence counts and
//! offsets into the raw document) and unique records, in view order.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info};

use casereg_core::dates::{self, DatePick};
use casereg_core::tokens::first_case_number;
use casereg_core::{MappedText, Record, RecordId, RegistryView, normalize};

/// Fields a record's name label is built from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameFields {
    /// `Surname Given Patronymic, dd.mm.yyyy, ...` style field; the part
    /// before the first comma is the label.
    #[serde(default = "NameFields::default_full_name")]
    pub full_name: Option<String>,

    #[serde(default)]
    pub surname: Option<String>,

    #[serde(default)]
    pub given_name: Option<String>,

    #[serde(default)]
    pub patronymic: Option<String>,
}

impl NameFields {
    #[allow(clippy::unnecessary_wraps)]
    fn default_full_name() -> Option<String> {
        Some("ПІБ".to_string())
    }

    /// Separate name parts, no full-name field.
    pub fn split(
        surname: impl Into<String>,
        given_name: impl Into<String>,
        patronymic: impl Into<String>,
    ) -> Self {
        Self {
            full_name: None,
            surname: Some(surname.into()),
            given_name: Some(given_name.into()),
            patronymic: Some(patronymic.into()),
        }
    }

    /// The record's name label.
    ///
    /// The full-name field wins when it has text before its first comma;
    /// otherwise the present name parts are space-joined in surname, given
    /// name, patronymic order.
    #[must_use]
    pub fn label(&self, record: &Record) -> Option<String> {
        let from_full = self
            .full_name
            .as_deref()
            .map(|field| record.value(field))
            .filter(|v| !v.is_missing())
            .and_then(|v| {
                let rendered = v.render();
                let head = rendered.split(',').next().unwrap_or_default().trim();
                (!head.is_empty()).then(|| head.to_string())
            });
        if from_full.is_some() {
            return from_full;
        }

        let parts: Vec<String> = [&self.surname, &self.given_name, &self.patronymic]
            .into_iter()
            .flatten()
            .map(|field| record.value(field))
            .filter(|v| !v.is_missing())
            .map(|v| v.render().trim().to_string())
            .filter(|part| !part.is_empty())
            .collect();
        (!parts.is_empty()).then(|| parts.join(" "))
    }
}

impl Default for NameFields {
    fn default() -> Self {
        Self {
            full_name: Self::default_full_name(),
            surname: None,
            given_name: None,
            patronymic: None,
        }
    }
}

/// Whether a name hit also needs the person's date of birth next to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum DobPolicy {
    /// A label hit is a match on its own.
    #[default]
    Ignore,
    /// The record's date of birth must appear within `window` bytes of the
    /// hit in the normalized document. Records without a known date of
    /// birth are not filtered.
    RequireNearby { window: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchConfig {
    #[serde(default)]
    pub names: NameFields,

    /// Field holding the case number; without one the first 5 to 10 digit
    /// run of the whole record is used.
    #[serde(default)]
    pub case_number_field: Option<String>,

    #[serde(default = "MatchConfig::default_dob_field")]
    pub dob_field: Option<String>,

    #[serde(default)]
    pub dob_policy: DobPolicy,
}

impl MatchConfig {
    #[allow(clippy::unnecessary_wraps)]
    fn default_dob_field() -> Option<String> {
        Some("Дата_нар".to_string())
    }

    /// Case-number token of a record.
    #[must_use]
    pub fn case_token(&self, record: &Record) -> Option<String> {
        let explicit = self
            .case_number_field
            .as_deref()
            .map(|field| record.value(field))
            .filter(|v| !v.is_missing())
            .map(|v| v.render().trim().to_string())
            .filter(|token| !token.is_empty());
        explicit.or_else(|| first_case_number(&record.text()).map(str::to_string))
    }

    /// Date of birth: the birth-date field, else the first date after the
    /// comma of the full-name field.
    #[must_use]
    pub fn birth_date(&self, record: &Record) -> Option<NaiveDate> {
        let from_field = self
            .dob_field
            .as_deref()
            .and_then(|field| DatePick::First.extract(record.value(field)));
        from_field.or_else(|| {
            let full = record.value(self.names.full_name.as_deref()?).render();
            let (_, rest) = full.split_once(',')?;
            dates::first_date(rest)
        })
    }
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            names: NameFields::default(),
            case_number_field: None,
            dob_field: Self::default_dob_field(),
            dob_policy: DobPolicy::default(),
        }
    }
}

/// Tabular mirror of the external document, one entry per row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalTable {
    rows: Vec<Vec<String>>,
}

impl ExternalTable {
    #[must_use]
    pub const fn new(rows: Vec<Vec<String>>) -> Self {
        Self { rows }
    }

    #[must_use]
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    Name,
    Case,
}

impl MatchMode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Case => "case",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchEntry {
    pub id: RecordId,
    /// Label or case token as derived from the record.
    pub label: String,
    pub count: usize,
    /// Byte offsets of the counted occurrences in the raw document.
    pub offsets: Vec<usize>,
    /// Indices of external table rows containing the label.
    pub table_rows: Vec<usize>,
}

/// One mode's outcome.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ModeResult {
    pub matches: Vec<MatchEntry>,
    /// Records without a match, in view order.
    pub unique: Vec<RecordId>,
    /// Every physical occurrence of each record's label, before any date of
    /// birth filtering. Records without a label have no entry.
    pub occurrences: BTreeMap<RecordId, Vec<usize>>,
}

impl ModeResult {
    #[must_use]
    pub fn entry(&self, id: RecordId) -> Option<&MatchEntry> {
        self.matches.iter().find(|e| e.id == id)
    }

    #[must_use]
    pub fn is_matched(&self, id: RecordId) -> bool {
        self.entry(id).is_some()
    }

    #[must_use]
    pub fn occurrences(&self, id: RecordId) -> &[usize] {
        self.occurrences.get(&id).map_or(&[], Vec::as_slice)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MatchResults {
    pub name: ModeResult,
    pub case: ModeResult,
}

impl MatchResults {
    #[must_use]
    pub const fn mode(&self, mode: MatchMode) -> &ModeResult {
        match mode {
            MatchMode::Name => &self.name,
            MatchMode::Case => &self.case,
        }
    }
}

/// The document in the two searchable forms, prepared once per run.
struct Document {
    normalized: MappedText,
    lowercased: MappedText,
    normalized_rows: Vec<String>,
    lowercased_rows: Vec<String>,
}

impl Document {
    fn new(text: &str, table: Option<&ExternalTable>) -> Self {
        let rows = table.map_or(&[][..], ExternalTable::rows);
        Self {
            normalized: MappedText::normalized(text),
            lowercased: MappedText::lowercased(text),
            normalized_rows: rows.iter().map(|row| normalize(&row.join(" "))).collect(),
            lowercased_rows: rows.iter().map(|row| row.join(" ").to_lowercase()).collect(),
        }
    }
}

fn rows_containing(rows: &[String], needle: &str) -> Vec<usize> {
    rows.iter()
        .enumerate()
        .filter(|(_, row)| row.contains(needle))
        .map(|(i, _)| i)
        .collect()
}

pub struct MatchAnalyzer;

impl MatchAnalyzer {
    /// Runs both modes over the records of `view`.
    #[must_use]
    pub fn find_matches(
        view: &RegistryView<'_>,
        text: &str,
        table: Option<&ExternalTable>,
        config: &MatchConfig,
    ) -> MatchResults {
        let document = Document::new(text, table);
        let results = MatchResults {
            name: Self::name_mode(view, &document, config),
            case: Self::case_mode(view, &document, config),
        };
        info!(
            "Matches over {} records: name {} matched / {} unique, case {} matched / {} unique",
            view.len(),
            results.name.matches.len(),
            results.name.unique.len(),
            results.case.matches.len(),
            results.case.unique.len()
        );
        results
    }

    fn name_mode(view: &RegistryView<'_>, document: &Document, config: &MatchConfig) -> ModeResult {
        let mut result = ModeResult::default();
        for record in view.records() {
            let id = record.id();
            let Some(label) = config.names.label(record) else {
                debug!("Record {id}: no name label");
                result.unique.push(id);
                continue;
            };
            let needle = normalize(&label);
            let positions = document.normalized.positions(&needle);
            result.occurrences.insert(
                id,
                positions
                    .iter()
                    .filter_map(|p| document.normalized.origin(*p))
                    .collect(),
            );

            let kept = match (config.dob_policy, config.birth_date(record)) {
                (DobPolicy::RequireNearby { window }, Some(dob)) => {
                    let dob = normalize(&dates::format_date(dob));
                    positions
                        .into_iter()
                        .filter(|p| document.normalized.window(*p, needle.len(), window).contains(&dob))
                        .collect()
                }
                _ => positions,
            };

            if kept.is_empty() {
                result.unique.push(id);
                continue;
            }
            result.matches.push(MatchEntry {
                id,
                label,
                count: kept.len(),
                offsets: kept
                    .iter()
                    .filter_map(|p| document.normalized.origin(*p))
                    .collect(),
                table_rows: rows_containing(&document.normalized_rows, &needle),
            });
        }
        result
    }

    fn case_mode(view: &RegistryView<'_>, document: &Document, config: &MatchConfig) -> ModeResult {
        let mut result = ModeResult::default();
        for record in view.records() {
            let id = record.id();
            let Some(token) = config.case_token(record) else {
                result.unique.push(id);
                continue;
            };
            let needle = token.to_lowercase();
            let offsets = document.lowercased.find_all(&needle);
            result.occurrences.insert(id, offsets.clone());
            if offsets.is_empty() {
                result.unique.push(id);
                continue;
            }
            result.matches.push(MatchEntry {
                id,
                label: token,
                count: offsets.len(),
                offsets,
                table_rows: rows_containing(&document.lowercased_rows, &needle),
            });
        }
        result
    }
}

/// Wrap-around position in an ordered list of occurrence offsets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OccurrenceCursor {
    offsets: Vec<usize>,
    index: Option<usize>,
}

impl OccurrenceCursor {
    #[must_use]
    pub const fn new(offsets: Vec<usize>) -> Self {
        Self {
            offsets,
            index: None,
        }
    }

    /// Moves to the next occurrence, wrapping from the last to the first.
    /// The first call lands on the first occurrence.
    pub fn advance(&mut self) -> Option<usize> {
        if self.offsets.is_empty() {
            return None;
        }
        let next = self.index.map_or(0, |i| (i + 1) % self.offsets.len());
        self.index = Some(next);
        self.current()
    }

    #[must_use]
    pub fn current(&self) -> Option<usize> {
        self.index.and_then(|i| self.offsets.get(i).copied())
    }

    /// Index of the current occurrence.
    #[must_use]
    pub const fn position(&self) -> Option<usize> {
        self.index
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }
}

/// Selecting the same record again steps to its next occurrence; selecting
/// another record starts over at that record's first occurrence.
#[derive(Debug, Clone, Default)]
pub struct MatchNavigator {
    selection: Option<(MatchMode, RecordId)>,
    cursor: OccurrenceCursor,
}

impl MatchNavigator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw document offset to show for this selection, if the label occurs.
    pub fn select(&mut self, results: &MatchResults, mode: MatchMode, id: RecordId) -> Option<usize> {
        if self.selection != Some((mode, id)) {
            self.selection = Some((mode, id));
            self.cursor = OccurrenceCursor::new(results.mode(mode).occurrences(id).to_vec());
        }
        self.cursor.advance()
    }

    #[must_use]
    pub const fn cursor(&self) -> &OccurrenceCursor {
        &self.cursor
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
