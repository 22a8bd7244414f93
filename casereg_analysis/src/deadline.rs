//! Deadline classification from dates embedded in record fields.
//!
//! Two rules, evaluated independently:
//!
//! - **Measure term**: a protective measure lasts `measure_term_months` from
//!   the first date in the measure field (or until the last date, when the
//!   field states a "valid until" date). Expired measures flag the whole
//!   record, measures ending within `warning_window_days` flag the measure
//!   cell. Measures that ended before `cutoff_date` predate the rule and are
//!   ignored.
//! - **Case opening**: once a search order is dated, a case has to be opened
//!   within `case_window_days`. While the case field holds neither a date nor
//!   a case number, the order and case cells are flagged as a warning, then
//!   as overdue.

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::{debug, info};

use casereg_core::dates::{self, DatePick};
use casereg_core::tokens::first_case_number;
use casereg_core::{Record, RecordId, Registry, Value};

/// How the measure field's dates turn into an expiry date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeasureExpiry {
    /// First date + the measure term.
    #[default]
    FromStart,
    /// The last date is the expiry itself.
    ValidUntil,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeadlineConfig {
    #[serde(default = "DeadlineConfig::default_measure_field")]
    pub measure_field: String,

    #[serde(default = "DeadlineConfig::default_order_field")]
    pub order_field: String,

    #[serde(default = "DeadlineConfig::default_case_number_field")]
    pub case_number_field: String,

    /// Day the measure-term rule came into force.
    #[serde(default = "DeadlineConfig::default_cutoff_date")]
    pub cutoff_date: NaiveDate,

    #[serde(default = "DeadlineConfig::default_warning_window_days")]
    pub warning_window_days: i64,

    #[serde(default = "DeadlineConfig::default_case_window_days")]
    pub case_window_days: i64,

    #[serde(default = "DeadlineConfig::default_measure_term_months")]
    pub measure_term_months: u32,

    #[serde(default)]
    pub measure_expiry: MeasureExpiry,
}

impl DeadlineConfig {
    fn default_measure_field() -> String {
        "Запобіжний_захід".to_string()
    }

    fn default_order_field() -> String {
        "Дата_доручення_розшуку".to_string()
    }

    fn default_case_number_field() -> String {
        "Дата_заведення_ОРС".to_string()
    }

    fn default_cutoff_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 1).unwrap_or_default()
    }

    const fn default_warning_window_days() -> i64 {
        10
    }

    const fn default_case_window_days() -> i64 {
        20
    }

    const fn default_measure_term_months() -> u32 {
        6
    }
}

impl Default for DeadlineConfig {
    fn default() -> Self {
        Self {
            measure_field: Self::default_measure_field(),
            order_field: Self::default_order_field(),
            case_number_field: Self::default_case_number_field(),
            cutoff_date: Self::default_cutoff_date(),
            warning_window_days: Self::default_warning_window_days(),
            case_window_days: Self::default_case_window_days(),
            measure_term_months: Self::default_measure_term_months(),
            measure_expiry: MeasureExpiry::default(),
        }
    }
}

/// The four deadline highlight sets, rebuilt wholesale on every recompute.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeadlineSets {
    /// Whole-record: the measure term has run out.
    pub expired: BTreeSet<RecordId>,
    /// Measure cell: the term ends within the warning window.
    pub expiring_soon: BTreeSet<RecordId>,
    /// Order and case cells: no case yet, still within the case window.
    pub case_warning: BTreeSet<RecordId>,
    /// Order and case cells: no case and the case window has passed.
    pub case_overdue: BTreeSet<RecordId>,
}

impl DeadlineSets {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.expired.is_empty()
            && self.expiring_soon.is_empty()
            && self.case_warning.is_empty()
            && self.case_overdue.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MeasureStatus {
    /// Expired before the cutoff date.
    Legacy,
    Expired,
    ExpiringSoon,
    Pending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MeasureDeadline {
    pub expiry: NaiveDate,
    /// Negative once expired.
    pub days_left: i64,
    pub status: MeasureStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseStatus {
    /// A case date or number is already recorded.
    Opened,
    /// The order is dated in the future.
    NotDue,
    Warning,
    Overdue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CaseDeadline {
    pub order_date: NaiveDate,
    pub days_passed: i64,
    pub status: CaseStatus,
}

pub struct DeadlineTracker;

impl DeadlineTracker {
    /// Classifies every record as of the local calendar day.
    #[must_use]
    pub fn recompute(registry: &Registry, config: &DeadlineConfig) -> DeadlineSets {
        Self::recompute_at(registry, config, Local::now().date_naive())
    }

    /// Classifies every record as of `today`.
    ///
    /// Rules whose fields are not in the schema contribute nothing.
    #[must_use]
    pub fn recompute_at(registry: &Registry, config: &DeadlineConfig, today: NaiveDate) -> DeadlineSets {
        let schema = registry.schema();
        let measure_rule = schema.contains(&config.measure_field);
        let case_rule =
            schema.contains(&config.order_field) && schema.contains(&config.case_number_field);
        if !measure_rule {
            debug!("Measure rule skipped: no field '{}'", config.measure_field);
        }
        if !case_rule {
            debug!(
                "Case rule skipped: needs fields '{}' and '{}'",
                config.order_field, config.case_number_field
            );
        }

        let mut sets = DeadlineSets::default();
        for record in registry.iter() {
            let id = record.id();
            if measure_rule {
                match Self::measure_deadline(record, config, today).map(|d| d.status) {
                    Some(MeasureStatus::Expired) => {
                        sets.expired.insert(id);
                    }
                    Some(MeasureStatus::ExpiringSoon) => {
                        sets.expiring_soon.insert(id);
                    }
                    Some(MeasureStatus::Legacy | MeasureStatus::Pending) | None => {}
                }
            }
            if case_rule {
                match Self::case_deadline(record, config, today).map(|d| d.status) {
                    Some(CaseStatus::Warning) => {
                        sets.case_warning.insert(id);
                    }
                    Some(CaseStatus::Overdue) => {
                        sets.case_overdue.insert(id);
                    }
                    Some(CaseStatus::Opened | CaseStatus::NotDue) | None => {}
                }
            }
        }

        info!(
            "Deadlines as of {today}: {} expired, {} expiring soon, {} case warnings, {} case overdue",
            sets.expired.len(),
            sets.expiring_soon.len(),
            sets.case_warning.len(),
            sets.case_overdue.len()
        );
        sets
    }

    /// Measure-term reading of one record; `None` when no date can be
    /// extracted.
    #[must_use]
    pub fn measure_deadline(
        record: &Record,
        config: &DeadlineConfig,
        today: NaiveDate,
    ) -> Option<MeasureDeadline> {
        let value = record.value(&config.measure_field);
        let expiry = match config.measure_expiry {
            MeasureExpiry::FromStart => dates::add_months(
                DatePick::First.extract(value)?,
                config.measure_term_months,
            )?,
            MeasureExpiry::ValidUntil => DatePick::Last.extract(value)?,
        };
        let days_left = dates::days_between(today, expiry);
        let status = if expiry < config.cutoff_date {
            MeasureStatus::Legacy
        } else if days_left < 0 {
            MeasureStatus::Expired
        } else if days_left <= config.warning_window_days {
            MeasureStatus::ExpiringSoon
        } else {
            MeasureStatus::Pending
        };
        Some(MeasureDeadline {
            expiry,
            days_left,
            status,
        })
    }

    /// Case-opening reading of one record; `None` when the order field has
    /// no date.
    #[must_use]
    pub fn case_deadline(
        record: &Record,
        config: &DeadlineConfig,
        today: NaiveDate,
    ) -> Option<CaseDeadline> {
        let order_date = DatePick::First.extract(record.value(&config.order_field))?;
        let days_passed = dates::days_between(order_date, today);
        let status = if case_opened(record.value(&config.case_number_field)) {
            CaseStatus::Opened
        } else if days_passed < 0 {
            CaseStatus::NotDue
        } else if days_passed <= config.case_window_days {
            CaseStatus::Warning
        } else {
            CaseStatus::Overdue
        };
        Some(CaseDeadline {
            order_date,
            days_passed,
            status,
        })
    }
}

fn case_opened(value: &Value) -> bool {
    if value.is_missing() {
        return false;
    }
    DatePick::First.extract(value).is_some() || first_case_number(&value.render()).is_some()
}
