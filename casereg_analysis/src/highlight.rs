//! Resolution of the highlight sets into one mark per row or cell.

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeSet;

use casereg_core::{Record, RecordId, Registry, RegistryView};

use crate::deadline::{DeadlineConfig, DeadlineSets, DeadlineTracker};
use crate::duplicates::DuplicateDetector;

/// Highlight reasons, declared from strongest to weakest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Reason {
    Deleted,
    Expired,
    CaseOverdue,
    ExpiringSoon,
    CaseWarning,
    Duplicate,
    Archived,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Row,
    Cells,
}

impl Reason {
    pub const ALL: [Self; 7] = [
        Self::Deleted,
        Self::Expired,
        Self::CaseOverdue,
        Self::ExpiringSoon,
        Self::CaseWarning,
        Self::Duplicate,
        Self::Archived,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Deleted => "deleted",
            Self::Expired => "expired",
            Self::CaseOverdue => "case_overdue",
            Self::ExpiringSoon => "expiring_soon",
            Self::CaseWarning => "case_warning",
            Self::Duplicate => "duplicate",
            Self::Archived => "archived",
        }
    }

    #[must_use]
    pub const fn scope(self) -> Scope {
        match self {
            Self::CaseOverdue | Self::ExpiringSoon | Self::CaseWarning => Scope::Cells,
            Self::Deleted | Self::Expired | Self::Duplicate | Self::Archived => Scope::Row,
        }
    }

    /// Deadline and duplicate reasons, as opposed to the service flags.
    #[must_use]
    pub const fn is_alert(self) -> bool {
        !matches!(self, Self::Deleted | Self::Archived)
    }
}

/// Deadline sets, duplicate set and service flags, combined.
#[derive(Debug, Clone, Default)]
pub struct Highlights {
    deadlines: DeadlineSets,
    duplicates: BTreeSet<RecordId>,
    measure_field: String,
    order_field: String,
    case_number_field: String,
}

impl Highlights {
    #[must_use]
    pub fn new(deadlines: DeadlineSets, duplicates: BTreeSet<RecordId>, config: &DeadlineConfig) -> Self {
        Self {
            deadlines,
            duplicates,
            measure_field: config.measure_field.clone(),
            order_field: config.order_field.clone(),
            case_number_field: config.case_number_field.clone(),
        }
    }

    /// Recomputes every set from scratch.
    #[must_use]
    pub fn compute(
        registry: &Registry,
        config: &DeadlineConfig,
        name_field: &str,
        today: NaiveDate,
    ) -> Self {
        Self::new(
            DeadlineTracker::recompute_at(registry, config, today),
            DuplicateDetector::recompute(registry, name_field),
            config,
        )
    }

    #[must_use]
    pub const fn deadlines(&self) -> &DeadlineSets {
        &self.deadlines
    }

    #[must_use]
    pub const fn duplicates(&self) -> &BTreeSet<RecordId> {
        &self.duplicates
    }

    /// Whether `reason` holds for `record`, regardless of scope.
    #[must_use]
    pub fn applies(&self, reason: Reason, record: &Record) -> bool {
        let id = record.id();
        match reason {
            Reason::Deleted => record.is_deleted(),
            Reason::Expired => self.deadlines.expired.contains(&id),
            Reason::CaseOverdue => self.deadlines.case_overdue.contains(&id),
            Reason::ExpiringSoon => self.deadlines.expiring_soon.contains(&id),
            Reason::CaseWarning => self.deadlines.case_warning.contains(&id),
            Reason::Duplicate => self.duplicates.contains(&id),
            Reason::Archived => record.is_archived(),
        }
    }

    /// Every reason holding for `record`, strongest first.
    #[must_use]
    pub fn reasons(&self, record: &Record) -> Vec<Reason> {
        Reason::ALL
            .into_iter()
            .filter(|r| self.applies(*r, record))
            .collect()
    }

    /// Fields a cell-scoped reason colours.
    fn covers(&self, reason: Reason, field: &str) -> bool {
        match reason {
            Reason::ExpiringSoon => field == self.measure_field,
            Reason::CaseOverdue | Reason::CaseWarning => {
                field == self.order_field || field == self.case_number_field
            }
            Reason::Deleted | Reason::Expired | Reason::Duplicate | Reason::Archived => true,
        }
    }

    /// The single reason deciding how a cell is drawn.
    #[must_use]
    pub fn cell_mark(&self, record: &Record, field: &str) -> Option<Reason> {
        Reason::ALL
            .into_iter()
            .find(|r| self.applies(*r, record) && self.covers(*r, field))
    }

    /// The strongest whole-row reason.
    #[must_use]
    pub fn row_mark(&self, record: &Record) -> Option<Reason> {
        Reason::ALL
            .into_iter()
            .find(|r| r.scope() == Scope::Row && self.applies(*r, record))
    }

    /// Records of `view` with a deadline or duplicate reason, in view order.
    #[must_use]
    pub fn flagged_in(&self, view: &RegistryView<'_>) -> Vec<RecordId> {
        view.records()
            .filter(|record| self.reasons(record).into_iter().any(Reason::is_alert))
            .map(Record::id)
            .collect()
    }
}
