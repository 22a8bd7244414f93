#![deny(
    clippy::all,
    clippy::nursery,
    clippy::pedantic,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::correctness,
    clippy::suspicious,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(
    clippy::similar_names,
    clippy::missing_safety_doc,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc
)]

//! Analyses over a case registry: filtering, deadlines, duplicates and
//! cross-referencing against external documents.
//!
//! Every analysis is a pure function of the registry and an explicit
//! configuration value. Results are sets of [`RecordId`]s, rebuilt wholesale
//! by calling the analysis again after a mutation.

pub mod deadline;
pub mod duplicates;
pub mod filter;
pub mod highlight;
pub mod matching;

use std::collections::BTreeSet;

use casereg_core::{RecordId, Registry, RegistryView};

pub use deadline::{
    CaseDeadline, CaseStatus, DeadlineConfig, DeadlineSets, DeadlineTracker, MeasureDeadline,
    MeasureExpiry, MeasureStatus,
};
pub use duplicates::DuplicateDetector;
pub use filter::{Facet, FilterCondition, FilterEngine, Operand, Operator, RegistryQuery};
pub use highlight::{Highlights, Reason, Scope};
pub use matching::{
    DobPolicy, ExternalTable, MatchAnalyzer, MatchConfig, MatchEntry, MatchMode, MatchNavigator,
    MatchResults, ModeResult, NameFields, OccurrenceCursor,
};

/// Records satisfying every condition.
#[must_use]
pub fn apply<'a>(registry: &'a Registry, conditions: &[FilterCondition]) -> RegistryView<'a> {
    FilterEngine::apply(registry, conditions)
}

/// Deadline highlight sets as of today.
#[must_use]
pub fn recompute_deadlines(registry: &Registry, config: &DeadlineConfig) -> DeadlineSets {
    DeadlineTracker::recompute(registry, config)
}

/// Records sharing their name key with another live record.
#[must_use]
pub fn recompute_duplicates(registry: &Registry, name_field: &str) -> BTreeSet<RecordId> {
    DuplicateDetector::recompute(registry, name_field)
}

/// Name and case matches of `view` in an external document.
#[must_use]
pub fn find_matches(
    view: &RegistryView<'_>,
    text: &str,
    table: Option<&ExternalTable>,
    config: &MatchConfig,
) -> MatchResults {
    MatchAnalyzer::find_matches(view, text, table, config)
}
