//! Integration tests for the registry analyses working together.
//!
//! These tests verify:
//! - Filtering followed by deadline highlighting
//! - Measure-term deadline boundaries and the cutoff date
//! - Duplicate flags across soft delete and restore

use chrono::NaiveDate;

use casereg_analysis::{
    DeadlineConfig, DeadlineTracker, DuplicateDetector, FilterCondition, FilterEngine, Highlights,
    MeasureStatus,
};
use casereg_core::{Flag, RecordId, Registry, Value};

const MEASURE: &str = "measure";
const NAME: &str = "name";

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
}

fn today() -> NaiveDate {
    date(2025, 3, 15)
}

fn config() -> DeadlineConfig {
    DeadlineConfig {
        measure_field: MEASURE.to_string(),
        cutoff_date: date(2025, 1, 1),
        ..DeadlineConfig::default()
    }
}

fn measure_registry(measures: &[&str]) -> (Registry, Vec<RecordId>) {
    let mut registry = Registry::new([NAME, MEASURE]);
    let ids = measures
        .iter()
        .map(|m| registry.append([(MEASURE, Value::from(*m))]))
        .collect();
    (registry, ids)
}

/// Filter to open cases, then highlight: one of the two survivors is
/// expiring soon, the closed case is ignored even though it expires too.
#[test]
fn test_filter_then_highlight() {
    let mut registry = Registry::new([NAME, "status", MEASURE]);
    let rows = [
        ("Петренко Іван", "open", "тримання під вартою з 25.09.2024"),
        ("Коваль Олег", "closed", "домашній арешт з 25.09.2024"),
        ("Шевченко Тарас", "reopened", "особисте зобов'язання з 01.12.2024"),
    ];
    for (name, status, measure) in rows {
        registry.append([(NAME, name), ("status", status), (MEASURE, measure)]);
    }

    let view = FilterEngine::apply(&registry, &[FilterCondition::contains("status", "open")]);
    assert_eq!(view.len(), 2);

    let highlights = Highlights::compute(&registry, &config(), NAME, today());
    assert_eq!(highlights.deadlines().expiring_soon.len(), 2);

    let flagged = highlights.flagged_in(&view);
    assert_eq!(flagged.len(), 1);
    let flagged_name = registry.get(flagged[0]).map(|r| r.value(NAME).render());
    assert_eq!(flagged_name.as_deref(), Some("Петренко Іван"));
}

/// Six months minus ten days before today is the last day of the warning
/// window; six months plus one day is already expired.
#[test]
fn test_measure_deadline_boundaries() {
    let (registry, ids) = measure_registry(&[
        "з 25.09.2024",
        "з 14.09.2024",
        "з 15.09.2024",
        "з 26.09.2024",
        "з 01.05.2024",
        "без дати",
    ]);
    let sets = DeadlineTracker::recompute_at(&registry, &config(), today());

    assert!(sets.expiring_soon.contains(&ids[0]));
    assert!(sets.expired.contains(&ids[1]));
    assert!(sets.expiring_soon.contains(&ids[2]));
    for id in &ids[3..] {
        assert!(!sets.expired.contains(id) && !sets.expiring_soon.contains(id));
    }
}

/// A measure that ran out before the cutoff is legacy, however long ago.
#[test]
fn test_cutoff_excludes_legacy_measures() {
    let (registry, ids) = measure_registry(&["з 01.05.2024", "з 30.06.2024"]);
    let config = config();
    let statuses: Vec<_> = ids
        .iter()
        .filter_map(|id| registry.get(*id))
        .filter_map(|r| DeadlineTracker::measure_deadline(r, &config, today()))
        .map(|d| d.status)
        .collect();
    assert_eq!(statuses, vec![MeasureStatus::Legacy, MeasureStatus::Legacy]);

    let sets = DeadlineTracker::recompute_at(&registry, &config, today());
    assert!(sets.expired.is_empty());
}

/// The measure rule reads every record, deleted ones included.
#[test]
fn test_deadlines_cover_deleted_records() {
    let (mut registry, ids) = measure_registry(&["з 14.09.2024"]);
    let _ = registry.set_flag(ids[0], Flag::Deleted, true);
    let sets = DeadlineTracker::recompute_at(&registry, &config(), today());
    assert!(sets.expired.contains(&ids[0]));
}

/// Soft-deleting one of a pair clears both flags; restoring brings them back.
#[test]
fn test_duplicates_follow_soft_delete() {
    let mut registry = Registry::new([NAME]);
    let first = registry.append([(NAME, "Коваль Олег, 01.01.1980")]);
    let second = registry.append([(NAME, "Коваль Олег , 02.02.1982")]);
    let other = registry.append([(NAME, "Бондар Марія")]);

    let flagged = DuplicateDetector::recompute(&registry, NAME);
    assert!(flagged.contains(&first) && flagged.contains(&second));
    assert!(!flagged.contains(&other));

    let _ = registry.set_flag(second, Flag::Deleted, true);
    assert!(DuplicateDetector::recompute(&registry, NAME).is_empty());

    let _ = registry.set_flag(second, Flag::Deleted, false);
    assert_eq!(DuplicateDetector::recompute(&registry, NAME).len(), 2);
}

/// Editing a name is reported, and the next recompute sees the new value.
#[test]
fn test_edit_then_recompute() {
    let mut registry = Registry::new([NAME]);
    let first = registry.append([(NAME, "Коваль Олег")]);
    registry.append([(NAME, "Бондар Марія")]);
    assert!(DuplicateDetector::recompute(&registry, NAME).is_empty());

    let event = registry.set_field(first, NAME, "Бондар Марія");
    assert!(event.is_ok_and(|e| e.affects(NAME)));
    assert_eq!(DuplicateDetector::recompute(&registry, NAME).len(), 2);
}
