//! Algebraic properties of condition lists.

use chrono::NaiveDate;
use proptest::prelude::*;

use casereg_analysis::{FilterCondition, FilterEngine};
use casereg_core::{RecordId, Registry, Value};

fn registry(rows: &[(Option<String>, Option<i64>)]) -> Registry {
    Registry::from_rows(
        ["status", "n"],
        rows.iter().map(|(status, n)| {
            vec![
                ("status", Value::from(status.clone())),
                ("n", Value::from(*n)),
            ]
        }),
    )
}

fn rows() -> impl Strategy<Value = Vec<(Option<String>, Option<i64>)>> {
    prop::collection::vec(
        (prop::option::of("[a-c ]{0,3}"), prop::option::of(0_i64..5)),
        0..24,
    )
}

fn condition() -> impl Strategy<Value = FilterCondition> {
    prop_oneof![
        "[a-c]{1,2}".prop_map(|s| FilterCondition::contains("status", s)),
        (0_i64..5).prop_map(|n| FilterCondition::equals("n", n)),
        (0_i64..5).prop_map(|n| FilterCondition::not_equals("n", n)),
        (0_i64..5).prop_map(|n| FilterCondition::greater("n", n)),
        (0_i64..5).prop_map(|n| FilterCondition::less("n", n)),
        Just(FilterCondition::is_null("status")),
        Just(FilterCondition::not_null("n")),
        Just(FilterCondition::contains("absent", "x")),
    ]
}

/// An empty condition list keeps every record in order.
#[test]
fn test_empty_conditions_are_identity() {
    let registry = registry(&[
        (Some("a".to_string()), Some(1)),
        (None, None),
        (Some("b".to_string()), Some(2)),
    ]);
    let all: Vec<RecordId> = registry.iter().map(|r| r.id()).collect();
    assert_eq!(FilterEngine::apply(&registry, &[]).ids(), all.as_slice());
}

/// Both range bounds are inclusive.
#[test]
fn test_range_bounds_are_inclusive() {
    let day = |d| NaiveDate::from_ymd_opt(2024, 5, d).unwrap_or_default();
    let mut registry = Registry::new(["date"]);
    for d in [9, 10, 15, 20, 21] {
        registry.append([("date", Value::from(day(d)))]);
    }
    registry.append([("date", "з 20.05.2024 по 30.05.2024")]);

    let Ok(range) = FilterCondition::range("date", Some(day(10)), Some(day(20))) else {
        panic!("bounded range is valid");
    };
    let view = FilterEngine::apply(&registry, &[range]);
    let kept: Vec<String> = view.records().map(|r| r.value("date").render()).collect();
    assert_eq!(
        kept,
        vec!["10.05.2024", "15.05.2024", "20.05.2024", "з 20.05.2024 по 30.05.2024"]
    );
}

proptest! {
    /// The result is a subsequence of the registry, holding exactly the
    /// records that satisfy every condition.
    #[test]
    fn filter_result_is_ordered_subsequence(rows in rows(), conditions in prop::collection::vec(condition(), 0..4)) {
        let registry = registry(&rows);
        let view = FilterEngine::apply(&registry, &conditions);

        let all: Vec<RecordId> = registry.iter().map(|r| r.id()).collect();
        let mut cursor = all.iter();
        for id in view.ids() {
            prop_assert!(cursor.any(|candidate| candidate == id));
        }

        let schema = registry.schema();
        for record in registry.iter() {
            let expected = conditions
                .iter()
                .filter(|c| schema.contains(c.field()))
                .all(|c| c.matches(record));
            prop_assert_eq!(view.contains(record.id()), expected);
        }
    }

    /// Over non-null values NOT_EQUALS is the complement of EQUALS; null
    /// values satisfy neither.
    #[test]
    fn not_equals_complements_equals(rows in rows(), operand in 0_i64..5) {
        let registry = registry(&rows);
        let equal = FilterCondition::equals("n", operand);
        let not_equal = FilterCondition::not_equals("n", operand);
        for record in registry.iter() {
            if record.value("n").is_missing() {
                prop_assert!(!equal.matches(record) && !not_equal.matches(record));
            } else {
                prop_assert_ne!(equal.matches(record), not_equal.matches(record));
            }
        }
    }
}
