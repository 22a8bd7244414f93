//! Column-level predicates, composed with AND.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, trace};

use casereg_core::dates::{self, DatePick};
use casereg_core::{ColumnKind, Record, Registry, RegistryView, ValidationError, Value};

/// The closed set of condition operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
    Contains,
    Equals,
    NotEquals,
    Range,
    Greater,
    Less,
    IsTrue,
    IsFalse,
    NotNull,
    IsNull,
}

/// What an operator expects after the field name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperandShape {
    None,
    Scalar,
    Range,
}

impl Operator {
    pub const ALL: [Self; 10] = [
        Self::Contains,
        Self::Equals,
        Self::NotEquals,
        Self::Range,
        Self::Greater,
        Self::Less,
        Self::IsTrue,
        Self::IsFalse,
        Self::NotNull,
        Self::IsNull,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Contains => "contains",
            Self::Equals => "equals",
            Self::NotEquals => "not_equals",
            Self::Range => "range",
            Self::Greater => "greater",
            Self::Less => "less",
            Self::IsTrue => "is_true",
            Self::IsFalse => "is_false",
            Self::NotNull => "not_null",
            Self::IsNull => "is_null",
        }
    }

    /// Label shown in the condition list.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Contains => "містить",
            Self::Equals => "дорівнює",
            Self::NotEquals => "не дорівнює",
            Self::Range => "у діапазоні",
            Self::Greater => "більше",
            Self::Less => "менше",
            Self::IsTrue => "так",
            Self::IsFalse => "ні",
            Self::NotNull => "заповнено",
            Self::IsNull => "не заповнено",
        }
    }

    #[must_use]
    pub const fn operand_shape(self) -> OperandShape {
        match self {
            Self::Contains | Self::Equals | Self::NotEquals | Self::Greater | Self::Less => {
                OperandShape::Scalar
            }
            Self::Range => OperandShape::Range,
            Self::IsTrue | Self::IsFalse | Self::NotNull | Self::IsNull => OperandShape::None,
        }
    }
}

impl FromStr for Operator {
    type Err = ValidationError;

    /// Accepts the snake_case name or the list label.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|op| op.as_str() == wanted || op.label() == wanted)
            .ok_or_else(|| ValidationError::UnknownOperator(s.trim().to_string()))
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Operand as supplied by a caller.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    None,
    Scalar(Value),
    Range {
        lower: Option<NaiveDate>,
        upper: Option<NaiveDate>,
    },
}

/// Operator and operand fused, so every arm is a total function.
#[derive(Debug, Clone, PartialEq)]
enum Predicate {
    Contains(String),
    Equals(Value),
    NotEquals(Value),
    Range {
        lower: Option<NaiveDate>,
        upper: Option<NaiveDate>,
    },
    Greater(Value),
    Less(Value),
    IsTrue,
    IsFalse,
    NotNull,
    IsNull,
}

/// `(field, operator, operand)`.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterCondition {
    field: String,
    predicate: Predicate,
}

impl FilterCondition {
    /// Builds a condition, checking the operand fits the operator.
    pub fn new(
        field: impl Into<String>,
        operator: Operator,
        operand: Operand,
    ) -> Result<Self, ValidationError> {
        let predicate = match (operator, operand) {
            (Operator::Contains, Operand::Scalar(v)) => Predicate::Contains(v.render()),
            (Operator::Equals, Operand::Scalar(v)) => Predicate::Equals(v),
            (Operator::NotEquals, Operand::Scalar(v)) => Predicate::NotEquals(v),
            (Operator::Greater, Operand::Scalar(v)) => Predicate::Greater(v),
            (Operator::Less, Operand::Scalar(v)) => Predicate::Less(v),
            (Operator::Range, Operand::Range { lower, upper }) => {
                if lower.is_none() && upper.is_none() {
                    return Err(ValidationError::EmptyRange);
                }
                Predicate::Range { lower, upper }
            }
            (Operator::IsTrue, Operand::None) => Predicate::IsTrue,
            (Operator::IsFalse, Operand::None) => Predicate::IsFalse,
            (Operator::NotNull, Operand::None) => Predicate::NotNull,
            (Operator::IsNull, Operand::None) => Predicate::IsNull,
            (op, Operand::None) => return Err(ValidationError::MissingOperand(op.to_string())),
            (op, _) => return Err(ValidationError::UnexpectedOperand(op.to_string())),
        };
        Ok(Self {
            field: field.into(),
            predicate,
        })
    }

    fn with(field: impl Into<String>, predicate: Predicate) -> Self {
        Self {
            field: field.into(),
            predicate,
        }
    }

    pub fn contains(field: impl Into<String>, text: impl Into<String>) -> Self {
        Self::with(field, Predicate::Contains(text.into()))
    }

    pub fn equals(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::with(field, Predicate::Equals(value.into()))
    }

    pub fn not_equals(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::with(field, Predicate::NotEquals(value.into()))
    }

    pub fn greater(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::with(field, Predicate::Greater(value.into()))
    }

    pub fn less(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::with(field, Predicate::Less(value.into()))
    }

    /// Inclusive date range; at least one bound is required.
    pub fn range(
        field: impl Into<String>,
        lower: Option<NaiveDate>,
        upper: Option<NaiveDate>,
    ) -> Result<Self, ValidationError> {
        Self::new(field, Operator::Range, Operand::Range { lower, upper })
    }

    pub fn is_true(field: impl Into<String>) -> Self {
        Self::with(field, Predicate::IsTrue)
    }

    pub fn is_false(field: impl Into<String>) -> Self {
        Self::with(field, Predicate::IsFalse)
    }

    pub fn not_null(field: impl Into<String>) -> Self {
        Self::with(field, Predicate::NotNull)
    }

    pub fn is_null(field: impl Into<String>) -> Self {
        Self::with(field, Predicate::IsNull)
    }

    /// Builds a condition from user-entered operand text.
    ///
    /// `kind` is the column type. Equality operands on boolean and date
    /// columns must parse; on number columns a non-number is compared as
    /// text. Ordering operands must parse as a date (date columns) or a
    /// number (all others). Range text is `from..to`, either side may be
    /// blank; a single date means that one day.
    pub fn parse(
        field: impl Into<String>,
        operator: Operator,
        raw: &str,
        kind: ColumnKind,
    ) -> Result<Self, ValidationError> {
        let raw = raw.trim();
        let operand = match operator.operand_shape() {
            OperandShape::None if raw.is_empty() => Operand::None,
            OperandShape::None => {
                return Err(ValidationError::UnexpectedOperand(operator.to_string()));
            }
            OperandShape::Scalar if raw.is_empty() => {
                return Err(ValidationError::MissingOperand(operator.to_string()));
            }
            OperandShape::Scalar => Operand::Scalar(scalar_operand(operator, raw, kind)?),
            OperandShape::Range => {
                let (from, to) = raw.split_once("..").unwrap_or((raw, raw));
                return Self::parse_range(field, from, to);
            }
        };
        Self::new(field, operator, operand)
    }

    /// Range from two bound texts; blank means open-ended.
    pub fn parse_range(
        field: impl Into<String>,
        from: &str,
        to: &str,
    ) -> Result<Self, ValidationError> {
        let bound = |raw: &str| -> Result<Option<NaiveDate>, ValidationError> {
            if raw.trim().is_empty() {
                Ok(None)
            } else {
                dates::parse_date(raw).map(Some)
            }
        };
        Self::range(field, bound(from)?, bound(to)?)
    }

    #[must_use]
    pub fn field(&self) -> &str {
        &self.field
    }

    #[must_use]
    pub const fn operator(&self) -> Operator {
        match self.predicate {
            Predicate::Contains(_) => Operator::Contains,
            Predicate::Equals(_) => Operator::Equals,
            Predicate::NotEquals(_) => Operator::NotEquals,
            Predicate::Range { .. } => Operator::Range,
            Predicate::Greater(_) => Operator::Greater,
            Predicate::Less(_) => Operator::Less,
            Predicate::IsTrue => Operator::IsTrue,
            Predicate::IsFalse => Operator::IsFalse,
            Predicate::NotNull => Operator::NotNull,
            Predicate::IsNull => Operator::IsNull,
        }
    }

    #[must_use]
    pub fn operand(&self) -> Operand {
        match &self.predicate {
            Predicate::Contains(text) => Operand::Scalar(Value::text(text.clone())),
            Predicate::Equals(v)
            | Predicate::NotEquals(v)
            | Predicate::Greater(v)
            | Predicate::Less(v) => Operand::Scalar(v.clone()),
            Predicate::Range { lower, upper } => Operand::Range {
                lower: *lower,
                upper: *upper,
            },
            Predicate::IsTrue | Predicate::IsFalse | Predicate::NotNull | Predicate::IsNull => {
                Operand::None
            }
        }
    }

    /// Evaluates the condition against one record.
    ///
    /// Missing values (null, NaN, blank text) match only `IS_NULL`.
    #[must_use]
    pub fn matches(&self, record: &Record) -> bool {
        let value = record.value(&self.field);
        match &self.predicate {
            Predicate::IsNull => value.is_missing(),
            Predicate::NotNull => !value.is_missing(),
            _ if value.is_missing() => false,
            Predicate::IsTrue => value.as_bool() == Some(true),
            Predicate::IsFalse => value.as_bool() == Some(false),
            Predicate::Contains(needle) => value
                .render()
                .to_lowercase()
                .contains(&needle.to_lowercase()),
            Predicate::Equals(operand) => equals(value, operand),
            Predicate::NotEquals(operand) => !equals(value, operand),
            Predicate::Range { lower, upper } => in_range(value, *lower, *upper),
            Predicate::Greater(operand) => compare(value, operand) == Some(Ordering::Greater),
            Predicate::Less(operand) => compare(value, operand) == Some(Ordering::Less),
        }
    }
}

fn scalar_operand(operator: Operator, raw: &str, kind: ColumnKind) -> Result<Value, ValidationError> {
    match operator {
        Operator::Greater | Operator::Less => kind.parse_ordered(raw),
        Operator::Contains => Ok(Value::text(raw)),
        _ => match kind {
            ColumnKind::Boolean => ColumnKind::parse_bool(raw).map(Value::Bool),
            ColumnKind::Date => dates::parse_date(raw).map(Value::Date),
            ColumnKind::Number => Ok(kind.coerce(raw)),
            ColumnKind::Text => Ok(Value::text(raw)),
        },
    }
}

/// Same-type values compare by value, anything else by trimmed rendering.
fn equals(value: &Value, operand: &Value) -> bool {
    match (value, operand) {
        (Value::Text(a), Value::Text(b)) => a == b,
        (Value::Number(a), Value::Number(b)) => a == b,
        (Value::Bool(a), Value::Bool(b)) => a == b,
        (Value::Date(a), Value::Date(b)) => a == b,
        _ => value.render().trim() == operand.render().trim(),
    }
}

fn in_range(value: &Value, lower: Option<NaiveDate>, upper: Option<NaiveDate>) -> bool {
    let Some(date) = DatePick::First.extract(value) else {
        return false;
    };
    lower.is_none_or(|l| date >= l) && upper.is_none_or(|u| date <= u)
}

/// Numeric operands order numbers, date operands order dates; nothing else
/// is ordered.
fn compare(value: &Value, operand: &Value) -> Option<Ordering> {
    match operand {
        Value::Number(n) => value.as_number()?.partial_cmp(n),
        Value::Date(d) => Some(value.as_date()?.cmp(d)),
        Value::Null | Value::Text(_) | Value::Bool(_) => None,
    }
}

impl fmt::Display for FilterCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = self.operator().label();
        match &self.predicate {
            Predicate::Range { lower, upper } => {
                let bound =
                    |d: Option<NaiveDate>| d.map_or_else(|| "...".to_string(), dates::format_date);
                write!(f, "{}: {} — {}", self.field, bound(*lower), bound(*upper))
            }
            Predicate::Contains(text) => write!(f, "{} {label} {text}", self.field),
            Predicate::Equals(v)
            | Predicate::NotEquals(v)
            | Predicate::Greater(v)
            | Predicate::Less(v) => write!(f, "{} {label} {v}", self.field),
            Predicate::IsTrue | Predicate::IsFalse | Predicate::NotNull | Predicate::IsNull => {
                write!(f, "{} {label}", self.field)
            }
        }
    }
}

/// Applies condition lists to a registry.
pub struct FilterEngine;

impl FilterEngine {
    /// Records of `registry` satisfying every condition, in registry order.
    ///
    /// Conditions on fields the schema does not have are skipped.
    #[must_use]
    pub fn apply<'a>(registry: &'a Registry, conditions: &[FilterCondition]) -> RegistryView<'a> {
        Self::apply_to(registry.view(), conditions)
    }

    /// Narrows an existing view.
    #[must_use]
    pub fn apply_to<'a>(view: RegistryView<'a>, conditions: &[FilterCondition]) -> RegistryView<'a> {
        let schema = view.registry().schema();
        let mut view = view;
        for condition in conditions {
            if !schema.contains(condition.field()) {
                debug!("Condition '{condition}' skipped: no such field");
                continue;
            }
            view = view.filter(|record| condition.matches(record));
            trace!("'{condition}' leaves {} records", view.len());
            if view.is_empty() {
                debug!("Filter chain emptied at '{condition}'");
                break;
            }
        }
        view
    }
}

/// Facet equality, e.g. one prosecutor office out of all of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Facet {
    pub field: String,
    pub value: String,
}

/// Condition list, then facet, then global search.
#[derive(Debug, Clone, Default)]
pub struct RegistryQuery {
    pub conditions: Vec<FilterCondition>,
    /// `None` means every facet value.
    pub facet: Option<Facet>,
    pub search: Option<String>,
}

impl RegistryQuery {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_condition(mut self, condition: FilterCondition) -> Self {
        self.conditions.push(condition);
        self
    }

    #[must_use]
    pub fn with_facet(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.facet = Some(Facet {
            field: field.into(),
            value: value.into(),
        });
        self
    }

    #[must_use]
    pub fn with_search(mut self, text: impl Into<String>) -> Self {
        self.search = Some(text.into());
        self
    }

    #[must_use]
    pub fn run<'a>(&self, registry: &'a Registry) -> RegistryView<'a> {
        let mut view = FilterEngine::apply(registry, &self.conditions);

        let facet = self
            .facet
            .as_ref()
            .filter(|f| registry.schema().contains(&f.field));
        if let Some(facet) = facet {
            let wanted = facet.value.trim();
            view = view.filter(|r| r.value(&facet.field).render().trim() == wanted);
        }

        let needle = self
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase);
        if let Some(needle) = needle {
            view = view.filter(|r| {
                r.fields()
                    .any(|(_, v)| !v.is_missing() && v.render().to_lowercase().contains(&needle))
            });
        }

        debug!("Query leaves {} of {} records", view.len(), registry.len());
        view
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
    }

    fn registry() -> Registry {
        Registry::from_rows(
            ["ПІБ", "Статус", "Вік", "Є_Інтерпол", "Дата_реєстрації"],
            [
                vec![
                    ("ПІБ", Value::from("Петренко Іван")),
                    ("Статус", Value::from("Open")),
                    ("Вік", Value::from(34_i64)),
                    ("Є_Інтерпол", Value::from(true)),
                    ("Дата_реєстрації", Value::from("зареєстровано 05.03.2024")),
                ],
                vec![
                    ("ПІБ", Value::from("Коваль Олег")),
                    ("Статус", Value::from("closed")),
                    ("Вік", Value::from(f64::NAN)),
                    ("Є_Інтерпол", Value::from(false)),
                    ("Дата_реєстрації", Value::from(date(2024, 1, 10))),
                ],
                vec![
                    ("ПІБ", Value::from("Шевченко Тарас")),
                    ("Статус", Value::from("reopened")),
                    ("Вік", Value::from(51_i64)),
                    ("Дата_реєстрації", Value::from("невідомо")),
                ],
            ],
        )
    }

    fn names(view: &RegistryView<'_>) -> Vec<String> {
        view.records().map(|r| r.value("ПІБ").render()).collect()
    }

    #[test]
    fn test_contains_is_case_insensitive() {
        let registry = registry();
        let view = FilterEngine::apply(&registry, &[FilterCondition::contains("Статус", "OPEN")]);
        assert_eq!(names(&view), vec!["Петренко Іван", "Шевченко Тарас"]);
    }

    #[test]
    fn test_unknown_field_is_a_noop() {
        let registry = registry();
        let view = FilterEngine::apply(&registry, &[FilterCondition::contains("Нема", "x")]);
        assert_eq!(view.len(), 3);
    }

    #[test]
    fn test_missing_values_only_match_null_checks() {
        let registry = registry();
        let nulls = FilterEngine::apply(&registry, &[FilterCondition::is_null("Вік")]);
        assert_eq!(names(&nulls), vec!["Коваль Олег"]);

        let not_equal = FilterEngine::apply(&registry, &[FilterCondition::not_equals("Вік", 34_i64)]);
        assert_eq!(names(&not_equal), vec!["Шевченко Тарас"]);

        let interpol = FilterEngine::apply(&registry, &[FilterCondition::is_null("Є_Інтерпол")]);
        assert_eq!(names(&interpol), vec!["Шевченко Тарас"]);
    }

    #[test]
    fn test_equals_across_types_compares_renderings() {
        let registry = registry();
        let view = FilterEngine::apply(&registry, &[FilterCondition::equals("Вік", " 51 ")]);
        assert_eq!(names(&view), vec!["Шевченко Тарас"]);
    }

    #[test]
    fn test_range_reads_first_embedded_date() {
        let registry = registry();
        let condition = FilterCondition::range("Дата_реєстрації", Some(date(2024, 3, 5)), None);
        let Ok(condition) = condition else {
            panic!("range with a lower bound is valid");
        };
        let view = FilterEngine::apply(&registry, &[condition]);
        assert_eq!(names(&view), vec!["Петренко Іван"]);
    }

    #[test]
    fn test_range_needs_a_bound() {
        assert_eq!(
            FilterCondition::range("Дата_реєстрації", None, None),
            Err(ValidationError::EmptyRange)
        );
        assert_eq!(
            FilterCondition::parse_range("Дата_реєстрації", " ", ""),
            Err(ValidationError::EmptyRange)
        );
    }

    #[test]
    fn test_ordering_ignores_non_numeric_values() {
        let registry = registry();
        let older = FilterEngine::apply(&registry, &[FilterCondition::greater("Вік", 40_i64)]);
        assert_eq!(names(&older), vec!["Шевченко Тарас"]);
        let by_text = FilterEngine::apply(&registry, &[FilterCondition::less("ПІБ", "Я")]);
        assert!(by_text.is_empty());
    }

    #[test]
    fn test_ordering_by_date_operand() {
        let registry = registry();
        let later = FilterEngine::apply(
            &registry,
            &[FilterCondition::greater("Дата_реєстрації", date(2024, 2, 1))],
        );
        assert_eq!(names(&later), vec!["Петренко Іван"]);

        let earlier = FilterEngine::apply(
            &registry,
            &[FilterCondition::less("Дата_реєстрації", date(2024, 2, 1))],
        );
        assert_eq!(names(&earlier), vec!["Коваль Олег"]);
    }

    #[test]
    fn test_date_ordering_is_strict() {
        let registry = registry();
        let day = date(2024, 3, 5);
        let greater = FilterEngine::apply(&registry, &[FilterCondition::greater("Дата_реєстрації", day)]);
        assert!(greater.is_empty());
        let less = FilterEngine::apply(&registry, &[FilterCondition::less("Дата_реєстрації", day)]);
        assert_eq!(names(&less), vec!["Коваль Олег"]);
    }

    #[test]
    fn test_date_ordering_skips_cells_without_a_date() {
        let registry = registry();
        let conditions = [
            FilterCondition::greater("Дата_реєстрації", date(1900, 1, 1)),
            FilterCondition::less("Дата_реєстрації", date(2100, 1, 1)),
        ];
        for condition in conditions {
            let view = FilterEngine::apply(&registry, std::slice::from_ref(&condition));
            assert!(!names(&view).contains(&"Шевченко Тарас".to_string()));
            assert_eq!(view.len(), 2);
        }
    }

    #[test]
    fn test_parse_date_operand_orders_dates() {
        let condition = FilterCondition::parse(
            "Дата_реєстрації",
            Operator::Greater,
            "01.03.2024",
            ColumnKind::Date,
        );
        let condition = condition.ok();
        assert_eq!(
            condition.as_ref().map(FilterCondition::operand),
            Some(Operand::Scalar(Value::Date(date(2024, 3, 1))))
        );
        let registry = registry();
        let view = FilterEngine::apply(&registry, condition.as_slice());
        assert_eq!(names(&view), vec!["Петренко Іван"]);
    }

    #[test]
    fn test_boolean_operators() {
        let registry = registry();
        let yes = FilterEngine::apply(&registry, &[FilterCondition::is_true("Є_Інтерпол")]);
        assert_eq!(names(&yes), vec!["Петренко Іван"]);
        let no = FilterEngine::apply(&registry, &[FilterCondition::is_false("Є_Інтерпол")]);
        assert_eq!(names(&no), vec!["Коваль Олег"]);
    }

    #[test]
    fn test_parse_builds_typed_operands() {
        let bool_condition = FilterCondition::parse("Є_Інтерпол", Operator::Equals, "так", ColumnKind::Boolean);
        assert_eq!(bool_condition.map(|c| c.operand()), Ok(Operand::Scalar(Value::Bool(true))));

        let bad_bool = FilterCondition::parse("Є_Інтерпол", Operator::Equals, "можливо", ColumnKind::Boolean);
        assert!(matches!(bad_bool, Err(ValidationError::InvalidBoolean(_))));

        let number = FilterCondition::parse("Вік", Operator::Greater, "40", ColumnKind::Number);
        assert_eq!(number.map(|c| c.operand()), Ok(Operand::Scalar(Value::Number(40.0))));

        let bad_date = FilterCondition::parse("Дата", Operator::Range, "31.02.2024..", ColumnKind::Date);
        assert!(matches!(bad_date, Err(ValidationError::InvalidDate(_))));

        let missing = FilterCondition::parse("Статус", Operator::Contains, "  ", ColumnKind::Text);
        assert!(matches!(missing, Err(ValidationError::MissingOperand(_))));

        let extra = FilterCondition::parse("Статус", Operator::IsNull, "x", ColumnKind::Text);
        assert!(matches!(extra, Err(ValidationError::UnexpectedOperand(_))));
    }

    #[test]
    fn test_parse_single_date_range_is_one_day() {
        let condition = FilterCondition::parse("Дата", Operator::Range, "10.01.2024", ColumnKind::Date);
        assert_eq!(
            condition.map(|c| c.operand()),
            Ok(Operand::Range {
                lower: Some(date(2024, 1, 10)),
                upper: Some(date(2024, 1, 10)),
            })
        );
    }

    #[test]
    fn test_operator_names() {
        assert_eq!("not_equals".parse::<Operator>(), Ok(Operator::NotEquals));
        assert_eq!("Містить".parse::<Operator>(), Ok(Operator::Contains));
        assert_eq!("не дорівнює".parse::<Operator>(), Ok(Operator::NotEquals));
        assert!("like".parse::<Operator>().is_err());
    }

    #[test]
    fn test_condition_labels() {
        assert_eq!(FilterCondition::contains("Статус", "open").to_string(), "Статус містить open");
        let range = FilterCondition::range("Дата", Some(date(2024, 1, 1)), None);
        assert_eq!(
            range.map(|c| c.to_string()),
            Ok("Дата: 01.01.2024 — ...".to_string())
        );
    }

    #[test]
    fn test_query_order_facet_and_search() {
        let mut registry = registry();
        registry.append([("ПІБ", "Бондар Марія"), ("Прокуратура", "Київська")]);
        registry.append([("ПІБ", "Бондаренко Петро"), ("Прокуратура", "Одеська")]);

        let query = RegistryQuery::new()
            .with_facet("Прокуратура", "Київська")
            .with_search("  бонд ");
        assert_eq!(names(&query.run(&registry)), vec!["Бондар Марія"]);

        let filtered = RegistryQuery::new()
            .with_condition(FilterCondition::contains("Статус", "open"))
            .with_search("шевч");
        assert_eq!(names(&filtered.run(&registry)), vec!["Шевченко Тарас"]);

        let everything = RegistryQuery::new().with_search("   ").run(&registry);
        assert_eq!(everything.len(), registry.len());
    }
}
