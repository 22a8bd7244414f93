//! Cell values.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::dates::{self, DatePick};
use crate::error::ValidationError;

/// A single cell of a record.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Value {
    #[default]
    Null,
    Text(String),
    Number(f64),
    Bool(bool),
    Date(NaiveDate),
}

impl Value {
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// Missing-value test independent of type: null, NaN and blank text.
    #[must_use]
    pub fn is_missing(&self) -> bool {
        match self {
            Self::Null => true,
            Self::Number(n) => n.is_nan(),
            Self::Text(t) => t.trim().is_empty(),
            Self::Bool(_) | Self::Date(_) => false,
        }
    }

    /// Textual rendering used for substring tests and display.
    ///
    /// Dates render as `dd.mm.yyyy`, booleans as `Так`/`Ні`, whole numbers
    /// without a fractional part.
    #[must_use]
    pub fn render(&self) -> String {
        match self {
            Self::Null => String::new(),
            Self::Text(t) => t.clone(),
            Self::Number(n) => render_number(*n),
            Self::Bool(true) => "Так".to_string(),
            Self::Bool(false) => "Ні".to_string(),
            Self::Date(d) => dates::format_date(*d),
        }
    }

    /// Numeric reading: numbers, or text that parses as one.
    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) if !n.is_nan() => Some(*n),
            Self::Text(t) => t.trim().parse::<f64>().ok().filter(|n| !n.is_nan()),
            _ => None,
        }
    }

    /// Date reading: date values, or the first date embedded in the text.
    #[must_use]
    pub fn as_date(&self) -> Option<NaiveDate> {
        DatePick::First.extract(self)
    }

    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    #[must_use]
    pub const fn kind(&self) -> Option<ColumnKind> {
        match self {
            Self::Null => None,
            Self::Text(_) => Some(ColumnKind::Text),
            Self::Number(_) => Some(ColumnKind::Number),
            Self::Bool(_) => Some(ColumnKind::Boolean),
            Self::Date(_) => Some(ColumnKind::Date),
        }
    }
}

#[allow(clippy::cast_possible_truncation)]
fn render_number(n: f64) -> String {
    if n.is_nan() {
        return String::new();
    }
    if n.fract() == 0.0 && n.abs() < 1e15 {
        return (n as i64).to_string();
    }
    n.to_string()
}

/// Yes/no words accepted from users.
#[must_use]
pub fn parse_bool_word(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "так" | "true" | "1" | "yes" => Some(true),
        "ні" | "false" | "0" | "нет" | "no" => Some(false),
        _ => None,
    }
}

#[allow(clippy::cast_precision_loss)]
fn parse_number(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    trimmed
        .parse::<i64>()
        .map(|n| n as f64)
        .ok()
        .or_else(|| trimmed.parse::<f64>().ok())
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

impl From<&str> for Value {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for Value {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<i64> for Value {
    #[allow(clippy::cast_precision_loss)]
    fn from(n: i64) -> Self {
        Self::Number(n as f64)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<NaiveDate> for Value {
    fn from(date: NaiveDate) -> Self {
        Self::Date(date)
    }
}

impl<T: Into<Self>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// Inferred type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    #[default]
    Text,
    Number,
    Boolean,
    Date,
}

impl ColumnKind {
    /// Infer a column type from its values.
    ///
    /// Missing values are ignored; a column is typed only when every present
    /// value agrees, otherwise it is text.
    pub fn infer<'a>(values: impl IntoIterator<Item = &'a Value>) -> Self {
        let mut kinds = values
            .into_iter()
            .filter(|v| !v.is_missing())
            .filter_map(Value::kind);
        let Some(first) = kinds.next() else {
            return Self::Text;
        };
        if kinds.all(|k| k == first) {
            first
        } else {
            Self::Text
        }
    }

    /// Lenient conversion of edited text into a value of this column type.
    ///
    /// Blank input clears typed cells. Input that does not parse is kept as
    /// text rather than rejected.
    #[must_use]
    pub fn coerce(self, raw: &str) -> Value {
        if raw.trim().is_empty() && self != Self::Text {
            return Value::Null;
        }
        let parsed = match self {
            Self::Text => None,
            Self::Number => parse_number(raw).map(Value::Number),
            Self::Boolean => parse_bool_word(raw).map(Value::Bool),
            Self::Date => dates::parse_date(raw).ok().map(Value::Date),
        };
        parsed.unwrap_or_else(|| Value::text(raw))
    }

    /// Strict conversion of an operand for an ordering comparison.
    pub fn parse_ordered(self, raw: &str) -> Result<Value, ValidationError> {
        match self {
            Self::Date => dates::parse_date(raw).map(Value::Date),
            _ => parse_number(raw)
                .map(Value::Number)
                .ok_or_else(|| ValidationError::InvalidNumber(raw.trim().to_string())),
        }
    }

    /// Strict boolean parse.
    pub fn parse_bool(raw: &str) -> Result<bool, ValidationError> {
        parse_bool_word(raw).ok_or_else(|| ValidationError::InvalidBoolean(raw.trim().to_string()))
    }

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Date => "date",
        }
    }
}
