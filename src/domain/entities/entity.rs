use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, NaiveDate};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub String);

impl From<&str> for EntityId {
    fn from(value: &str) -> Self {
        EntityId(value.to_string())
    }
}

impl From<String> for EntityId {
    fn from(value: String) -> Self {
        EntityId(value)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Scalar attribute value as delivered by the backend.
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    Text(String),
    Number(f64),
    Bool(bool),
    Date(NaiveDate),
    Null,
}

impl AttrValue {
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => AttrValue::Null,
            Value::Bool(flag) => AttrValue::Bool(*flag),
            Value::Number(number) => number
                .as_f64()
                .map(AttrValue::Number)
                .unwrap_or(AttrValue::Null),
            Value::String(text) => AttrValue::Text(text.clone()),
            // Nested objects and arrays keep their JSON text so search still sees them.
            other => AttrValue::Text(other.to_string()),
        }
    }

    /// String form used by search, equality and boolean coercion.
    pub fn as_text(&self) -> String {
        match self {
            AttrValue::Text(text) => text.clone(),
            AttrValue::Number(number) => format_number(*number),
            AttrValue::Bool(flag) => flag.to_string(),
            AttrValue::Date(date) => date.format("%Y-%m-%d").to_string(),
            AttrValue::Null => String::new(),
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            AttrValue::Number(number) => Some(*number),
            AttrValue::Text(text) => text.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
            _ => None,
        }
    }

    /// Calendar date, ignoring any time-of-day component.
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            AttrValue::Date(date) => Some(*date),
            AttrValue::Text(text) => parse_calendar_date(text),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self.as_text().trim().to_ascii_lowercase().as_str() {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        }
    }
}

pub fn parse_calendar_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(stamp) = DateTime::parse_from_rfc3339(text) {
        return Some(stamp.date_naive());
    }
    // Backend timestamps without offset, e.g. 2024-02-01T10:00:00.000
    text.get(..10)
        .and_then(|prefix| NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok())
}

fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

/// One record of a displayed collection.
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    pub id: EntityId,
    pub attributes: BTreeMap<String, AttrValue>,
}

impl Entity {
    pub fn new(id: impl Into<EntityId>) -> Self {
        Self {
            id: id.into(),
            attributes: BTreeMap::new(),
        }
    }

    pub fn with(mut self, field: &str, value: AttrValue) -> Self {
        self.attributes.insert(field.to_string(), value);
        self
    }

    pub fn get(&self, field: &str) -> Option<&AttrValue> {
        self.attributes.get(field)
    }

    /// Missing fields read as the empty string.
    pub fn text(&self, field: &str) -> String {
        self.get(field).map(AttrValue::as_text).unwrap_or_default()
    }

    /// Builds an entity from one JSON object of a response body.
    ///
    /// The identifier is read from `id_field`; when absent, `position` (the
    /// record's absolute index in the collection) stands in for it.
    pub fn from_json(value: &Value, id_field: &str, position: usize) -> Option<Self> {
        let object = value.as_object()?;
        let id = match object.get(id_field) {
            Some(Value::String(text)) => text.clone(),
            Some(Value::Number(number)) => number.to_string(),
            _ => format!("#{position}"),
        };
        let attributes = object
            .iter()
            .map(|(key, value)| (key.clone(), AttrValue::from_json(value)))
            .collect();
        Some(Self {
            id: EntityId(id),
            attributes,
        })
    }
}
