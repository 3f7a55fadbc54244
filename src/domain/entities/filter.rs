use chrono::NaiveDate;
use serde_json::{Map, Value};

use crate::domain::entities::entity::{parse_calendar_date, Entity};

/// Raw UI value that leaves a filter unset.
pub const UNSET_SENTINEL: &str = "all";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
    Equality { case_sensitive: bool },
    Boolean,
    NumericRange,
    DateRange,
    Substring,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum FilterValue {
    #[default]
    Unset,
    Text(String),
    Bool(bool),
    NumberRange {
        min: Option<f64>,
        max: Option<f64>,
    },
    DateRange {
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    },
}

impl FilterValue {
    pub fn is_unset(&self) -> bool {
        matches!(self, FilterValue::Unset)
    }

    /// Parses a raw single-value UI input for `kind`.
    ///
    /// Empty input and the `"all"` sentinel yield `Unset`. Range kinds accept
    /// `"min..max"` with either side left empty.
    pub fn parse(kind: FilterKind, raw: &str) -> Self {
        let raw = raw.trim();
        if raw.is_empty() || raw.eq_ignore_ascii_case(UNSET_SENTINEL) {
            return FilterValue::Unset;
        }
        match kind {
            FilterKind::Equality { .. } | FilterKind::Substring => {
                FilterValue::Text(raw.to_string())
            }
            FilterKind::Boolean => match raw.to_ascii_lowercase().as_str() {
                "true" => FilterValue::Bool(true),
                "false" => FilterValue::Bool(false),
                _ => FilterValue::Unset,
            },
            FilterKind::NumericRange => {
                let (min, max) = split_range(raw);
                FilterValue::NumberRange {
                    min: min.and_then(|v| v.parse().ok()),
                    max: max.and_then(|v| v.parse().ok()),
                }
            }
            FilterKind::DateRange => {
                let (start, end) = split_range(raw);
                FilterValue::DateRange {
                    start: start.and_then(parse_calendar_date),
                    end: end.and_then(parse_calendar_date),
                }
            }
        }
    }

    fn to_json(&self) -> Option<Value> {
        match self {
            FilterValue::Unset => None,
            FilterValue::Text(text) => Some(Value::String(text.clone())),
            FilterValue::Bool(flag) => Some(Value::Bool(*flag)),
            FilterValue::NumberRange { min, max } => {
                let mut range = Map::new();
                if let Some(min) = min {
                    range.insert("min".to_string(), Value::from(*min));
                }
                if let Some(max) = max {
                    range.insert("max".to_string(), Value::from(*max));
                }
                Some(Value::Object(range))
            }
            FilterValue::DateRange { start, end } => {
                let mut range = Map::new();
                if let Some(start) = start {
                    range.insert("start".to_string(), Value::String(start.to_string()));
                }
                if let Some(end) = end {
                    range.insert("end".to_string(), Value::String(end.to_string()));
                }
                Some(Value::Object(range))
            }
        }
    }
}

fn split_range(raw: &str) -> (Option<&str>, Option<&str>) {
    let (low, high) = raw.split_once("..").unwrap_or((raw, raw));
    let low = Some(low.trim()).filter(|v| !v.is_empty());
    let high = Some(high.trim()).filter(|v| !v.is_empty());
    (low, high)
}

#[derive(Debug, Clone, PartialEq)]
pub struct FilterSpec {
    pub field: String,
    pub kind: FilterKind,
    pub value: FilterValue,
}

impl FilterSpec {
    pub fn new(field: &str, kind: FilterKind) -> Self {
        Self {
            field: field.to_string(),
            kind,
            value: FilterValue::Unset,
        }
    }

    /// Evaluates this spec against one entity. Never panics; a value that
    /// does not fit the kind, or a malformed field, does not match.
    pub fn matches(&self, entity: &Entity) -> bool {
        let field = entity.get(&self.field);
        match (&self.kind, &self.value) {
            (_, FilterValue::Unset) => true,
            (FilterKind::Equality { case_sensitive }, FilterValue::Text(expected)) => {
                let Some(actual) = field else {
                    return false;
                };
                let actual = actual.as_text();
                if *case_sensitive {
                    actual == *expected
                } else {
                    actual.to_lowercase() == expected.to_lowercase()
                }
            }
            (FilterKind::Boolean, FilterValue::Bool(expected)) => field
                .and_then(|value| value.as_bool())
                .is_some_and(|actual| actual == *expected),
            (FilterKind::Boolean, FilterValue::Text(expected)) => {
                let expected = expected.trim().to_ascii_lowercase();
                field
                    .and_then(|value| value.as_bool())
                    .is_some_and(|actual| actual.to_string() == expected)
            }
            (FilterKind::NumericRange, FilterValue::NumberRange { min, max }) => {
                if min.is_none() && max.is_none() {
                    return true;
                }
                let Some(actual) = field.and_then(|value| value.as_number()) else {
                    return false;
                };
                min.is_none_or(|min| min <= actual) && max.is_none_or(|max| actual <= max)
            }
            (FilterKind::DateRange, FilterValue::DateRange { start, end }) => {
                if start.is_none() && end.is_none() {
                    return true;
                }
                let Some(actual) = field.and_then(|value| value.as_date()) else {
                    return false;
                };
                start.is_none_or(|start| start <= actual) && end.is_none_or(|end| actual <= end)
            }
            (FilterKind::Substring, FilterValue::Text(needle)) => field
                .map(|value| value.as_text().to_lowercase())
                .is_some_and(|haystack| haystack.contains(&needle.to_lowercase())),
            _ => false,
        }
    }
}

/// Named, ordered collection of field filters.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FilterSet {
    specs: Vec<FilterSpec>,
}

impl FilterSet {
    pub fn new(specs: Vec<FilterSpec>) -> Self {
        let mut set = Self::default();
        for spec in specs {
            set.upsert(spec);
        }
        set
    }

    pub fn specs(&self) -> &[FilterSpec] {
        &self.specs
    }

    pub fn get(&self, field: &str) -> Option<&FilterSpec> {
        self.specs.iter().find(|spec| spec.field == field)
    }

    fn upsert(&mut self, spec: FilterSpec) {
        match self.specs.iter_mut().find(|s| s.field == spec.field) {
            Some(existing) => *existing = spec,
            None => self.specs.push(spec),
        }
    }

    /// Sets the value of a declared filter. Unknown fields are added as
    /// case-sensitive equality filters.
    pub fn set(&mut self, field: &str, value: FilterValue) {
        match self.specs.iter_mut().find(|spec| spec.field == field) {
            Some(spec) => spec.value = value,
            None => self.specs.push(FilterSpec {
                field: field.to_string(),
                kind: FilterKind::Equality {
                    case_sensitive: true,
                },
                value,
            }),
        }
    }

    pub fn reset(&mut self) {
        for spec in &mut self.specs {
            spec.value = FilterValue::Unset;
        }
    }

    pub fn active(&self) -> impl Iterator<Item = &FilterSpec> {
        self.specs.iter().filter(|spec| !spec.value.is_unset())
    }

    pub fn has_active(&self) -> bool {
        self.active().next().is_some()
    }

    pub fn matches(&self, entity: &Entity) -> bool {
        self.active().all(|spec| spec.matches(entity))
    }

    pub fn apply(&self, entities: &[Entity]) -> Vec<Entity> {
        entities
            .iter()
            .filter(|entity| self.matches(entity))
            .cloned()
            .collect()
    }

    /// Active filters as a JSON body for server-side filtered queries.
    pub fn to_query(&self) -> Map<String, Value> {
        self.active()
            .filter_map(|spec| spec.value.to_json().map(|v| (spec.field.clone(), v)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::entity::AttrValue;

    fn student(id: &str, gender: &str, age: f64, active: AttrValue) -> Entity {
        Entity::new(id)
            .with("studentGender", AttrValue::Text(gender.to_string()))
            .with("age", AttrValue::Number(age))
            .with("isActive", active)
    }

    #[test]
    fn parse_treats_sentinel_and_empty_as_unset() {
        let kind = FilterKind::Equality {
            case_sensitive: true,
        };
        assert_eq!(FilterValue::parse(kind, "all"), FilterValue::Unset);
        assert_eq!(FilterValue::parse(kind, "  "), FilterValue::Unset);
        assert_eq!(
            FilterValue::parse(FilterKind::NumericRange, "18.."),
            FilterValue::NumberRange {
                min: Some(18.0),
                max: None
            }
        );
    }

    #[test]
    fn boolean_filter_tolerates_string_payloads() {
        let mut spec = FilterSpec::new("isActive", FilterKind::Boolean);
        spec.value = FilterValue::Bool(true);

        assert!(spec.matches(&student("1", "Male", 20.0, AttrValue::Bool(true))));
        assert!(spec.matches(&student("2", "Male", 20.0, AttrValue::Text("true".into()))));
        assert!(!spec.matches(&student("3", "Male", 20.0, AttrValue::Text("false".into()))));
        assert!(!spec.matches(&Entity::new("4")));
    }

    #[test]
    fn equality_respects_case_mode() {
        let entity = student("1", "Female", 20.0, AttrValue::Bool(true));
        let mut strict = FilterSpec::new(
            "studentGender",
            FilterKind::Equality {
                case_sensitive: true,
            },
        );
        strict.value = FilterValue::Text("female".into());
        assert!(!strict.matches(&entity));

        let mut relaxed = strict.clone();
        relaxed.kind = FilterKind::Equality {
            case_sensitive: false,
        };
        assert!(relaxed.matches(&entity));
    }

    #[test]
    fn missing_field_fails_bounded_range_only() {
        let mut spec = FilterSpec::new("age", FilterKind::NumericRange);
        spec.value = FilterValue::NumberRange {
            min: None,
            max: None,
        };
        assert!(spec.matches(&Entity::new("1")));

        spec.value = FilterValue::NumberRange {
            min: Some(18.0),
            max: None,
        };
        assert!(!spec.matches(&Entity::new("1")));
        assert!(spec.matches(&student("2", "Male", 18.0, AttrValue::Null)));
        assert!(!spec.matches(&student("3", "Male", 17.0, AttrValue::Null)));
    }

    #[test]
    fn date_range_compares_calendar_days() {
        let mut spec = FilterSpec::new("enrolledOn", FilterKind::DateRange);
        spec.value = FilterValue::parse(FilterKind::DateRange, "2024-01-01..2024-01-31");
        let late_on_last_day =
            Entity::new("1").with("enrolledOn", AttrValue::Text("2024-01-31T23:10:00Z".into()));
        let next_month = Entity::new("2").with("enrolledOn", AttrValue::Text("2024-02-01".into()));

        assert!(spec.matches(&late_on_last_day));
        assert!(!spec.matches(&next_month));
    }

    #[test]
    fn mismatched_value_never_matches() {
        let mut spec = FilterSpec::new("age", FilterKind::NumericRange);
        spec.value = FilterValue::Text("abc".into());
        assert!(!spec.matches(&student("1", "Male", 20.0, AttrValue::Null)));
    }

    #[test]
    fn to_query_skips_unset_filters() {
        let mut set = FilterSet::new(vec![
            FilterSpec::new("studentGender", FilterKind::Equality { case_sensitive: true }),
            FilterSpec::new("isActive", FilterKind::Boolean),
        ]);
        set.set("isActive", FilterValue::Bool(false));

        let query = set.to_query();

        assert_eq!(query.len(), 1);
        assert_eq!(query.get("isActive"), Some(&Value::Bool(false)));
    }
}
