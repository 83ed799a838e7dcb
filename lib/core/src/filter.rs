// Payload filter implementation
use serde::{Deserialize, Serialize};
use serde_json::Value;
use crate::{payload, Point, PointId};

pub trait Filter {
    fn matches(&self, point: &Point) -> bool;
}

impl<F: Fn(&Point) -> bool> Filter for F {
    fn matches(&self, point: &Point) -> bool {
        self(point)
    }
}

pub struct PayloadFilter {
    condition: FilterCondition,
}

/// A filter condition over point payloads
///
/// Deserializes from externally tagged JSON, e.g.
/// `{"equals": {"field": "lang", "value": "en"}}` or
/// `{"not": {"is_empty": {"field": "docId"}}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterCondition {
    Equals { field: String, value: Value },
    NotEquals { field: String, value: Value },
    GreaterThan { field: String, value: f64 },
    LessThan { field: String, value: f64 },
    GreaterEqual { field: String, value: f64 },
    LessEqual { field: String, value: f64 },
    Contains { field: String, value: String },
    /// Field is missing, `null` or an empty array
    IsEmpty { field: String },
    HasId(Vec<PointId>),
    And(Vec<FilterCondition>),
    Or(Vec<FilterCondition>),
    Not(Box<FilterCondition>),
}

impl PayloadFilter {
    pub fn new(condition: FilterCondition) -> Self {
        Self { condition }
    }

    fn get_field_value<'a>(point: &'a Point, field: &str) -> Option<&'a Value> {
        point
            .payload
            .as_ref()
            .and_then(|p| payload::value_at(p, field))
    }

    fn compare(point: &Point, field: &str, check: impl Fn(f64) -> bool) -> bool {
        Self::get_field_value(point, field)
            .and_then(Value::as_f64)
            .map(check)
            .unwrap_or(false)
    }

    fn matches_condition(condition: &FilterCondition, point: &Point) -> bool {
        match condition {
            FilterCondition::Equals { field, value } => {
                Self::get_field_value(point, field)
                    .map(|v| v == value)
                    .unwrap_or(false)
            }
            FilterCondition::NotEquals { field, value } => {
                Self::get_field_value(point, field)
                    .map(|v| v != value)
                    .unwrap_or(true)
            }
            FilterCondition::GreaterThan { field, value } => {
                Self::compare(point, field, |v| v > *value)
            }
            FilterCondition::LessThan { field, value } => {
                Self::compare(point, field, |v| v < *value)
            }
            FilterCondition::GreaterEqual { field, value } => {
                Self::compare(point, field, |v| v >= *value)
            }
            FilterCondition::LessEqual { field, value } => {
                Self::compare(point, field, |v| v <= *value)
            }
            FilterCondition::Contains { field, value } => {
                Self::get_field_value(point, field)
                    .and_then(Value::as_str)
                    .map(|v| v.contains(value.as_str()))
                    .unwrap_or(false)
            }
            FilterCondition::IsEmpty { field } => {
                payload::is_empty(Self::get_field_value(point, field))
            }
            FilterCondition::HasId(ids) => ids.contains(&point.id),
            FilterCondition::And(conditions) => {
                conditions.iter().all(|c| Self::matches_condition(c, point))
            }
            FilterCondition::Or(conditions) => {
                conditions.iter().any(|c| Self::matches_condition(c, point))
            }
            FilterCondition::Not(condition) => {
                !Self::matches_condition(condition, point)
            }
        }
    }
}

impl Filter for PayloadFilter {
    fn matches(&self, point: &Point) -> bool {
        Self::matches_condition(&self.condition, point)
    }
}

impl From<FilterCondition> for PayloadFilter {
    fn from(condition: FilterCondition) -> Self {
        PayloadFilter::new(condition)
    }
}
