use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use uuid::Uuid;
use crate::vector::Vector;

/// A point in the vector space with optional payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Point {
    pub id: PointId,
    /// Version number - incremented on each update
    #[serde(default)]
    pub version: u64,
    #[serde(alias = "vectors")]
    pub vector: Vector,
    #[serde(default)]
    pub payload: Option<serde_json::Value>,
}

/// Point identifier
///
/// Ordering is total: integers sort before UUIDs, UUIDs before strings,
/// and values of the same kind compare naturally. Search results use this
/// order to break score ties.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PointId {
    Integer(u64),
    Uuid(Uuid),
    String(String),
}

impl std::fmt::Display for PointId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PointId::String(s) => write!(f, "{}", s),
            PointId::Uuid(u) => write!(f, "{}", u),
            PointId::Integer(i) => write!(f, "{}", i),
        }
    }
}

impl From<String> for PointId {
    fn from(s: String) -> Self {
        PointId::String(s)
    }
}

impl From<&str> for PointId {
    fn from(s: &str) -> Self {
        PointId::String(s.to_string())
    }
}

impl From<u64> for PointId {
    fn from(i: u64) -> Self {
        PointId::Integer(i)
    }
}

impl From<Uuid> for PointId {
    fn from(u: Uuid) -> Self {
        PointId::Uuid(u)
    }
}

impl Point {
    #[inline]
    #[must_use]
    pub fn new(id: PointId, vector: Vector, payload: Option<serde_json::Value>) -> Self {
        Self {
            id,
            version: 0,
            vector,
            payload,
        }
    }

    #[inline]
    #[must_use]
    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = Some(payload);
        self
    }
}

/// Ranking order for scored points: higher score first, then ascending id.
///
/// `Ordering::Less` means `a` ranks ahead of `b`.
#[inline]
pub fn rank_cmp(a: (f32, &PointId), b: (f32, &PointId)) -> Ordering {
    OrderedFloat(b.0)
        .cmp(&OrderedFloat(a.0))
        .then_with(|| a.1.cmp(b.1))
}

/// A point as returned by retrieval: payload and vector are present only
/// when they were asked for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: PointId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vector: Option<Vector>,
}
