use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::cmp::Ordering;
use vgroup_core::{rank_cmp, PointId, Record, Vector};

/// A scored point produced by one round of a candidate source
///
/// Also the shape of a hit in the grouped response; payload and vector are
/// omitted when absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredCandidate {
    pub id: PointId,
    pub score: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vector: Option<Vector>,
}

impl ScoredCandidate {
    pub fn new(id: PointId, score: f32) -> Self {
        Self {
            id,
            score,
            payload: None,
            vector: None,
        }
    }

    #[must_use]
    pub fn with_payload(mut self, payload: Value) -> Self {
        self.payload = Some(payload);
        self
    }

    /// Ranking order: higher score first, ties by ascending id
    #[inline]
    pub fn rank_cmp(&self, other: &Self) -> Ordering {
        rank_cmp((self.score, &self.id), (other.score, &other.id))
    }

    /// Replace payload and vector with a retrieved record's
    pub fn hydrate(&mut self, record: Option<&Record>) {
        self.payload = record.and_then(|r| r.payload.clone());
        self.vector = record.and_then(|r| r.vector.clone());
    }
}

/// One group of the response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointGroup {
    /// `{ <group_by>: <key> }`
    pub group_id: Map<String, Value>,
    pub hits: Vec<ScoredCandidate>,
}

impl PointGroup {
    /// The key value of this group
    pub fn key_value(&self) -> Option<&Value> {
        self.group_id.values().next()
    }
}

/// Grouped response: groups ordered by their best hit
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupsResult {
    pub groups: Vec<PointGroup>,
}

impl GroupsResult {
    /// Total number of hits across all groups
    pub fn hit_count(&self) -> usize {
        self.groups.iter().map(|g| g.hits.len()).sum()
    }
}
