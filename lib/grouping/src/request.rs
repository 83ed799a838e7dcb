use serde::{Deserialize, Serialize};
use vgroup_core::{FilterCondition, PointId, Vector, WithPayload};
use crate::{GroupingError, Result};

/// Nearest-neighbour query by vector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchQuery {
    pub vector: Vector,
}

/// Recommendation query by example points
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendQuery {
    pub positive: Vec<PointId>,
    #[serde(default)]
    pub negative: Vec<PointId>,
}

/// The ranking primitive a grouped request runs on
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SourceQuery {
    Search(SearchQuery),
    Recommend(RecommendQuery),
}

/// A grouped search or recommendation request
///
/// ```json
/// { "vector": [1.0, 0.0], "group_by": "docId", "limit": 10, "per_group": 3,
///   "with_payload": true }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupRequest {
    #[serde(flatten)]
    pub query: SourceQuery,
    /// Payload path whose value identifies a group
    pub group_by: String,
    /// Maximum number of groups
    pub limit: usize,
    /// Maximum number of hits per group
    pub per_group: usize,
    #[serde(default)]
    pub with_payload: WithPayload,
    #[serde(default)]
    pub with_vector: bool,
    /// Only points matching this condition are considered
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<FilterCondition>,
    /// Hits scoring below this value are dropped
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score_threshold: Option<f32>,
}

impl GroupRequest {
    pub fn search(vector: Vector, group_by: impl Into<String>, limit: usize, per_group: usize) -> Self {
        Self::new(SourceQuery::Search(SearchQuery { vector }), group_by, limit, per_group)
    }

    pub fn recommend(
        positive: Vec<PointId>,
        negative: Vec<PointId>,
        group_by: impl Into<String>,
        limit: usize,
        per_group: usize,
    ) -> Self {
        Self::new(
            SourceQuery::Recommend(RecommendQuery { positive, negative }),
            group_by,
            limit,
            per_group,
        )
    }

    fn new(query: SourceQuery, group_by: impl Into<String>, limit: usize, per_group: usize) -> Self {
        Self {
            query,
            group_by: group_by.into(),
            limit,
            per_group,
            with_payload: WithPayload::default(),
            with_vector: false,
            filter: None,
            score_threshold: None,
        }
    }

    #[must_use]
    pub fn include_payload(mut self, with_payload: impl Into<WithPayload>) -> Self {
        self.with_payload = with_payload.into();
        self
    }

    #[must_use]
    pub fn include_vector(mut self, with_vector: bool) -> Self {
        self.with_vector = with_vector;
        self
    }

    #[must_use]
    pub fn filtered(mut self, filter: FilterCondition) -> Self {
        self.filter = Some(filter);
        self
    }

    #[must_use]
    pub fn score_threshold(mut self, threshold: f32) -> Self {
        self.score_threshold = Some(threshold);
        self
    }

    /// Reject malformed requests before a grouping session starts
    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: &str| Err(GroupingError::InvalidRequest(msg.to_string()));

        if self.limit == 0 {
            return invalid("limit must be at least 1");
        }
        if self.per_group == 0 {
            return invalid("per_group must be at least 1");
        }
        if self.group_by.trim().is_empty() {
            return invalid("group_by must name a payload field");
        }
        if self.score_threshold.is_some_and(f32::is_nan) {
            return invalid("score_threshold must be a number");
        }
        match &self.query {
            SourceQuery::Search(search) if search.vector.is_empty() => {
                invalid("search vector must not be empty")
            }
            SourceQuery::Recommend(recommend) if recommend.positive.is_empty() => {
                invalid("recommendation needs at least one positive example")
            }
            _ => Ok(()),
        }
    }
}
