//! Candidate sources
//!
//! A candidate source wraps the underlying ranking primitive (vector search
//! or recommendation). Every fetch is a fresh top-`pool_size` retrieval
//! over the corpus minus the exclusions, not a cursor, so sources must not
//! keep state between calls.

use ahash::AHashSet;
use rayon::prelude::*;
use vgroup_core::{
    recommend_query, Collection, Filter, PayloadFilter, Point, PointId, Record, Vector,
    WithPayload,
};
use crate::key::{self, GroupKey};
use crate::request::{GroupRequest, SourceQuery};
use crate::types::ScoredCandidate;
use crate::Result;

/// Restriction on group keys for one fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyScope {
    /// Any point with a group key
    Any,
    /// Skip points of these groups, used once groups are full
    Exclude(AHashSet<GroupKey>),
    /// Only points of these groups, used to fill groups that lack hits
    Only(AHashSet<GroupKey>),
}

impl KeyScope {
    #[inline]
    pub fn admits(&self, key: &GroupKey) -> bool {
        match self {
            KeyScope::Any => true,
            KeyScope::Exclude(keys) => !keys.contains(key),
            KeyScope::Only(keys) => keys.contains(key),
        }
    }
}

/// Parameters of one round of retrieval
#[derive(Debug, Clone, Copy)]
pub struct FetchRequest<'a> {
    pub pool_size: usize,
    pub exclude_ids: &'a AHashSet<PointId>,
    /// Payload path of the group key
    pub key_path: &'a str,
    pub key_scope: &'a KeyScope,
}

impl FetchRequest<'_> {
    /// True if a point with this id and payload may be returned
    pub fn admits(&self, id: &PointId, payload: Option<&serde_json::Value>) -> bool {
        !self.exclude_ids.contains(id)
            && key::extract(payload, self.key_path)
                .map(|k| self.key_scope.admits(&k))
                .unwrap_or(false)
    }
}

pub trait CandidateSource {
    /// Top `pool_size` candidates not in `exclude_ids`, ordered by
    /// descending score then ascending id
    ///
    /// Candidates carry only the group key field of their payload and no
    /// vector.
    fn fetch(&self, request: &FetchRequest<'_>) -> Result<Vec<ScoredCandidate>>;

    /// Load payload and vector for final hits
    ///
    /// Unknown ids are skipped.
    fn retrieve(&self, ids: &[PointId], with_payload: &WithPayload, with_vector: bool) -> Result<Vec<Record>>;
}

/// A request's query resolved to a vector, ready to run on any shard
#[derive(Debug, Clone)]
pub struct PreparedQuery {
    vector: Vector,
    /// Recommendation examples, never returned as candidates
    examples: AHashSet<PointId>,
    filter: Option<vgroup_core::FilterCondition>,
    score_threshold: Option<f32>,
}

impl PreparedQuery {
    /// Resolve the request's query, looking up example vectors with `lookup`
    pub fn resolve<F>(request: &GroupRequest, lookup: F) -> Result<Self>
    where
        F: Fn(&PointId) -> Option<Vector>,
    {
        let (vector, examples) = match &request.query {
            SourceQuery::Search(search) => (search.vector.clone(), AHashSet::new()),
            SourceQuery::Recommend(recommend) => {
                let vectors = |ids: &[PointId]| -> Result<Vec<Vector>> {
                    ids.iter()
                        .map(|id| {
                            lookup(id).ok_or_else(|| vgroup_core::Error::PointNotFound(id.to_string()).into())
                        })
                        .collect()
                };
                let positive = vectors(&recommend.positive)?;
                let negative = vectors(&recommend.negative)?;
                let examples: AHashSet<PointId> = recommend
                    .positive
                    .iter()
                    .chain(&recommend.negative)
                    .cloned()
                    .collect();
                (recommend_query(&positive, &negative)?, examples)
            }
        };

        Ok(Self {
            vector,
            examples,
            filter: request.filter.clone(),
            score_threshold: request.score_threshold,
        })
    }
}

/// Candidate source over one in-memory [`Collection`]
pub struct CollectionSource<'a> {
    collection: &'a Collection,
    vector: Vector,
    examples: AHashSet<PointId>,
    filter: Option<PayloadFilter>,
    score_threshold: Option<f32>,
}

impl<'a> CollectionSource<'a> {
    pub fn new(collection: &'a Collection, query: PreparedQuery) -> Self {
        Self {
            collection,
            vector: query.vector,
            examples: query.examples,
            filter: query.filter.map(PayloadFilter::new),
            score_threshold: query.score_threshold,
        }
    }

    /// Build a source for `request`, resolving examples in `collection`
    pub fn for_request(collection: &'a Collection, request: &GroupRequest) -> Result<Self> {
        let query = PreparedQuery::resolve(request, |id| collection.get(id).map(|p| p.vector))?;
        Ok(Self::new(collection, query))
    }
}

impl CandidateSource for CollectionSource<'_> {
    fn fetch(&self, request: &FetchRequest<'_>) -> Result<Vec<ScoredCandidate>> {
        let admits = |point: &Point| {
            !self.examples.contains(&point.id)
                && request.admits(&point.id, point.payload.as_ref())
                && self.filter.as_ref().map(|f| f.matches(point)).unwrap_or(true)
        };

        let found = self
            .collection
            .search(&self.vector, request.pool_size, Some(&admits))?;

        let key_only = WithPayload::Fields(vec![request.key_path.to_string()]);
        Ok(found
            .into_iter()
            .filter(|(point, _)| !request.exclude_ids.contains(&point.id))
            .filter(|(_, score)| self.score_threshold.map(|t| *score >= t).unwrap_or(true))
            .map(|(point, score)| ScoredCandidate {
                payload: key_only.apply(point.payload.as_ref()),
                id: point.id,
                score,
                vector: None,
            })
            .collect())
    }

    fn retrieve(&self, ids: &[PointId], with_payload: &WithPayload, with_vector: bool) -> Result<Vec<Record>> {
        Ok(self.collection.retrieve(ids, with_payload, with_vector))
    }
}

/// Fans fetches out to several sources in parallel and merges the results
/// into one deterministically ordered batch
pub struct ShardedSource<S> {
    shards: Vec<S>,
}

impl<S: CandidateSource + Sync> ShardedSource<S> {
    pub fn new(shards: Vec<S>) -> Self {
        Self { shards }
    }

    pub fn shard_count(&self) -> usize {
        self.shards.len()
    }
}

impl<'a> ShardedSource<CollectionSource<'a>> {
    /// One source per collection; recommendation examples may live in any shard
    pub fn for_request(collections: &'a [Collection], request: &GroupRequest) -> Result<Self> {
        let query = PreparedQuery::resolve(request, |id| {
            collections
                .iter()
                .find_map(|c| c.get(id))
                .map(|p| p.vector)
        })?;
        Ok(Self::new(
            collections
                .iter()
                .map(|c| CollectionSource::new(c, query.clone()))
                .collect(),
        ))
    }
}

impl<S: CandidateSource + Sync> CandidateSource for ShardedSource<S> {
    fn fetch(&self, request: &FetchRequest<'_>) -> Result<Vec<ScoredCandidate>> {
        let batches = self
            .shards
            .par_iter()
            .map(|shard| shard.fetch(request))
            .collect::<Result<Vec<_>>>()?;

        let mut merged: Vec<ScoredCandidate> = batches.into_iter().flatten().collect();
        merged.sort_by(ScoredCandidate::rank_cmp);
        merged.truncate(request.pool_size);
        Ok(merged)
    }

    fn retrieve(&self, ids: &[PointId], with_payload: &WithPayload, with_vector: bool) -> Result<Vec<Record>> {
        let per_shard = self
            .shards
            .par_iter()
            .map(|shard| shard.retrieve(ids, with_payload, with_vector))
            .collect::<Result<Vec<_>>>()?;
        Ok(per_shard.into_iter().flatten().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use vgroup_core::{CollectionConfig, Distance, FilterCondition};

    fn docs_collection(ids: std::ops::Range<u64>) -> Collection {
        let collection = Collection::new(CollectionConfig {
            name: "docs".to_string(),
            vector_dim: 2,
            distance: Distance::Dot,
        });
        for i in ids {
            collection
                .upsert(Point::new(
                    PointId::Integer(i),
                    Vector::new(vec![i as f32, 1.0]),
                    Some(json!({"docId": format!("doc_{}", i % 3), "text": "body", "n": i})),
                ))
                .unwrap();
        }
        collection
    }

    fn fetch(source: &impl CandidateSource, pool: usize, exclude: &AHashSet<PointId>, scope: &KeyScope) -> Vec<ScoredCandidate> {
        source
            .fetch(&FetchRequest {
                pool_size: pool,
                exclude_ids: exclude,
                key_path: "docId",
                key_scope: scope,
            })
            .unwrap()
    }

    fn ids(candidates: &[ScoredCandidate]) -> Vec<u64> {
        candidates
            .iter()
            .map(|c| match c.id {
                PointId::Integer(i) => i,
                ref other => panic!("unexpected id {}", other),
            })
            .collect()
    }

    #[test]
    fn test_fetch_orders_and_projects() {
        let collection = docs_collection(0..6);
        let request = GroupRequest::search(Vector::new(vec![1.0, 0.0]), "docId", 2, 2);
        let source = CollectionSource::for_request(&collection, &request).unwrap();

        let batch = fetch(&source, 3, &AHashSet::new(), &KeyScope::Any);
        assert_eq!(ids(&batch), vec![5, 4, 3]);
        assert_eq!(batch[0].payload, Some(json!({"docId": "doc_2"})));
        assert!(batch.iter().all(|c| c.vector.is_none()));
    }

    #[test]
    fn test_fetch_honors_exclusions_and_scope() {
        let collection = docs_collection(0..6);
        let request = GroupRequest::search(Vector::new(vec![1.0, 0.0]), "docId", 2, 2);
        let source = CollectionSource::for_request(&collection, &request).unwrap();

        let exclude: AHashSet<PointId> = [PointId::Integer(5)].into_iter().collect();
        let skip_doc1 = KeyScope::Exclude([GroupKey::from("doc_1")].into_iter().collect());
        assert_eq!(ids(&fetch(&source, 10, &exclude, &skip_doc1)), vec![3, 2, 0]);

        let only_doc0 = KeyScope::Only([GroupKey::from("doc_0")].into_iter().collect());
        assert_eq!(ids(&fetch(&source, 10, &AHashSet::new(), &only_doc0)), vec![3, 0]);
    }

    #[test]
    fn test_fetch_skips_points_without_key() {
        let collection = docs_collection(0..3);
        collection
            .upsert(Point::new(PointId::Integer(99), Vector::new(vec![99.0, 1.0]), Some(json!({"other": 1}))))
            .unwrap();
        let request = GroupRequest::search(Vector::new(vec![1.0, 0.0]), "docId", 2, 2);
        let source = CollectionSource::for_request(&collection, &request).unwrap();
        assert_eq!(ids(&fetch(&source, 10, &AHashSet::new(), &KeyScope::Any)), vec![2, 1, 0]);
    }

    #[test]
    fn test_fetch_filter_and_threshold() {
        let collection = docs_collection(0..6);
        let request = GroupRequest::search(Vector::new(vec![1.0, 0.0]), "docId", 2, 2)
            .filtered(FilterCondition::LessThan { field: "n".to_string(), value: 5.0 })
            .score_threshold(2.0);
        let source = CollectionSource::for_request(&collection, &request).unwrap();
        assert_eq!(ids(&fetch(&source, 10, &AHashSet::new(), &KeyScope::Any)), vec![4, 3, 2]);
    }

    #[test]
    fn test_recommend_skips_examples() {
        let collection = docs_collection(0..6);
        let request = GroupRequest::recommend(vec![PointId::Integer(5)], vec![], "docId", 2, 2);
        let source = CollectionSource::for_request(&collection, &request).unwrap();
        let batch = fetch(&source, 10, &AHashSet::new(), &KeyScope::Any);
        assert_eq!(ids(&batch), vec![4, 3, 2, 1, 0]);
    }

    #[test]
    fn test_recommend_unknown_example() {
        let collection = docs_collection(0..2);
        let request = GroupRequest::recommend(vec![PointId::Integer(42)], vec![], "docId", 2, 2);
        assert!(CollectionSource::for_request(&collection, &request).is_err());
    }

    #[test]
    fn test_sharded_matches_single() {
        let whole = docs_collection(0..12);
        let shards = vec![docs_collection(0..5), docs_collection(5..9), docs_collection(9..12)];
        let request = GroupRequest::recommend(vec![PointId::Integer(2)], vec![PointId::Integer(10)], "docId", 2, 2);

        let single = CollectionSource::for_request(&whole, &request).unwrap();
        let sharded = ShardedSource::for_request(&shards, &request).unwrap();
        assert_eq!(sharded.shard_count(), 3);

        let exclude: AHashSet<PointId> = [PointId::Integer(0)].into_iter().collect();
        assert_eq!(
            fetch(&single, 7, &exclude, &KeyScope::Any),
            fetch(&sharded, 7, &exclude, &KeyScope::Any)
        );

        let wanted = [PointId::Integer(3), PointId::Integer(11)];
        let records = sharded.retrieve(&wanted, &WithPayload::Enable(false), true).unwrap();
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.vector.is_some() && r.payload.is_none()));
    }
}
