use ahash::{AHashMap, AHashSet};
use ordered_float::OrderedFloat;
use smallvec::SmallVec;
use std::cmp::Ordering;
use vgroup_core::PointId;
use crate::key::{self, GroupKey};
use crate::types::ScoredCandidate;

/// Outcome of offering one candidate to the aggregator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Offer {
    Inserted,
    Rejected(RejectReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// The point was already consumed in this session
    AlreadySeenPoint,
    /// The point's payload yields no group key
    NoGroupKey,
    /// The group already holds `per_group` hits scoring at least as well
    GroupFull,
}

/// Hits sharing one group key, best first
#[derive(Debug, Clone)]
pub struct Group {
    key: GroupKey,
    hits: SmallVec<[ScoredCandidate; 4]>,
}

impl Group {
    fn new(key: GroupKey, first: ScoredCandidate) -> Self {
        let mut hits = SmallVec::new();
        hits.push(first);
        Self { key, hits }
    }

    pub fn key(&self) -> &GroupKey {
        &self.key
    }

    pub fn hits(&self) -> &[ScoredCandidate] {
        &self.hits
    }

    pub fn into_hits(self) -> Vec<ScoredCandidate> {
        self.hits.into_vec()
    }

    pub fn len(&self) -> usize {
        self.hits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    /// Score of the best hit
    pub fn best_score(&self) -> f32 {
        self.hits.first().map(|h| h.score).unwrap_or(f32::NEG_INFINITY)
    }

    /// Group order: better best hit first, ties by ascending key
    pub fn rank_cmp(&self, other: &Group) -> Ordering {
        OrderedFloat(other.best_score())
            .cmp(&OrderedFloat(self.best_score()))
            .then_with(|| self.key.cmp(&other.key))
    }

    fn insert(&mut self, candidate: ScoredCandidate, per_group: usize) -> Offer {
        if self.hits.len() >= per_group {
            if let Some(lowest) = self.hits.last() {
                if OrderedFloat(lowest.score) >= OrderedFloat(candidate.score) {
                    return Offer::Rejected(RejectReason::GroupFull);
                }
            }
        }

        let position = self
            .hits
            .partition_point(|hit| hit.rank_cmp(&candidate) == Ordering::Less);
        self.hits.insert(position, candidate);
        self.hits.truncate(per_group);
        Offer::Inserted
    }
}

/// Collects candidates into groups of at most `per_group` hits
///
/// Every offered point is remembered, so a point seen in an earlier round
/// is never counted twice even when a source returns it again.
#[derive(Debug)]
pub struct GroupsAggregator {
    group_by: String,
    limit: usize,
    per_group: usize,
    seen: AHashSet<PointId>,
    groups: AHashMap<GroupKey, Group>,
}

impl GroupsAggregator {
    pub fn new(limit: usize, per_group: usize, group_by: String) -> Self {
        Self {
            group_by,
            limit,
            per_group,
            seen: AHashSet::new(),
            groups: AHashMap::new(),
        }
    }

    /// Offer a candidate; the point is marked seen whatever the outcome
    pub fn offer(&mut self, candidate: ScoredCandidate) -> Offer {
        if !self.seen.insert(candidate.id.clone()) {
            return Offer::Rejected(RejectReason::AlreadySeenPoint);
        }

        let Some(key) = key::extract(candidate.payload.as_ref(), &self.group_by) else {
            return Offer::Rejected(RejectReason::NoGroupKey);
        };

        match self.groups.get_mut(&key) {
            Some(group) => group.insert(candidate, self.per_group),
            None => {
                self.groups.insert(key.clone(), Group::new(key, candidate));
                Offer::Inserted
            }
        }
    }

    /// Offer a batch in order, returning how many were inserted
    pub fn add_points<I>(&mut self, candidates: I) -> usize
    where
        I: IntoIterator<Item = ScoredCandidate>,
    {
        let mut inserted = 0;
        for candidate in candidates {
            if self.offer(candidate) == Offer::Inserted {
                inserted += 1;
            }
        }
        inserted
    }

    /// Number of groups
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Ids of every point offered so far
    pub fn ids(&self) -> &AHashSet<PointId> {
        &self.seen
    }

    fn is_full(&self, group: &Group) -> bool {
        group.len() >= self.per_group
    }

    /// Keys of groups holding `per_group` hits
    pub fn full_keys(&self) -> AHashSet<GroupKey> {
        self.groups
            .values()
            .filter(|g| self.is_full(g))
            .map(|g| g.key.clone())
            .collect()
    }

    /// The best `limit` groups in result order
    pub fn best_groups(&self) -> Vec<&Group> {
        let mut groups: Vec<&Group> = self.groups.values().collect();
        groups.sort_by(|a, b| a.rank_cmp(b));
        groups.truncate(self.limit);
        groups
    }

    /// Keys of the best `limit` groups that still lack hits
    pub fn unfilled_best_keys(&self) -> AHashSet<GroupKey> {
        self.best_groups()
            .into_iter()
            .filter(|g| !self.is_full(g))
            .map(|g| g.key.clone())
            .collect()
    }

    /// How many of the best `limit` groups are full
    pub fn len_of_filled_best_groups(&self) -> usize {
        self.best_groups()
            .into_iter()
            .filter(|g| self.is_full(g))
            .count()
    }

    /// True once there are `limit` groups and the best `limit` are all full
    pub fn is_complete(&self) -> bool {
        self.len_of_filled_best_groups() >= self.limit
    }

    pub fn into_groups(self) -> Vec<Group> {
        self.groups.into_values().collect()
    }
}
