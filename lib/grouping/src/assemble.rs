use serde_json::Map;
use crate::aggregator::Group;
use crate::types::{GroupsResult, PointGroup};

/// Turn accumulated groups into the response
///
/// Keeps the best `limit` groups, ordered by their best hit with ties broken
/// by ascending key, and at most `per_group` hits in each. Empty groups are
/// dropped.
pub fn assemble(mut groups: Vec<Group>, group_by: &str, limit: usize, per_group: usize) -> GroupsResult {
    groups.retain(|g| !g.is_empty());
    groups.sort_by(|a, b| a.rank_cmp(b));
    groups.truncate(limit);

    let groups = groups
        .into_iter()
        .map(|group| {
            let mut group_id = Map::new();
            group_id.insert(group_by.to_string(), group.key().to_value());

            let mut hits = group.into_hits();
            hits.truncate(per_group);
            PointGroup { group_id, hits }
        })
        .collect();

    GroupsResult { groups }
}
