//! Loading points and requests from JSON files

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use vgroup_core::{Collection, CollectionConfig, Point, Result};
use vgroup_grouping::GroupRequest;

/// Read a JSON array of points
pub fn load_points(path: impl AsRef<Path>) -> Result<Vec<Point>> {
    let reader = BufReader::new(File::open(path)?);
    Ok(serde_json::from_reader(reader)?)
}

/// Read one grouped request
pub fn load_request(path: impl AsRef<Path>) -> Result<GroupRequest> {
    let reader = BufReader::new(File::open(path)?);
    Ok(serde_json::from_reader(reader)?)
}

/// Spread points round-robin over `shards` collections sharing `config`
pub fn shard(points: Vec<Point>, config: &CollectionConfig, shards: usize) -> Result<Vec<Collection>> {
    config.validate()?;
    let shards = shards.max(1);

    let mut buckets: Vec<Vec<Point>> = (0..shards).map(|_| Vec::new()).collect();
    for (i, point) in points.into_iter().enumerate() {
        buckets[i % shards].push(point);
    }

    buckets
        .into_iter()
        .enumerate()
        .map(|(i, bucket)| {
            let collection = Collection::new(CollectionConfig {
                name: format!("{}-{}", config.name, i),
                ..config.clone()
            });
            collection.batch_upsert(bucket)?;
            Ok(collection)
        })
        .collect()
}
