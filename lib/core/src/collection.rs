use crate::{payload::WithPayload, point::rank_cmp, Error, Filter, Point, PointId, Record, Result, Vector};
use ahash::AHashMap;
use parking_lot::RwLock;
use std::str::FromStr;
use std::sync::Arc;

/// Configuration for a collection
#[derive(Debug, Clone)]
pub struct CollectionConfig {
    pub name: String,
    pub vector_dim: usize,
    pub distance: Distance,
}

impl Default for CollectionConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            vector_dim: 128,
            distance: Distance::Cosine,
        }
    }
}

impl CollectionConfig {
    pub fn validate(&self) -> Result<()> {
        if self.vector_dim == 0 {
            return Err(Error::InvalidConfig(format!(
                "collection '{}' must have a non-zero vector dimension",
                self.name
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Distance {
    Cosine,
    Euclidean,
    Dot,
}

impl Distance {
    /// Similarity score, higher is better. Euclidean distances are negated.
    #[inline]
    pub fn score(&self, a: &Vector, b: &Vector) -> f32 {
        match self {
            Distance::Cosine => a.cosine_similarity(b),
            Distance::Euclidean => -a.l2_distance(b),
            Distance::Dot => a.dot(b),
        }
    }
}

impl FromStr for Distance {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "cosine" => Ok(Distance::Cosine),
            "euclid" | "euclidean" => Ok(Distance::Euclidean),
            "dot" => Ok(Distance::Dot),
            other => Err(Error::InvalidConfig(format!("unknown distance: {}", other))),
        }
    }
}

/// Build a recommendation query with the average-vector strategy
///
/// The query is `avg(positive) + (avg(positive) - avg(negative))`, or just
/// the positive average when there are no negative examples.
pub fn recommend_query(positive: &[Vector], negative: &[Vector]) -> Result<Vector> {
    let no_positive = || Error::InvalidQuery("recommendation needs at least one positive example".to_string());

    let expected = positive.first().map(Vector::dim).ok_or_else(no_positive)?;
    if let Some(actual) = positive.iter().chain(negative).map(Vector::dim).find(|d| *d != expected) {
        return Err(Error::InvalidDimension { expected, actual });
    }

    let avg_positive = Vector::mean(positive).ok_or_else(no_positive)?;

    Ok(match Vector::mean(negative) {
        Some(avg_negative) => &avg_positive + &(&avg_positive - &avg_negative),
        None => avg_positive,
    })
}

/// An in-memory collection of points scored by exact scan
///
/// Reads take a shared lock, so any number of concurrent searches can run
/// against the same collection.
pub struct Collection {
    config: CollectionConfig,
    points: Arc<RwLock<AHashMap<PointId, Point>>>,
}

impl Collection {
    pub fn new(config: CollectionConfig) -> Self {
        Self {
            config,
            points: Arc::new(RwLock::new(AHashMap::new())),
        }
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn vector_dim(&self) -> usize {
        self.config.vector_dim
    }

    pub fn distance(&self) -> Distance {
        self.config.distance
    }

    pub fn count(&self) -> usize {
        self.points.read().len()
    }

    fn check_dim(&self, vector: &Vector) -> Result<()> {
        if vector.dim() != self.config.vector_dim {
            return Err(Error::InvalidDimension {
                expected: self.config.vector_dim,
                actual: vector.dim(),
            });
        }
        Ok(())
    }

    /// Insert or update a point
    ///
    /// Replacing an existing point bumps its version.
    pub fn upsert(&self, mut point: Point) -> Result<()> {
        self.check_dim(&point.vector)?;

        let mut points = self.points.write();
        if let Some(existing) = points.get(&point.id) {
            point.version = existing.version + 1;
        }
        points.insert(point.id.clone(), point);
        Ok(())
    }

    /// Batch insert multiple points
    ///
    /// Every point is validated before any is written.
    pub fn batch_upsert(&self, points: Vec<Point>) -> Result<()> {
        for point in &points {
            self.check_dim(&point.vector)?;
        }
        for point in points {
            self.upsert(point)?;
        }
        Ok(())
    }

    /// Get a point by ID
    pub fn get(&self, id: &PointId) -> Option<Point> {
        self.points.read().get(id).cloned()
    }

    /// Delete a point by ID
    pub fn delete(&self, id: &PointId) -> bool {
        self.points.write().remove(id).is_some()
    }

    /// Fetch points by ID with the requested parts attached
    ///
    /// Records come back in the order of `ids`; unknown ids are skipped.
    pub fn retrieve(&self, ids: &[PointId], with_payload: &WithPayload, with_vector: bool) -> Vec<Record> {
        let points = self.points.read();
        ids.iter()
            .filter_map(|id| points.get(id))
            .map(|point| Record {
                id: point.id.clone(),
                payload: with_payload.apply(point.payload.as_ref()),
                vector: with_vector.then(|| point.vector.clone()),
            })
            .collect()
    }

    /// Search for similar vectors
    ///
    /// Results are ordered by descending score, ties by ascending id.
    pub fn search(
        &self,
        query: &Vector,
        limit: usize,
        filter: Option<&dyn Filter>,
    ) -> Result<Vec<(Point, f32)>> {
        self.check_dim(query)?;

        let points = self.points.read();
        let mut scored: Vec<(&Point, f32)> = points
            .values()
            .filter(|point| filter.map(|f| f.matches(point)).unwrap_or(true))
            .map(|point| (point, self.config.distance.score(&point.vector, query)))
            .collect();

        scored.sort_by(|a, b| rank_cmp((a.1, &a.0.id), (b.1, &b.0.id)));
        scored.truncate(limit);
        Ok(scored
            .into_iter()
            .map(|(point, score)| (point.clone(), score))
            .collect())
    }

    /// Recommend points similar to `positive` and unlike `negative`
    ///
    /// The example points themselves are never returned.
    pub fn recommend(
        &self,
        positive: &[PointId],
        negative: &[PointId],
        limit: usize,
        filter: Option<&dyn Filter>,
    ) -> Result<Vec<(Point, f32)>> {
        let vectors = |ids: &[PointId]| -> Result<Vec<Vector>> {
            ids.iter()
                .map(|id| {
                    self.get(id)
                        .map(|p| p.vector)
                        .ok_or_else(|| Error::PointNotFound(id.to_string()))
                })
                .collect()
        };
        let query = recommend_query(&vectors(positive)?, &vectors(negative)?)?;

        let not_example = |point: &Point| {
            !positive.contains(&point.id)
                && !negative.contains(&point.id)
                && filter.map(|f| f.matches(point)).unwrap_or(true)
        };
        self.search(&query, limit, Some(&not_example))
    }
}
