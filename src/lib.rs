//! # vgroup
//!
//! Grouped vector search: instead of the best `N` hits overall, return the
//! best hits *per group*, where a group is every point sharing the value of
//! one payload field (for example all chunks of one document).
//!
//! ## Quick Start
//!
//! ### From the command line
//!
//! ```bash
//! vgroup --points points.json --dim 4 --request request.json --shards 4
//! ```
//!
//! where `request.json` is
//!
//! ```json
//! { "vector": [1.0, 0.0, 0.0, 0.0], "group_by": "docId", "limit": 10, "per_group": 3,
//!   "with_payload": true }
//! ```
//!
//! ### As a Library
//!
//! ```rust
//! use vgroup::prelude::*;
//! use serde_json::json;
//!
//! let collection = Collection::new(CollectionConfig {
//!     name: "chunks".to_string(),
//!     vector_dim: 2,
//!     distance: Distance::Dot,
//! });
//! for i in 0..12u64 {
//!     let payload = json!({ "docId": format!("doc_{}", i / 4) });
//!     collection
//!         .upsert(Point::new(PointId::Integer(i), Vector::new(vec![i as f32, 1.0]), Some(payload)))
//!         .unwrap();
//! }
//!
//! let request = GroupRequest::search(Vector::new(vec![1.0, 0.0]), "docId", 2, 3)
//!     .include_payload(true);
//! let result = GroupingEngine::default().search_groups(&collection, &request).unwrap();
//!
//! assert_eq!(result.groups.len(), 2);
//! assert_eq!(result.groups[0].group_id["docId"], json!("doc_2"));
//! ```
//!
//! ## Crate Structure
//!
//! - [`vgroup-core`](https://docs.rs/vgroup-core) - Points, payload paths, filters, exact in-memory collection
//! - [`vgroup-grouping`](https://docs.rs/vgroup-grouping) - The result grouping engine

pub mod dataset;

// Re-export core types
pub use vgroup_core::{
    Collection, CollectionConfig, Distance,
    Vector, Point, PointId, Record,
    Filter, PayloadFilter, FilterCondition,
    WithPayload,
    Error, Result,
};

// Re-export the grouping engine
pub use vgroup_grouping::{
    GroupRequest, GroupsResult, PointGroup, ScoredCandidate,
    GroupingEngine, GroupingConfig, GroupingError, Cancellation,
    CandidateSource, CollectionSource, ShardedSource,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        Collection, CollectionConfig, Distance,
        Vector, Point, PointId,
        Filter, PayloadFilter, FilterCondition,
        WithPayload,
        Error, Result,
        GroupRequest, GroupsResult,
        GroupingEngine, GroupingConfig, GroupingError, Cancellation,
        CandidateSource, CollectionSource, ShardedSource,
    };
}
